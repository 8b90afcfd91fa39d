//! Tunables for the layout engine, the render surface and the data supplier.
//!
//! Surface settings travel inside the boot payload, so the surface never
//! reads configuration from anywhere else.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn check(
	field: &'static str,
	value: f64,
	expected: &'static str,
	ok: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
	if value.is_finite() && ok(value) {
		Ok(())
	} else {
		Err(ConfigError::OutOfRange {
			field,
			expected,
			value,
		})
	}
}

/// Force simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	/// Rest length of every link.
	pub link_distance: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Minimum separation radius per node.
	pub collide_radius: f64,
	/// Below this alpha the simulation stops ticking.
	pub alpha_min: f64,
	/// Fraction of the gap to the alpha target closed on each tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost on each tick.
	pub velocity_decay: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Lower bound on pair distance for the many-body force.
	pub distance_min: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			link_distance: 80.0,
			charge_strength: -200.0,
			collide_radius: 40.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			distance_min: 1.0,
		}
	}
}

impl LayoutConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		let positive = |v: f64| v > 0.0;
		let unit = |v: f64| v > 0.0 && v <= 1.0;
		check("linkDistance", self.link_distance, "positive", positive)?;
		check("chargeStrength", self.charge_strength, "finite", |_| true)?;
		check("collideRadius", self.collide_radius, "positive", positive)?;
		check("distanceMin", self.distance_min, "positive", positive)?;
		check("alphaMin", self.alpha_min, "in (0, 1)", |v| v > 0.0 && v < 1.0)?;
		check("alphaDecay", self.alpha_decay, "in (0, 1]", unit)?;
		check("velocityDecay", self.velocity_decay, "in (0, 1]", unit)?;
		check("dragAlphaTarget", self.drag_alpha_target, "in [0, 1]", |v| {
			(0.0..=1.0).contains(&v)
		})
	}
}

/// Viewport and interaction settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Labels longer than this many characters are truncated.
	pub label_max_chars: usize,
	/// Pointer travel in screen pixels after which a press is a drag, not a click.
	pub click_tolerance: f64,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.5,
			max_zoom: 4.0,
			label_max_chars: 12,
			click_tolerance: 3.0,
		}
	}
}

impl ViewConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		check("minZoom", self.min_zoom, "positive", |v| v > 0.0)?;
		check("maxZoom", self.max_zoom, "positive", |v| v > 0.0)?;
		if self.min_zoom > self.max_zoom {
			return Err(ConfigError::EmptyZoomRange {
				min: self.min_zoom,
				max: self.max_zoom,
			});
		}
		check("clickTolerance", self.click_tolerance, "non-negative", |v| v >= 0.0)
	}
}

/// Everything the render surface needs besides data and theme.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
	pub layout: LayoutConfig,
	pub view: ViewConfig,
}

impl SurfaceConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.layout.validate()?;
		self.view.validate()
	}
}

/// Where the host fetches graph data from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierConfig {
	pub base_url: String,
	pub timeout_ms: u32,
}

impl SupplierConfig {
	/// Base URL from `KG_API_BASE_URL` at compile time, `/api` otherwise.
	pub fn from_env() -> Self {
		Self {
			base_url: option_env!("KG_API_BASE_URL")
				.unwrap_or("/api")
				.trim_end_matches('/')
				.to_string(),
			..Self::default()
		}
	}

	pub fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}
}

impl Default for SupplierConfig {
	fn default() -> Self {
		Self {
			base_url: "/api".into(),
			timeout_ms: 8000,
		}
	}
}
