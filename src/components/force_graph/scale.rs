//! Geometry shared by hit-testing and drawing: node sizes, link widths,
//! label truncation and the zoom transform.

use super::types::NodeKind;

pub fn node_radius(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Topic => 20.0,
		NodeKind::Document | NodeKind::Tag => 12.0,
	}
}

/// Vertical distance from node center to its label baseline.
pub fn label_offset(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Topic => 35.0,
		NodeKind::Document | NodeKind::Tag => 25.0,
	}
}

pub fn link_width(strength: f64) -> f64 {
	strength.max(0.0).sqrt()
}

/// Cuts labels longer than `max_chars` characters and appends `...`.
pub fn truncate_label(name: &str, max_chars: usize) -> String {
	match name.char_indices().nth(max_chars) {
		Some((cut, _)) => format!("{}...", &name[..cut]),
		None => name.to_string(),
	}
}

/// Scale factor for one wheel event.
pub fn wheel_factor(delta_y: f64) -> f64 {
	2f64.powf(-delta_y * 0.002)
}

/// Pan/zoom applied to the whole graph group: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ZoomTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ZoomTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Scales by `factor` around the screen point `(px, py)`, keeping `k`
	/// within `[min, max]`.
	pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64, min: f64, max: f64) {
		let target = self.k * factor;
		let new_k = if target.is_finite() {
			// inverted bounds resolve to `max` rather than panicking
			target.max(min).min(max)
		} else if factor > 1.0 {
			max
		} else {
			min
		};
		let ratio = new_k / self.k;
		self.x = px - (px - self.x) * ratio;
		self.y = py - (py - self.y) * ratio;
		self.k = new_k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn topics_are_drawn_larger() {
		assert!(node_radius(NodeKind::Topic) > node_radius(NodeKind::Document));
		assert_eq!(node_radius(NodeKind::Tag), node_radius(NodeKind::Document));
	}

	#[test]
	fn labels_truncate_after_twelve_chars() {
		assert_eq!(truncate_label("Documentation", 12), "Documentatio...");
		assert_eq!(truncate_label("API Reference", 12), "API Referenc...");
		assert_eq!(truncate_label("Guides", 12), "Guides");
		assert_eq!(truncate_label("Integrations", 12), "Integrations");
		assert_eq!(truncate_label("Überblick über alles", 12), "Überblick üb...");
	}

	#[test]
	fn zoom_is_clamped_for_any_delta() {
		let mut t = ZoomTransform::default();
		for delta in [-1e9, -5000.0, -1.0, 0.0, 3.0, 700.0, 1e12, f64::INFINITY] {
			t.zoom_at(100.0, 50.0, wheel_factor(delta), 0.5, 4.0);
			assert!((0.5..=4.0).contains(&t.k), "k = {} after delta {delta}", t.k);
		}
		t.zoom_at(0.0, 0.0, wheel_factor(-1e9), 0.5, 4.0);
		assert_eq!(t.k, 4.0);
		t.zoom_at(0.0, 0.0, wheel_factor(1e9), 0.5, 4.0);
		assert_eq!(t.k, 0.5);
	}

	#[test]
	fn inverted_zoom_bounds_do_not_panic() {
		let mut t = ZoomTransform::default();
		t.zoom_at(10.0, 10.0, wheel_factor(-100.0), 2.0, 1.0);
		assert_eq!(t.k, 1.0);
		t.zoom_at(10.0, 10.0, wheel_factor(-100.0), f64::NAN, 4.0);
		assert!(t.k.is_finite());
	}

	#[test]
	fn zoom_keeps_the_anchor_point_fixed() {
		let mut t = ZoomTransform {
			x: 30.0,
			y: -10.0,
			k: 1.0,
		};
		let before = t.screen_to_graph(200.0, 120.0);
		t.zoom_at(200.0, 120.0, 2.0, 0.5, 4.0);
		let after = t.screen_to_graph(200.0, 120.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}
}
