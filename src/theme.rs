use serde::{Deserialize, Serialize};

/// Light or dark palette selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
	Light,
	#[default]
	Dark,
}

impl ThemeMode {
	pub fn toggled(self) -> Self {
		match self {
			Self::Light => Self::Dark,
			Self::Dark => Self::Light,
		}
	}

	pub fn theme(self) -> Theme {
		match self {
			Self::Light => Theme::light(),
			Self::Dark => Theme::dark(),
		}
	}
}

/// Flat set of named colors handed to the render surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
	pub background: String,
	pub surface: String,
	pub border: String,
	pub text: String,
	pub text_secondary: String,
	pub primary: String,
	pub secondary: String,
	pub accent: String,
}

impl Theme {
	pub fn dark() -> Self {
		Self {
			background: "#0f172a".into(),
			surface: "#1e293b".into(),
			border: "#334155".into(),
			text: "#f1f5f9".into(),
			text_secondary: "#94a3b8".into(),
			primary: "#3b82f6".into(),
			secondary: "#8b5cf6".into(),
			accent: "#f59e0b".into(),
		}
	}

	pub fn light() -> Self {
		Self {
			background: "#f8fafc".into(),
			surface: "#ffffff".into(),
			border: "#e2e8f0".into(),
			text: "#0f172a".into(),
			text_secondary: "#475569".into(),
			primary: "#2563eb".into(),
			secondary: "#7c3aed".into(),
			accent: "#d97706".into(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
