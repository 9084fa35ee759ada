/// Linear RGB color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
	pub r: f32,
	pub g: f32,
	pub b: f32,
}

impl Color {
	pub const DARK_BLUE: Color = Color::rgb(0.0, 0.0, 0.545);
	pub const DARK_RED: Color = Color::rgb(0.545, 0.0, 0.0);
	pub const OLIVE: Color = Color::rgb(0.502, 0.502, 0.0);

	pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
		Self { r, g, b }
	}

	/// CSS `rgba()` form used by the canvas backend.
	pub fn to_css(self, opacity: f32) -> String {
		format!(
			"rgba({}, {}, {}, {})",
			(self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
			(self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
			(self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
			opacity.clamp(0.0, 1.0)
		)
	}
}

/// Category colors keyed by element alias, with a fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	pub default: Color,
	pub categories: Vec<(String, Color)>,
}

impl Default for Palette {
	fn default() -> Self {
		Self {
			default: Color::DARK_BLUE,
			categories: vec![
				("Argosy".into(), Color::rgb(0.0, 0.349, 0.643)),
				("DataFlowGroup".into(), Color::rgb(1.0, 0.224, 0.0)),
				("DataFlow".into(), Color::OLIVE),
			],
		}
	}
}

impl Palette {
	pub fn color_for(&self, alias: &str) -> Color {
		self.categories
			.iter()
			.find(|(name, _)| name == alias)
			.map(|(_, color)| *color)
			.unwrap_or(self.default)
	}
}

/// Tunables for placement and the spotlight effect.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParameters {
	/// Counter decrement between two spiral placements.
	pub spiral_step: f64,
	/// Sphere radius in world units.
	pub solid_radius: f32,
	/// Opacity of everything outside the spotlight.
	pub dim_opacity: f32,
	/// Highlight of the focused element.
	pub focus_color: Color,
	/// Category colors keyed by alias.
	pub palette: Palette,
	/// Children with this alias stay unrendered under a focus.
	pub statistic_alias: String,
	/// Alias whose payload carries the maximum time handed to collaborators.
	pub time_series_alias: String,
}

impl Default for LayoutParameters {
	fn default() -> Self {
		Self {
			spiral_step: 0.1,
			solid_radius: 0.1,
			dim_opacity: 0.15,
			focus_color: Color::DARK_RED,
			palette: Palette::default(),
			statistic_alias: "DataFlowStatistic".into(),
			time_series_alias: "Argosy".into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn palette_falls_back_to_default() {
		let palette = Palette::default();
		assert_eq!(palette.color_for("DataFlow"), Color::OLIVE);
		assert_eq!(palette.color_for("Argosy"), Color::rgb(0.0, 0.349, 0.643));
		assert_eq!(palette.color_for(""), Color::DARK_BLUE);
		assert_eq!(palette.color_for("Unknown"), Color::DARK_BLUE);
	}

	#[test]
	fn css_form_clamps() {
		assert_eq!(Color::rgb(1.0, 0.0, 2.0).to_css(0.15), "rgba(255, 0, 255, 0.15)");
	}
}
