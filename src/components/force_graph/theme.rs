//! Visual theming for the flag graph.
//!
//! Colors, link strokes, flag icon geometry and tooltip placement.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background behind the SVG surface.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
}

/// Link (border) line style.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub color: Color,
	pub width: f64,
}

/// Flag icon geometry and source.
#[derive(Clone, Debug)]
pub struct FlagStyle {
	/// Icon width in pixels. The icon is centered on its node.
	pub width: f64,
	pub height: f64,
	/// URL template; `{id}` is replaced by the node id.
	pub url_template: &'static str,
}

impl FlagStyle {
	/// Image URL for a node id.
	pub fn url(&self, id: &str) -> String {
		self.url_template.replace("{id}", id)
	}

	/// Top-left offset that centers the icon on the node's coordinates.
	pub fn offset(&self) -> (f64, f64) {
		(-self.width / 2.0, -self.height / 2.0)
	}
}

/// Floating tooltip style and placement relative to the pointer.
#[derive(Clone, Debug)]
pub struct TooltipStyle {
	pub background: Color,
	pub text: Color,
	pub offset_x: f64,
	pub offset_y: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub link: LinkStyle,
	pub flag: FlagStyle,
	pub tooltip: TooltipStyle,
}

const FLAG_CDN: &str = "https://flagcdn.com/24x18/{id}.png";

impl Theme {
	/// Light page with grey borders (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(250, 250, 250),
			},
			link: LinkStyle {
				color: Color::rgba(153, 153, 153, 0.6),
				width: 1.0,
			},
			flag: FlagStyle {
				width: 24.0,
				height: 18.0,
				url_template: FLAG_CDN,
			},
			tooltip: TooltipStyle {
				background: Color::rgba(255, 255, 255, 0.95),
				text: Color::rgb(34, 34, 34),
				offset_x: 10.0,
				offset_y: -28.0,
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
