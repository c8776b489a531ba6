//! Hover tooltip showing the country name and flag.

use super::theme::TooltipStyle;

/// What the tooltip shows.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
	pub country: String,
	pub flag_url: String,
}

/// Tooltip visibility and page position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
	pub content: Option<TooltipContent>,
	pub left: f64,
	pub top: f64,
}

impl Tooltip {
	/// Show `content` next to the pointer at page coordinates `(page_x, page_y)`.
	pub fn show(&mut self, content: TooltipContent, page_x: f64, page_y: f64, style: &TooltipStyle) {
		self.content = Some(content);
		self.left = page_x + style.offset_x;
		self.top = page_y + style.offset_y;
	}

	pub fn hide(&mut self) {
		self.content = None;
	}

	pub fn is_visible(&self) -> bool {
		self.content.is_some()
	}

	pub fn opacity(&self) -> f64 {
		if self.is_visible() { 1.0 } else { 0.0 }
	}

	/// Inline CSS for the tooltip element.
	pub fn css(&self, style: &TooltipStyle) -> String {
		format!(
			"position: absolute; pointer-events: none; left: {}px; top: {}px; opacity: {}; background: {}; color: {};",
			self.left,
			self.top,
			self.opacity(),
			style.background.to_css(),
			style.text.to_css(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::theme::Theme;

	fn content() -> TooltipContent {
		TooltipContent {
			country: "Canada".into(),
			flag_url: "https://flagcdn.com/24x18/ca.png".into(),
		}
	}

	#[test]
	fn starts_hidden() {
		let tooltip = Tooltip::default();
		assert!(!tooltip.is_visible());
		assert_eq!(tooltip.opacity(), 0.0);
	}

	#[test]
	fn show_places_next_to_pointer() {
		let style = Theme::default().tooltip;
		let mut tooltip = Tooltip::default();
		tooltip.show(content(), 200.0, 150.0, &style);

		assert!(tooltip.is_visible());
		assert_eq!(tooltip.opacity(), 1.0);
		assert_eq!((tooltip.left, tooltip.top), (210.0, 122.0));
		assert_eq!(tooltip.content.as_ref().unwrap().country, "Canada");

		let css = tooltip.css(&style);
		assert!(css.contains("left: 210px"));
		assert!(css.contains("top: 122px"));
		assert!(css.contains("opacity: 1"));
	}

	#[test]
	fn hide_zeroes_opacity() {
		let style = Theme::default().tooltip;
		let mut tooltip = Tooltip::default();
		tooltip.show(content(), 0.0, 0.0, &style);
		tooltip.hide();

		assert!(!tooltip.is_visible());
		assert!(tooltip.css(&style).contains("opacity: 0"));
	}
}
