//! SVG rendering for the flag graph.
//!
//! Elements are created once per link and node; their geometry attributes are
//! bound to the frame signal, so each simulation step only rewrites
//! coordinates. Drawing order is links first, flags on top.

use leptos::prelude::*;

use super::state::{LayoutFrame, LinkFrame};
use super::theme::LinkStyle;

/// SVG `transform` placing a node at `(x, y)`.
pub fn translate(x: f32, y: f32) -> String {
	format!("translate({x}, {y})")
}

/// viewBox of a `width × height` surface with the origin at its center.
pub fn centered_view_box(width: f64, height: f64) -> String {
	format!("{} {} {} {}", -width / 2.0, -height / 2.0, width, height)
}

/// Reactive `transform` for the node in registry slot `i`.
pub fn node_transform(frame: RwSignal<LayoutFrame>, i: usize) -> impl Fn() -> String + Copy {
	move || {
		frame.with(|f| {
			f.nodes
				.get(i)
				.map(|n| translate(n.x, n.y))
				.unwrap_or_default()
		})
	}
}

fn link_coord(
	frame: RwSignal<LayoutFrame>,
	i: usize,
	pick: fn(&LinkFrame) -> f32,
) -> impl Fn() -> String + Copy {
	move || {
		frame.with(|f| {
			f.links
				.get(i)
				.map(|l| pick(l).to_string())
				.unwrap_or_default()
		})
	}
}

/// One `<line>` per link, endpoints following the frame.
pub fn link_layer(
	frame: RwSignal<LayoutFrame>,
	count: usize,
	style: &LinkStyle,
) -> impl IntoView + use<> {
	let (stroke, stroke_width) = (style.color.to_css(), style.width.to_string());
	view! {
		<g class="links">
			{(0..count)
				.map(|i| {
					view! {
						<line
							class="link"
							stroke=stroke.clone()
							stroke-width=stroke_width.clone()
							x1=link_coord(frame, i, |l| l.x1)
							y1=link_coord(frame, i, |l| l.y1)
							x2=link_coord(frame, i, |l| l.x2)
							y2=link_coord(frame, i, |l| l.y2)
						/>
					}
				})
				.collect_view()}
		</g>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::theme::Color;

	#[test]
	fn translate_formats_plain_numbers() {
		assert_eq!(translate(12.5, -3.0), "translate(12.5, -3)");
		assert_eq!(translate(0.0, 0.0), "translate(0, 0)");
	}

	#[test]
	fn view_box_is_centered_on_origin() {
		assert_eq!(centered_view_box(800.0, 600.0), "-400 -300 800 600");
		assert_eq!(centered_view_box(1025.0, 10.0), "-512.5 -5 1025 10");
	}

	#[test]
	fn link_layer_outlives_its_style() {
		let frame = RwSignal::new(LayoutFrame::default());
		let layer = {
			let style = LinkStyle {
				color: Color::rgb(0, 0, 0),
				width: 2.0,
			};
			link_layer(frame, 0, &style)
		};
		drop(layer);
	}
}
