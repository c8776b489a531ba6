//! Leptos component wrapping the flag graph SVG.
//!
//! The component builds the layout state once, creates one line per link and
//! one flag image per node, and wires pointer handlers for dragging and
//! hovering. An animation loop runs via `requestAnimationFrame`, stepping the
//! simulation; each step pushes a new frame into the signal the SVG attributes
//! are bound to.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::ev;
use leptos::prelude::*;
use log::info;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, PointerEvent, Window};

use super::interaction::{DragController, DragEvent, client_to_graph};
use super::normalize::NormalizedGraph;
use super::render;
use super::state::{ForceGraphState, LayoutConfig};
use super::theme::Theme;
use super::tooltip::{Tooltip, TooltipContent};

/// Fixed simulation step per animation frame, in seconds.
const TICK_DT: f32 = 0.016;

/// Bundles the layout state with the drag gestures acting on it.
struct GraphContext {
	state: ForceGraphState,
	drag: DragController,
}

fn viewport_size() -> (f64, f64) {
	web_sys::window()
		.and_then(|w| {
			Some((
				w.inner_width().ok()?.as_f64()?,
				w.inner_height().ok()?.as_f64()?,
			))
		})
		.unwrap_or((800.0, 600.0))
}

/// Pointer position in graph coordinates, relative to the SVG element.
fn pointer_position(svg_ref: NodeRef<leptos::svg::Svg>, ev: &MouseEvent) -> Option<(f32, f32)> {
	let svg = svg_ref.get_untracked()?;
	let rect = svg.get_bounding_client_rect();
	Some(client_to_graph(
		ev.client_x() as f64,
		ev.client_y() as f64,
		rect.left(),
		rect.top(),
		rect.width(),
		rect.height(),
	))
}

/// Renders an interactive force-directed graph of country flags.
///
/// The SVG fills the viewport with the origin at its center and follows window
/// resizes. Flags can be dragged; hovering a flag shows the country name.
#[component]
pub fn ForceGraphSvg(
	#[prop(into)] data: Signal<NormalizedGraph>,
	#[prop(default = LayoutConfig::default())] config: LayoutConfig,
	#[prop(default = Theme::default())] theme: Theme,
) -> impl IntoView {
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let viewport = RwSignal::new(viewport_size());
	let tooltip = RwSignal::new(Tooltip::default());

	let mut state = ForceGraphState::new(data.get_untracked(), config);
	let nodes = state.nodes();
	let link_count = state.links().len();
	let frame = RwSignal::new(state.frame());
	state.on_tick(move |f| frame.set(f.clone()));
	info!(
		"flag-graph: layout ready with {} nodes, {} links",
		nodes.len(),
		link_count
	);

	let context = Rc::new(RefCell::new(GraphContext {
		state,
		drag: DragController::new(),
	}));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let (context_init, animate_init, alive_init) =
		(context.clone(), animate.clone(), alive.clone());

	let resize = window_event_listener(ev::resize, move |_| viewport.set(viewport_size()));
	on_cleanup({
		let alive = alive.clone();
		move || {
			alive.store(false, Ordering::Relaxed);
			resize.remove();
		}
	});

	Effect::new(move |_| {
		if svg_ref.get().is_none() {
			return;
		}
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};

		let (context_anim, animate_inner, alive_anim) =
			(context_init.clone(), animate_init.clone(), alive_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				return;
			}
			if let Ok(mut c) = context_anim.try_borrow_mut() {
				c.state.tick(TICK_DT);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (offset_x, offset_y) = theme.flag.offset();
	let (flag_w, flag_h) = (theme.flag.width.to_string(), theme.flag.height.to_string());
	let flags = nodes
		.into_iter()
		.enumerate()
		.map(|(i, node)| {
			let idx = node.idx;
			let href = theme.flag.url(&node.id);
			let content = TooltipContent {
				country: node.country,
				flag_url: href.clone(),
			};
			let tooltip_style = theme.tooltip.clone();

			let context_down = context.clone();
			let on_pointerdown = move |ev: PointerEvent| {
				ev.prevent_default();
				if let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) {
					let _ = target.set_pointer_capture(ev.pointer_id());
				}
				let Some((x, y)) = pointer_position(svg_ref, &ev) else {
					return;
				};
				if let Ok(mut c) = context_down.try_borrow_mut() {
					let c = &mut *c;
					let pointer = ev.pointer_id();
					c.drag
						.handle(&mut c.state, DragEvent::Start { pointer, node: idx, x, y });
				}
			};

			let context_move = context.clone();
			let on_pointermove = move |ev: PointerEvent| {
				let Some((x, y)) = pointer_position(svg_ref, &ev) else {
					return;
				};
				if let Ok(mut c) = context_move.try_borrow_mut() {
					let c = &mut *c;
					let pointer = ev.pointer_id();
					c.drag
						.handle(&mut c.state, DragEvent::Move { pointer, node: idx, x, y });
				}
			};

			let context_up = context.clone();
			let on_pointerup = move |ev: PointerEvent| {
				let (x, y) = pointer_position(svg_ref, &ev).unwrap_or_default();
				if let Ok(mut c) = context_up.try_borrow_mut() {
					let c = &mut *c;
					let pointer = ev.pointer_id();
					c.drag
						.handle(&mut c.state, DragEvent::End { pointer, node: idx, x, y });
				}
			};
			let on_pointercancel = on_pointerup.clone();

			let on_mouseover = move |ev: MouseEvent| {
				let (page_x, page_y) = (ev.page_x() as f64, ev.page_y() as f64);
				tooltip.update(|t| t.show(content.clone(), page_x, page_y, &tooltip_style));
			};
			let on_mouseout = move |_: MouseEvent| tooltip.update(Tooltip::hide);

			view! {
				<image
					class="node"
					href=href
					width=flag_w.clone()
					height=flag_h.clone()
					x=offset_x.to_string()
					y=offset_y.to_string()
					transform=render::node_transform(frame, i)
					on:pointerdown=on_pointerdown
					on:pointermove=on_pointermove
					on:pointerup=on_pointerup
					on:pointercancel=on_pointercancel
					on:mouseover=on_mouseover
					on:mouseout=on_mouseout
					style="cursor: grab; touch-action: none;"
				/>
			}
		})
		.collect_view();

	let tooltip_style = theme.tooltip.clone();
	let background = format!("display: block; background: {};", theme.background.color.to_css());

	view! {
		<svg
			node_ref=svg_ref
			class="flag-graph"
			width=move || viewport.get().0.to_string()
			height=move || viewport.get().1.to_string()
			viewBox=move || {
				let (w, h) = viewport.get();
				render::centered_view_box(w, h)
			}
			style=background
		>
			{render::link_layer(frame, link_count, &theme.link)}
			<g class="nodes">{flags}</g>
		</svg>
		<div class="tooltip" style=move || tooltip.with(|t| t.css(&tooltip_style))>
			{move || {
				tooltip
					.with(|t| t.content.clone())
					.map(|c| {
						view! {
							{c.country}
							<br />
							<img src=c.flag_url class="flag-icon" />
						}
					})
			}}
		</div>
	}
}
