//! Pointer drag handling.
//!
//! Each pointer that grabs a flag is a gesture: `Start` pins the node where it
//! is, `Move` drags the pin along, `End` lets go. While any gesture is active
//! the simulation is kept warm so the rest of the graph reacts to the held
//! node; when the last one ends the layout is allowed to cool down again.

use std::collections::HashMap;

use force_graph::DefaultNodeIdx;
use log::debug;

use super::state::ForceGraphState;

/// Pointer identifier, as reported by `PointerEvent.pointerId`.
pub type PointerId = i32;

/// Drag gesture events. Coordinates are in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEvent {
	Start {
		pointer: PointerId,
		node: DefaultNodeIdx,
		x: f32,
		y: f32,
	},
	Move {
		pointer: PointerId,
		node: DefaultNodeIdx,
		x: f32,
		y: f32,
	},
	End {
		pointer: PointerId,
		node: DefaultNodeIdx,
		x: f32,
		y: f32,
	},
}

/// Gesture state of a single pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState {
	Idle,
	Dragging(DefaultNodeIdx),
}

/// Tracks active drag gestures and applies them to the layout.
#[derive(Clone, Debug, Default)]
pub struct DragController {
	active: HashMap<PointerId, DefaultNodeIdx>,
}

impl DragController {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of gestures currently dragging a node.
	pub fn active(&self) -> usize {
		self.active.len()
	}

	pub fn gesture(&self, pointer: PointerId) -> GestureState {
		self.active
			.get(&pointer)
			.map_or(GestureState::Idle, |&node| GestureState::Dragging(node))
	}

	pub fn is_dragging(&self, node: DefaultNodeIdx) -> bool {
		self.active.values().any(|&n| n == node)
	}

	pub fn handle(&mut self, state: &mut ForceGraphState, event: DragEvent) {
		match event {
			DragEvent::Start { pointer, node, .. } => {
				if self.active.contains_key(&pointer) {
					return;
				}
				let Some((x, y)) = state.node_position(node) else {
					return;
				};
				if self.active.is_empty() {
					let target = state.config().drag_alpha_target;
					state.set_alpha_target(target);
					state.restart();
				}
				self.active.insert(pointer, node);
				state.pin(node, x, y);
				debug!("flag-graph: drag start {:?} at ({x}, {y})", node);
			}
			DragEvent::Move { pointer, x, y, .. } => {
				if let Some(&node) = self.active.get(&pointer) {
					state.pin(node, x, y);
				}
			}
			DragEvent::End { pointer, .. } => {
				let Some(node) = self.active.remove(&pointer) else {
					return;
				};
				if self.active.is_empty() {
					state.set_alpha_target(0.0);
				}
				// Another pointer may still be holding the same node.
				if !self.is_dragging(node) {
					state.unpin(node);
				}
				debug!("flag-graph: drag end {:?}", node);
			}
		}
	}
}

/// Convert client (viewport) coordinates to graph coordinates for an SVG whose
/// viewBox is `[-w/2, -h/2, w, h]` and whose bounding box starts at
/// `(left, top)` with size `w × h`.
pub fn client_to_graph(
	client_x: f64,
	client_y: f64,
	left: f64,
	top: f64,
	width: f64,
	height: f64,
) -> (f32, f32) {
	(
		(client_x - left - width / 2.0) as f32,
		(client_y - top - height / 2.0) as f32,
	)
}
