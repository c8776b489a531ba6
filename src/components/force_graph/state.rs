//! Layout state: the country registry bound to the physics engine.
//!
//! Wraps the `force_graph` simulation with what it lacks for this graph: an
//! energy schedule that cools the layout to rest and can be re-heated while a
//! node is held, a rest length along links, a centering pull, and pinned
//! positions. Every step produces a [`LayoutFrame`] that is pushed to the
//! registered tick listeners.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use indexmap::IndexMap;

use super::normalize::{CountryNode, NormalizedGraph};

/// Force and energy parameters for the layout.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	/// Target separation of linked nodes.
	pub link_distance: f32,
	/// Share of the separation error corrected per step at full energy.
	/// Divided by the smaller endpoint degree, so hubs are not yanked around.
	pub link_strength: f32,
	/// Pairwise repulsion.
	pub charge_strength: f32,
	/// Engine spring pulling linked nodes together.
	pub spring_strength: f32,
	/// Point the whole system is centered on.
	pub center: (f32, f32),
	pub node_mass: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	/// Energy below which the simulation stops stepping.
	pub alpha_min: f64,
	/// Fraction of the distance to the energy target covered per step.
	pub alpha_decay: f64,
	/// Energy target held while at least one node is being dragged.
	pub drag_alpha_target: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 50.0,
			link_strength: 1.0,
			charge_strength: 50.0,
			spring_strength: 0.05,
			center: (0.0, 0.0),
			node_mass: 10.0,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			alpha_min,
			// Reaches alpha_min from 1.0 in ~300 steps.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
		}
	}
}

/// Simulation energy ("alpha") and its cooling schedule.
#[derive(Clone, Debug)]
pub struct Energy {
	pub alpha: f64,
	pub alpha_target: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	running: bool,
}

impl Energy {
	fn new(config: &LayoutConfig) -> Self {
		Self {
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_min: config.alpha_min,
			alpha_decay: config.alpha_decay,
			running: true,
		}
	}

	/// Move alpha one step towards its target.
	fn cool(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
	}

	fn settled(&self) -> bool {
		self.alpha < self.alpha_min
	}
}

/// A link with both endpoints resolved to engine handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
}

/// Position of one node in a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeFrame {
	pub x: f32,
	pub y: f32,
	/// Pinned position, if the node is held.
	pub fx: Option<f32>,
	pub fy: Option<f32>,
}

/// Endpoints of one link in a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinkFrame {
	pub x1: f32,
	pub y1: f32,
	pub x2: f32,
	pub y2: f32,
}

/// Snapshot of the layout after a step: nodes in registry order, links in
/// link order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutFrame {
	pub nodes: Vec<NodeFrame>,
	pub links: Vec<LinkFrame>,
}

/// What the render surface needs to know about a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeHandle {
	pub idx: DefaultNodeIdx,
	pub id: String,
	pub country: String,
}

type TickListener = Box<dyn FnMut(&LayoutFrame)>;

/// Registry, resolved links and physics engine for one loaded dataset.
///
/// Created when the dataset finishes loading and dropped with the view.
pub struct ForceGraphState {
	pub graph: ForceGraph<CountryNode, ()>,
	pub energy: Energy,
	config: LayoutConfig,
	index: IndexMap<String, DefaultNodeIdx>,
	links: Vec<ResolvedLink>,
	degree: HashMap<DefaultNodeIdx, usize>,
	pins: HashMap<DefaultNodeIdx, (f32, f32)>,
	tick_listeners: Vec<TickListener>,
}

impl ForceGraphState {
	pub fn new(data: NormalizedGraph, config: LayoutConfig) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.charge_strength,
			force_spring: config.spring_strength,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.damping_factor,
		});
		let mut index = IndexMap::with_capacity(data.nodes.len());
		let (cx, cy) = config.center;

		for (i, (id, node)) in data.nodes.into_iter().enumerate() {
			// Phyllotaxis spiral: evenly spread, no two nodes coincide.
			let radius = 10.0 * (0.5 + i as f64).sqrt();
			let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
			let idx = graph.add_node(NodeData {
				x: cx + (radius * angle.cos()) as f32,
				y: cy + (radius * angle.sin()) as f32,
				mass: config.node_mass,
				is_anchor: false,
				user_data: node,
			});
			index.insert(id, idx);
		}

		let mut links = Vec::with_capacity(data.links.len());
		let mut degree: HashMap<DefaultNodeIdx, usize> = HashMap::new();
		for link in &data.links {
			if let (Some(&source), Some(&target)) =
				(index.get(&link.source), index.get(&link.target))
			{
				// The engine cannot hold an edge from a node to itself.
				if source != target {
					graph.add_edge(source, target, EdgeData::default());
				}
				*degree.entry(source).or_insert(0) += 1;
				*degree.entry(target).or_insert(0) += 1;
				links.push(ResolvedLink { source, target });
			}
		}

		Self {
			graph,
			energy: Energy::new(&config),
			config,
			index,
			links,
			degree,
			pins: HashMap::new(),
			tick_listeners: Vec::new(),
		}
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn links(&self) -> &[ResolvedLink] {
		&self.links
	}

	/// Engine handle for a registry key.
	pub fn node_index(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.index.get(id).copied()
	}

	/// Nodes in registry order.
	pub fn nodes(&self) -> Vec<NodeHandle> {
		let mut info = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			info.insert(node.index(), node.data.user_data.country.clone());
		});
		self.index
			.iter()
			.map(|(id, &idx)| NodeHandle {
				idx,
				id: id.clone(),
				country: info.remove(&idx).unwrap_or_default(),
			})
			.collect()
	}

	pub fn node_position(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}

	/// Pinned position (fx, fy) of a node, if held.
	pub fn pinned(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		self.pins.get(&idx).copied()
	}

	/// Hold a node at a fixed position until [`unpin`](Self::unpin).
	pub fn pin(&mut self, idx: DefaultNodeIdx, x: f32, y: f32) {
		self.pins.insert(idx, (x, y));
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
	}

	/// Release a node back to the simulated forces.
	pub fn unpin(&mut self, idx: DefaultNodeIdx) {
		self.pins.remove(&idx);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
	}

	pub fn alpha(&self) -> f64 {
		self.energy.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.energy.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.energy.alpha_target = target;
	}

	pub fn is_running(&self) -> bool {
		self.energy.running
	}

	/// Resume stepping without touching the current energy.
	pub fn restart(&mut self) {
		self.energy.running = true;
	}

	pub fn stop(&mut self) {
		self.energy.running = false;
	}

	/// Register a callback invoked with the new frame after every step.
	pub fn on_tick(&mut self, listener: impl FnMut(&LayoutFrame) + 'static) {
		self.tick_listeners.push(Box::new(listener));
	}

	/// Advance the simulation by one step. Returns `false` once the layout has
	/// come to rest and nothing moved.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.energy.running {
			return false;
		}

		self.energy.cool();
		let alpha = self.energy.alpha as f32;
		self.graph.update(dt * alpha);
		self.constrain(alpha);

		if self.energy.settled() {
			self.energy.running = false;
		}

		let frame = self.frame();
		for listener in &mut self.tick_listeners {
			listener(&frame);
		}
		true
	}

	/// Link rest length, centering and pins, applied after the engine step.
	fn constrain(&mut self, alpha: f32) {
		let mut positions: HashMap<DefaultNodeIdx, (f32, f32)> =
			HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x(), node.y()));
		});
		if positions.is_empty() {
			return;
		}

		let mut shifts: HashMap<DefaultNodeIdx, (f32, f32)> = HashMap::new();
		for link in self.links.iter().filter(|l| l.source != l.target) {
			let (Some(&(sx, sy)), Some(&(tx, ty))) =
				(positions.get(&link.source), positions.get(&link.target))
			else {
				continue;
			};
			let (dx, dy) = (tx - sx, ty - sy);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < 1e-6 {
				continue;
			}

			let source_degree = self.degree.get(&link.source).copied().unwrap_or(1) as f32;
			let target_degree = self.degree.get(&link.target).copied().unwrap_or(1) as f32;
			let strength = self.config.link_strength / source_degree.min(target_degree);
			let l = (dist - self.config.link_distance) / dist * alpha * strength;
			let bias = source_degree / (source_degree + target_degree);

			let target = shifts.entry(link.target).or_insert((0.0, 0.0));
			target.0 -= dx * l * bias;
			target.1 -= dy * l * bias;
			let source = shifts.entry(link.source).or_insert((0.0, 0.0));
			source.0 += dx * l * (1.0 - bias);
			source.1 += dy * l * (1.0 - bias);
		}

		let n = positions.len() as f32;
		let (mut mx, mut my) = (0.0f32, 0.0f32);
		for (idx, (x, y)) in &positions {
			let (sx, sy) = shifts.get(idx).copied().unwrap_or((0.0, 0.0));
			mx += x + sx;
			my += y + sy;
		}
		let (cx, cy) = self.config.center;
		let (ox, oy) = (cx - mx / n, cy - my / n);

		let pins = &self.pins;
		self.graph.visit_nodes_mut(|node| {
			let idx = node.index();
			if let Some(&(fx, fy)) = pins.get(&idx) {
				node.data.x = fx;
				node.data.y = fy;
				return;
			}
			let (sx, sy) = shifts.get(&idx).copied().unwrap_or((0.0, 0.0));
			node.data.x += sx + ox;
			node.data.y += sy + oy;
		});
	}

	/// Current positions of every node and link.
	pub fn frame(&self) -> LayoutFrame {
		let mut positions: HashMap<DefaultNodeIdx, (f32, f32)> =
			HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x(), node.y()));
		});
		let at = |idx: &DefaultNodeIdx| positions.get(idx).copied().unwrap_or_default();

		let nodes = self
			.index
			.values()
			.map(|idx| {
				let (x, y) = at(idx);
				let pin = self.pins.get(idx);
				NodeFrame {
					x,
					y,
					fx: pin.map(|p| p.0),
					fy: pin.map(|p| p.1),
				}
			})
			.collect();
		let links = self
			.links
			.iter()
			.map(|link| {
				let ((x1, y1), (x2, y2)) = (at(&link.source), at(&link.target));
				LinkFrame { x1, y1, x2, y2 }
			})
			.collect();

		LayoutFrame { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use serde_json::json;

	use super::*;
	use crate::components::force_graph::normalize::normalize;

	fn state() -> ForceGraphState {
		let raw = serde_json::from_value(json!({
			"nodes": [
				{ "code": "US", "country": "United States" },
				{ "code": "CA", "country": "Canada" },
				{ "code": "MX", "country": "Mexico" },
				{ "code": "GT", "country": "Guatemala" }
			],
			"links": [
				{ "source": "us", "target": "ca" },
				{ "source": "us", "target": "mx" },
				{ "source": "mx", "target": "gt" },
				{ "source": "gt", "target": "nowhere" }
			]
		}))
		.unwrap();
		ForceGraphState::new(normalize(raw), LayoutConfig::default())
	}

	fn mean(frame: &LayoutFrame) -> (f32, f32) {
		let n = frame.nodes.len() as f32;
		let (sx, sy) = frame
			.nodes
			.iter()
			.fold((0.0, 0.0), |(ax, ay), node| (ax + node.x, ay + node.y));
		(sx / n, sy / n)
	}

	#[test]
	fn links_resolve_to_engine_handles() {
		let s = state();
		assert_eq!(s.links().len(), 3);
		let us = s.node_index("us").unwrap();
		let ca = s.node_index("ca").unwrap();
		assert_eq!(s.links()[0], ResolvedLink { source: us, target: ca });
		assert!(s.node_index("nowhere").is_none());
	}

	#[test]
	fn nodes_keep_registry_order() {
		let s = state();
		let ids: Vec<String> = s.nodes().into_iter().map(|n| n.id).collect();
		assert_eq!(ids, ["us", "ca", "mx", "gt"]);
		assert_eq!(s.nodes()[2].country, "Mexico");
	}

	#[test]
	fn initial_positions_are_distinct() {
		let frame = state().frame();
		for (i, a) in frame.nodes.iter().enumerate() {
			for b in &frame.nodes[i + 1..] {
				assert!((a.x, a.y) != (b.x, b.y));
			}
		}
	}

	#[test]
	fn tick_centers_the_layout() {
		let mut s = state();
		assert!(s.tick(0.016));
		let (mx, my) = mean(&s.frame());
		assert!(mx.abs() < 1e-3, "mean x {mx}");
		assert!(my.abs() < 1e-3, "mean y {my}");
	}

	#[test]
	fn custom_center_is_honoured() {
		let config = LayoutConfig {
			center: (100.0, -40.0),
			..LayoutConfig::default()
		};
		let mut s = ForceGraphState::new(state_graph(), config);
		s.tick(0.016);
		let (mx, my) = mean(&s.frame());
		assert!((mx - 100.0).abs() < 1e-2);
		assert!((my + 40.0).abs() < 1e-2);
	}

	fn state_graph() -> NormalizedGraph {
		normalize(
			serde_json::from_value(json!({
				"nodes": [{ "code": "a" }, { "code": "b" }],
				"links": [{ "source": "a", "target": "b" }]
			}))
			.unwrap(),
		)
	}

	#[test]
	fn tick_listener_sees_resolved_link_coordinates() {
		let mut s = state();
		let frames = Rc::new(RefCell::new(Vec::new()));
		let sink = frames.clone();
		s.on_tick(move |frame| sink.borrow_mut().push(frame.clone()));

		s.tick(0.016);
		s.tick(0.016);

		let frames = frames.borrow();
		assert_eq!(frames.len(), 2);
		let last = &frames[1];
		assert_eq!(last.nodes.len(), 4);
		assert_eq!(last.links.len(), 3);
		// us -> mx: registry slots 0 and 2.
		let link = last.links[1];
		assert_eq!((link.x1, link.y1), (last.nodes[0].x, last.nodes[0].y));
		assert_eq!((link.x2, link.y2), (last.nodes[2].x, last.nodes[2].y));
	}

	#[test]
	fn pinned_node_holds_its_position() {
		let mut s = state();
		let mx = s.node_index("mx").unwrap();
		s.pin(mx, 40.0, -10.0);
		for _ in 0..5 {
			s.tick(0.016);
		}
		assert_eq!(s.node_position(mx), Some((40.0, -10.0)));
		assert_eq!(s.pinned(mx), Some((40.0, -10.0)));

		let frame = s.frame();
		assert_eq!(frame.nodes[2].fx, Some(40.0));
		assert_eq!(frame.nodes[2].fy, Some(-10.0));

		s.unpin(mx);
		assert_eq!(s.pinned(mx), None);
		assert_eq!(s.frame().nodes[2].fx, None);
	}

	#[test]
	fn energy_decays_and_simulation_stops() {
		let mut s = state();
		let ticks = Rc::new(RefCell::new(0usize));
		let counter = ticks.clone();
		s.on_tick(move |_| *counter.borrow_mut() += 1);

		let before = s.alpha();
		s.tick(0.016);
		assert!(s.alpha() < before);

		let mut steps = 1;
		while s.tick(0.016) {
			steps += 1;
			assert!(steps < 1000, "simulation never settled");
		}
		assert!(!s.is_running());
		assert!(s.alpha() < s.config().alpha_min);
		assert_eq!(*ticks.borrow(), steps);

		// Idle ticks do nothing.
		assert!(!s.tick(0.016));
		assert_eq!(*ticks.borrow(), steps);
	}

	#[test]
	fn restart_with_target_reheats() {
		let mut s = state();
		while s.tick(0.016) {}
		let cold = s.alpha();

		s.set_alpha_target(0.3);
		s.restart();
		for _ in 0..10 {
			assert!(s.tick(0.016));
		}
		assert!(s.alpha() > cold);
		assert!(s.alpha() < 0.3);
	}

	#[test]
	fn stop_halts_stepping() {
		let mut s = state();
		s.stop();
		assert!(!s.is_running());
		assert!(!s.tick(0.016));
		assert_eq!(s.alpha(), 1.0);
	}

	#[test]
	fn self_loop_renders_without_an_engine_edge() {
		let raw = serde_json::from_value(json!({
			"nodes": [
				{ "code": "JP", "country": "Japan" },
				{ "code": "kr", "country": "South Korea" }
			],
			"links": [
				{ "source": "jp", "target": "JP" },
				{ "source": "jp", "target": "kr" }
			]
		}))
		.unwrap();
		let mut s = ForceGraphState::new(normalize(raw), LayoutConfig::default());
		let jp = s.node_index("jp").unwrap();
		assert_eq!(s.links()[0], ResolvedLink { source: jp, target: jp });

		for _ in 0..20 {
			assert!(s.tick(0.016));
		}
		let frame = s.frame();
		assert_eq!(frame.links.len(), 2);
		let l = frame.links[0];
		assert_eq!((l.x1, l.y1), (l.x2, l.y2));
		assert!(l.x1.is_finite() && l.y1.is_finite());
	}

	#[test]
	fn repeated_links_are_all_kept() {
		let raw = serde_json::from_value(json!({
			"nodes": [{ "code": "de" }, { "code": "at" }],
			"links": [
				{ "source": "de", "target": "at" },
				{ "source": "DE", "target": "AT" }
			]
		}))
		.unwrap();
		let mut s = ForceGraphState::new(normalize(raw), LayoutConfig::default());
		assert_eq!(s.links().len(), 2);
		assert_eq!(s.links()[0], s.links()[1]);
		s.tick(0.016);
		assert_eq!(s.frame().links.len(), 2);
	}

	#[test]
	fn empty_graph_ticks_quietly() {
		let mut s = ForceGraphState::new(NormalizedGraph::default(), LayoutConfig::default());
		assert!(s.tick(0.016));
		assert_eq!(s.frame(), LayoutFrame::default());
	}
}
