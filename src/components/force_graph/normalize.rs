//! Dataset sanitization: node registry and edge filtering.
//!
//! Nodes are keyed by their lowercased country code, so "US" and "us" are the
//! same country. Links survive only when both ends resolve to a registry key;
//! the rest are dropped without complaint, since third-party datasets routinely
//! reference countries they never define.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use super::types::{LinkRef, RawGraph, RawLink, RawNode};

/// Normalize a country code into a registry key.
pub fn normalize_id(code: &str) -> String {
	code.to_lowercase()
}

impl LinkRef {
	/// Registry key this reference points at.
	///
	/// Numbers are written out in decimal (integral floats without a fraction,
	/// so `1.0` and `1` agree); strings are lowercased like node codes.
	pub fn key(&self) -> String {
		match self {
			LinkRef::Index(n) => number_key(n),
			LinkRef::Code(code) => normalize_id(code),
		}
	}
}

fn number_key(n: &Number) -> String {
	if let Some(u) = n.as_u64() {
		return u.to_string();
	}
	if let Some(i) = n.as_i64() {
		return i.to_string();
	}
	match n.as_f64() {
		Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
		Some(f) => f.to_string(),
		None => n.to_string(),
	}
}

/// A country in the registry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountryNode {
	/// Normalized registry key (lowercased code).
	pub id: String,
	/// Code as it appeared in the dataset.
	pub code: String,
	pub country: String,
	pub attributes: Map<String, Value>,
}

impl From<RawNode> for CountryNode {
	fn from(node: RawNode) -> Self {
		Self {
			id: normalize_id(&node.code),
			code: node.code,
			country: node.country,
			attributes: node.attributes,
		}
	}
}

/// A link whose endpoints are both registry keys.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryLink {
	pub source: String,
	pub target: String,
	pub attributes: Map<String, Value>,
}

/// Sanitized graph: every link resolves to two registry entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedGraph {
	/// Registry in first-seen order. A repeated code replaces the earlier
	/// record but keeps its position.
	pub nodes: IndexMap<String, CountryNode>,
	pub links: Vec<CountryLink>,
	dropped_links: usize,
}

impl NormalizedGraph {
	/// Number of input links discarded for dangling endpoints.
	pub fn dropped_links(&self) -> usize {
		self.dropped_links
	}
}

/// Build the node registry and keep only links that resolve against it.
pub fn normalize(raw: RawGraph) -> NormalizedGraph {
	let mut nodes = IndexMap::with_capacity(raw.nodes.len());
	for node in raw.nodes {
		let node = CountryNode::from(node);
		nodes.insert(node.id.clone(), node);
	}

	let total = raw.links.len();
	let links: Vec<CountryLink> = raw
		.links
		.into_iter()
		.filter_map(|link| resolve_link(&nodes, link))
		.collect();

	NormalizedGraph {
		dropped_links: total - links.len(),
		nodes,
		links,
	}
}

fn resolve_link(nodes: &IndexMap<String, CountryNode>, link: RawLink) -> Option<CountryLink> {
	let (source, target) = (link.source.key(), link.target.key());
	if !nodes.contains_key(&source) || !nodes.contains_key(&target) {
		return None;
	}
	Some(CountryLink {
		source,
		target,
		attributes: link.attributes,
	})
}
