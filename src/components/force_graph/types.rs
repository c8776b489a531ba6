//! Raw dataset structures as they arrive over the wire.
//!
//! The dataset is loosely shaped: nodes carry a country `code` plus whatever
//! else the publisher added, and links may point at nodes either by code or by
//! a numeric index. These types accept all of that without judging it;
//! [`normalize`](super::normalize) decides what survives.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// A country node in the source dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
	/// Country code, in whatever case the dataset uses (e.g. "US", "ca").
	pub code: String,
	/// Display name shown in the tooltip.
	#[serde(default)]
	pub country: String,
	/// Any other fields of the record, kept untouched.
	#[serde(flatten)]
	pub attributes: Map<String, Value>,
}

/// Reference from a link to one of its endpoints.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LinkRef {
	/// Index-style reference, e.g. `"source": 0`.
	Index(Number),
	/// Code-style reference, e.g. `"source": "US"`.
	Code(String),
}

/// An undirected border between two countries in the source dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct RawLink {
	pub source: LinkRef,
	pub target: LinkRef,
	#[serde(flatten)]
	pub attributes: Map<String, Value>,
}

/// Complete dataset: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
	pub nodes: Vec<RawNode>,
	pub links: Vec<RawLink>,
}
