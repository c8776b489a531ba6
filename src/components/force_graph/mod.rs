//! Force-directed graph of country flags.
//!
//! Turns a loosely-shaped `{ nodes, links }` dataset into an interactive SVG:
//! - Normalization of country codes and filtering of dangling links
//! - Physics-based layout via force simulation, cooled by an energy schedule
//! - Flag dragging that pins nodes while the rest of the graph reacts
//! - Hover tooltips with the country name and flag
//!
//! # Example
//!
//! ```ignore
//! use flag_graph::{ForceGraphSvg, normalize, parse_graph};
//!
//! let raw = parse_graph(r#"{
//!     "nodes": [{ "code": "US", "country": "United States" }, { "code": "ca", "country": "Canada" }],
//!     "links": [{ "source": "US", "target": "CA" }]
//! }"#)?;
//!
//! view! { <ForceGraphSvg data=normalize(raw) /> }
//! ```

mod component;
mod interaction;
mod loader;
mod normalize;
mod render;
mod state;
pub mod theme;
mod tooltip;
mod types;

pub use component::ForceGraphSvg;
pub use interaction::{DragController, DragEvent, GestureState, client_to_graph};
pub use loader::{LoadError, embedded_graph, fetch_graph, parse_graph};
pub use normalize::{CountryLink, CountryNode, NormalizedGraph, normalize, normalize_id};
pub use state::{ForceGraphState, LayoutConfig, LayoutFrame};
pub use theme::Theme;
pub use tooltip::{Tooltip, TooltipContent};
pub use types::{LinkRef, RawGraph, RawLink, RawNode};
