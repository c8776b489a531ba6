//! flag-graph: Interactive force-directed graph of countries and their borders.
//!
//! This crate provides a WASM-based visualization that loads a country border
//! dataset, lays it out with a physics simulation, and renders each country as
//! a draggable flag on an SVG surface.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, debug, error, info};

pub mod components;

pub use components::force_graph::{
	ForceGraphSvg, LoadError, NormalizedGraph, RawGraph, fetch_graph, normalize, parse_graph,
};

/// Where the country border dataset is published.
pub const DATASET_URL: &str =
	"https://raw.githubusercontent.com/DealPete/forceDirected/master/countries.json";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("flag-graph: logging initialized");
}

fn prepare(raw: RawGraph) -> NormalizedGraph {
	let graph = normalize(raw);
	info!(
		"flag-graph: {} countries, {} borders",
		graph.nodes.len(),
		graph.links.len()
	);
	if graph.dropped_links() > 0 {
		debug!(
			"flag-graph: dropped {} links with unknown endpoints",
			graph.dropped_links()
		);
	}
	graph
}

/// Main application component.
/// Loads the dataset (inline or over the network) and renders the graph once
/// it arrives. A failed load is logged and nothing is drawn.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph = RwSignal::new(None::<NormalizedGraph>);
	match components::force_graph::embedded_graph() {
		Some(raw) => graph.set(Some(prepare(raw))),
		None => spawn_local(async move {
			match fetch_graph(DATASET_URL).await {
				Ok(raw) => graph.set(Some(prepare(raw))),
				Err(e) => error!("flag-graph: error loading data: {}", e),
			}
		}),
	}

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />
		<Title text="Country Borders" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph" id="graph-container">
			{move || graph.get().map(|data| view! { <ForceGraphSvg data=data /> })}
			<div class="graph-overlay">
				<h1>"Country Borders"</h1>
				<p class="subtitle">"Drag flags to reposition. Hover a flag for its country."</p>
			</div>
		</div>
	}
}
