//! Dataset loading: network fetch, inline script block, JSON decoding.

use js_sys::Promise;
use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlScriptElement, Response, Window};

use super::types::RawGraph;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("no browser window available")]
	NoWindow,
	#[error("request failed: {0}")]
	Network(String),
	#[error("server responded with status {status} {status_text}")]
	Status { status: u16, status_text: String },
	#[error("failed to read response body: {0}")]
	Body(String),
	#[error("failed to decode graph data: {0}")]
	Decode(#[from] serde_json::Error),
}

fn describe(value: JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Decode a `{ nodes: [...], links: [...] }` document.
pub fn parse_graph(text: &str) -> Result<RawGraph, LoadError> {
	Ok(serde_json::from_str(text)?)
}

/// Fetch and decode the dataset at `url`.
pub async fn fetch_graph(url: &str) -> Result<RawGraph, LoadError> {
	let window: Window = web_sys::window().ok_or(LoadError::NoWindow)?;
	let request: Promise = window.fetch_with_str(url);
	let response: Response = JsFuture::from(request)
		.await
		.map_err(|e| LoadError::Network(describe(e)))?
		.dyn_into()
		.map_err(|e| LoadError::Network(describe(e)))?;

	if !response.ok() {
		return Err(LoadError::Status {
			status: response.status(),
			status_text: response.status_text(),
		});
	}

	let body = response.text().map_err(|e| LoadError::Body(describe(e)))?;
	let text = JsFuture::from(body)
		.await
		.map_err(|e| LoadError::Body(describe(e)))?
		.as_string()
		.ok_or_else(|| LoadError::Body("body is not text".into()))?;

	let graph = parse_graph(&text)?;
	info!(
		"flag-graph: fetched {} nodes, {} links from {}",
		graph.nodes.len(),
		graph.links.len(),
		url
	);
	Ok(graph)
}

/// Load graph data from a script element with id="graph-data", if the host
/// page embeds one.
pub fn embedded_graph() -> Option<RawGraph> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_graph(&json_text) {
		Ok(data) => {
			info!(
				"flag-graph: loaded {} nodes, {} links from page",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("flag-graph: ignoring embedded graph data: {}", e);
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::LinkRef;

	#[test]
	fn parses_mixed_reference_styles() {
		let graph = parse_graph(
			r#"{
				"nodes": [
					{ "country": "Andorra", "code": "ad" },
					{ "country": "France", "code": "fr", "region": "Europe" }
				],
				"links": [
					{ "target": 1, "source": 0 },
					{ "target": "FR", "source": "ad" }
				]
			}"#,
		)
		.unwrap();

		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.nodes[1].attributes["region"], "Europe");
		assert_eq!(graph.links[0].source, LinkRef::Index(0u64.into()));
		assert_eq!(graph.links[1].target, LinkRef::Code("FR".into()));
	}

	#[test]
	fn country_name_is_optional() {
		let graph = parse_graph(r#"{ "nodes": [{ "code": "xk" }], "links": [] }"#).unwrap();
		assert_eq!(graph.nodes[0].country, "");
	}

	#[test]
	fn missing_code_is_a_decode_error() {
		let err = parse_graph(r#"{ "nodes": [{ "country": "Nowhere" }], "links": [] }"#)
			.unwrap_err();
		assert!(matches!(err, LoadError::Decode(_)));
		assert!(err.to_string().starts_with("failed to decode graph data"));
	}

	#[test]
	fn null_reference_is_a_decode_error() {
		let err = parse_graph(
			r#"{ "nodes": [{ "code": "a" }], "links": [{ "source": null, "target": "a" }] }"#,
		)
		.unwrap_err();
		assert!(matches!(err, LoadError::Decode(_)));
	}

	#[test]
	fn malformed_json_is_a_decode_error() {
		assert!(matches!(parse_graph("{ nodes: "), Err(LoadError::Decode(_))));
	}
}
