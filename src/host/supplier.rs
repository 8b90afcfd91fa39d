//! Graph data source for the host, with the built-in sample as fallback.

use std::future::Future;
use std::pin::pin;

use futures::future::{Either, select};
use js_sys::Promise;
use log::{info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::components::force_graph::{GraphData, NodeKind, Topic};
use crate::config::SupplierConfig;
use crate::error::SupplyError;

pub trait GraphSupplier {
	fn get_graph(&self) -> impl Future<Output = Result<GraphData, SupplyError>>;
	fn get_topics(&self) -> impl Future<Output = Result<Vec<Topic>, SupplyError>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackReason {
	/// The supplier answered, but with no nodes.
	Empty,
	/// The supplier could not be reached or answered garbage.
	Unavailable(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphSource {
	Supplied,
	Fallback(FallbackReason),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedGraph {
	pub data: GraphData,
	pub source: GraphSource,
}

/// Fetches the graph, substituting [`GraphData::sample`] when there is
/// nothing usable. Never fails.
pub async fn load_graph<S: GraphSupplier>(supplier: &S) -> LoadedGraph {
	match supplier.get_graph().await {
		Ok(data) if !data.is_empty() => {
			info!(
				"loaded knowledge graph: {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			LoadedGraph {
				data,
				source: GraphSource::Supplied,
			}
		}
		Ok(_) => {
			info!("supplier returned an empty graph, showing the sample graph");
			LoadedGraph {
				data: GraphData::sample(),
				source: GraphSource::Fallback(FallbackReason::Empty),
			}
		}
		Err(e) => {
			warn!("graph supplier unavailable, showing the sample graph: {e}");
			LoadedGraph {
				data: GraphData::sample(),
				source: GraphSource::Fallback(FallbackReason::Unavailable(e.to_string())),
			}
		}
	}
}

/// Fetches topics, falling back to the topic nodes of `graph`.
pub async fn load_topics<S: GraphSupplier>(supplier: &S, graph: &GraphData) -> Vec<Topic> {
	match supplier.get_topics().await {
		Ok(topics) if !topics.is_empty() => topics,
		result => {
			if let Err(e) = result {
				warn!("topic listing unavailable: {e}");
			}
			graph
				.nodes
				.iter()
				.filter(|n| n.kind == NodeKind::Topic)
				.map(Topic::from)
				.collect()
		}
	}
}

/// Topics arrive either as a bare array or wrapped in `{ "topics": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TopicsBody {
	Bare(Vec<Topic>),
	Wrapped { topics: Vec<Topic> },
}

/// REST supplier: `GET {base}/knowledge-graph` and `GET {base}/topics`.
#[derive(Clone, Debug)]
pub struct HttpGraphSupplier {
	config: SupplierConfig,
}

impl HttpGraphSupplier {
	pub fn new(config: SupplierConfig) -> Self {
		Self { config }
	}

	async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SupplyError> {
		let url = self.config.endpoint(path);
		let ms = self.config.timeout_ms;
		let text = with_timeout(fetch_text(&url), ms)
			.await
			.ok_or_else(|| SupplyError::Timeout {
				url: url.clone(),
				ms,
			})??;
		serde_json::from_str(&text).map_err(|source| SupplyError::Decode { url, source })
	}
}

impl GraphSupplier for HttpGraphSupplier {
	async fn get_graph(&self) -> Result<GraphData, SupplyError> {
		self.fetch_json("knowledge-graph").await
	}

	async fn get_topics(&self) -> Result<Vec<Topic>, SupplyError> {
		Ok(match self.fetch_json::<TopicsBody>("topics").await? {
			TopicsBody::Bare(topics) | TopicsBody::Wrapped { topics } => topics,
		})
	}
}

fn js_reason(e: JsValue) -> String {
	e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

async fn fetch_text(url: &str) -> Result<String, SupplyError> {
	let http = |reason: String| SupplyError::Http {
		url: url.to_string(),
		reason,
	};
	let window = web_sys::window().ok_or_else(|| http("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(|e| http(js_reason(e)))?
		.dyn_into()
		.map_err(|e| http(js_reason(e)))?;
	if !response.ok() {
		return Err(SupplyError::Status {
			url: url.to_string(),
			status: response.status(),
		});
	}
	let body = response.text().map_err(|e| http(js_reason(e)))?;
	JsFuture::from(body)
		.await
		.map_err(|e| http(js_reason(e)))?
		.as_string()
		.ok_or_else(|| http("response body is not text".into()))
}

/// `None` if `fut` has not finished within `ms` milliseconds. A pending
/// browser timer is cleared as soon as `fut` wins.
async fn with_timeout<F: Future>(fut: F, ms: u32) -> Option<F::Output> {
	let window = web_sys::window();
	let mut handle = None;
	let timer = Promise::new(&mut |resolve, _reject| {
		if let Some(window) = &window {
			handle = window
				.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
				.ok();
		}
	});
	race(fut, JsFuture::from(timer), || {
		if let (Some(window), Some(handle)) = (&window, handle) {
			window.clear_timeout_with_handle(handle);
		}
	})
	.await
}

/// Runs `fut` against `timer`. `cancel` is called only when `fut` finishes
/// first.
async fn race<F: Future, T: Future>(
	fut: F,
	timer: T,
	cancel: impl FnOnce(),
) -> Option<F::Output> {
	let (fut, timer) = (pin!(fut), pin!(timer));
	match select(fut, timer).await {
		Either::Left((value, _)) => {
			cancel();
			Some(value)
		}
		Either::Right(_) => None,
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use futures::executor::block_on;
	use futures::future::{pending, ready};

	use super::*;
	use crate::components::force_graph::GraphNode;

	enum Canned {
		Graph(GraphData, Vec<Topic>),
		Down,
	}

	impl GraphSupplier for Canned {
		async fn get_graph(&self) -> Result<GraphData, SupplyError> {
			match self {
				Self::Graph(g, _) => Ok(g.clone()),
				Self::Down => Err(SupplyError::Status {
					url: "/api/knowledge-graph".into(),
					status: 503,
				}),
			}
		}

		async fn get_topics(&self) -> Result<Vec<Topic>, SupplyError> {
			match self {
				Self::Graph(_, t) => Ok(t.clone()),
				Self::Down => Err(SupplyError::Http {
					url: "/api/topics".into(),
					reason: "offline".into(),
				}),
			}
		}
	}

	#[test]
	fn failing_supplier_yields_the_sample_graph() {
		let loaded = block_on(load_graph(&Canned::Down));
		assert_eq!(loaded.data.nodes.len(), 7);
		assert_eq!(loaded.data.links.len(), 6);
		assert_eq!(loaded.data, GraphData::sample());
		assert!(matches!(
			loaded.source,
			GraphSource::Fallback(FallbackReason::Unavailable(ref m)) if m.contains("503")
		));
	}

	#[test]
	fn empty_graph_is_a_distinct_fallback() {
		let loaded = block_on(load_graph(&Canned::Graph(GraphData::default(), vec![])));
		assert_eq!(loaded.data, GraphData::sample());
		assert_eq!(loaded.source, GraphSource::Fallback(FallbackReason::Empty));
	}

	#[test]
	fn supplied_graph_is_passed_through() {
		let graph = GraphData {
			nodes: vec![GraphNode::new("a", "Alpha", NodeKind::Document)],
			links: vec![],
		};
		let loaded = block_on(load_graph(&Canned::Graph(graph.clone(), vec![])));
		assert_eq!(loaded.data, graph);
		assert_eq!(loaded.source, GraphSource::Supplied);
	}

	#[test]
	fn topics_fall_back_to_topic_nodes() {
		let topics = block_on(load_topics(&Canned::Down, &GraphData::sample()));
		let names: Vec<_> = topics.iter().map(|t| t.name.as_str()).collect();
		assert_eq!(
			names,
			["Documentation", "API Reference", "Guides", "Architecture", "Integration"]
		);
		assert_eq!(topics[0].count, Some(45));
	}

	#[test]
	fn supplied_topics_win() {
		let listed = vec![Topic {
			id: None,
			name: "Onboarding".into(),
			count: Some(3),
		}];
		let supplier = Canned::Graph(GraphData::sample(), listed.clone());
		assert_eq!(block_on(load_topics(&supplier, &GraphData::sample())), listed);
	}

	#[test]
	fn finished_request_cancels_its_timer() {
		let cancelled = Cell::new(false);
		let out = block_on(race(ready(7), pending::<()>(), || cancelled.set(true)));
		assert_eq!(out, Some(7));
		assert!(cancelled.get());
	}

	#[test]
	fn expired_timer_abandons_the_request() {
		let cancelled = Cell::new(false);
		let out = block_on(race(pending::<u8>(), ready(()), || cancelled.set(true)));
		assert_eq!(out, None);
		assert!(!cancelled.get());
	}

	#[test]
	fn topics_body_accepts_both_shapes() {
		for text in [r#"[{"name":"A"}]"#, r#"{"topics":[{"name":"A","count":2}]}"#] {
			let (TopicsBody::Bare(t) | TopicsBody::Wrapped { topics: t }) =
				serde_json::from_str(text).unwrap();
			assert_eq!(t[0].name, "A");
		}
	}
}
