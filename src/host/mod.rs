//! Host side of the graph view: data loading and the controller that owns a
//! surface's bridge.

mod controller;
mod supplier;

pub use controller::{HostController, HostEvent, files_route, pump, related_files_route};
pub use supplier::{
	FallbackReason, GraphSource, GraphSupplier, HttpGraphSupplier, LoadedGraph, load_graph,
	load_topics,
};
