mod component;
mod render;
pub mod runtime;
pub mod scale;
pub mod simulation;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use runtime::{Phase, SurfaceRuntime};
pub use simulation::{SimLink, SimNode, Simulation};
pub use state::{Focus, ForceGraphState, Tooltip};
pub use types::{GraphData, GraphLink, GraphNode, NodeKind, Topic};
