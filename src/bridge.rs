//! Text-only channel between the host view and the render surface.
//!
//! The host hands the surface a [`BootPayload`] encoded as a string, once, at
//! creation time. After that the surface can only talk back by posting
//! encoded [`SurfaceMessage`]s; the host never replies.

use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::components::force_graph::{GraphData, GraphNode};
use crate::config::SurfaceConfig;
use crate::error::BridgeError;
use crate::theme::Theme;

pub const PROTOCOL_VERSION: u32 = 1;

/// Everything a surface is booted with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BootPayload {
	pub version: u32,
	/// Bumped by the host on every reload; a new generation means a new surface.
	pub generation: u64,
	pub graph: GraphData,
	pub theme: Theme,
	#[serde(default)]
	pub config: SurfaceConfig,
}

impl BootPayload {
	pub fn new(generation: u64, graph: GraphData, theme: Theme, config: SurfaceConfig) -> Self {
		Self {
			version: PROTOCOL_VERSION,
			generation,
			graph,
			theme,
			config,
		}
	}

	pub fn encode(&self) -> Result<String, BridgeError> {
		serde_json::to_string(self).map_err(BridgeError::Encode)
	}

	pub fn decode(text: &str) -> Result<Self, BridgeError> {
		let payload: Self = serde_json::from_str(text).map_err(BridgeError::Decode)?;
		if payload.version != PROTOCOL_VERSION {
			return Err(BridgeError::VersionMismatch {
				expected: PROTOCOL_VERSION,
				found: payload.version,
			});
		}
		payload.config.validate()?;
		Ok(payload)
	}
}

/// Messages the surface may send to the host. Anything else is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceMessage {
	#[serde(rename = "nodeClick")]
	NodeClick { node: GraphNode },
}

impl SurfaceMessage {
	pub fn encode(&self) -> Result<String, BridgeError> {
		serde_json::to_string(self).map_err(BridgeError::Encode)
	}

	pub fn decode(text: &str) -> Result<Self, BridgeError> {
		serde_json::from_str(text).map_err(BridgeError::Decode)
	}
}

/// Creates a fresh channel for one surface instance.
pub fn channel() -> (SurfacePort, HostPort) {
	let (tx, rx) = unbounded();
	(SurfacePort { tx }, HostPort { rx })
}

/// Surface end of the bridge.
#[derive(Clone, Debug)]
pub struct SurfacePort {
	tx: UnboundedSender<String>,
}

impl SurfacePort {
	/// Fire-and-forget. Returns whether the message was queued.
	pub fn post(&self, msg: &SurfaceMessage) -> bool {
		let text = match msg.encode() {
			Ok(text) => text,
			Err(e) => {
				warn!("dropping surface message: {e}");
				return false;
			}
		};
		match self.tx.unbounded_send(text) {
			Ok(()) => true,
			Err(_) => {
				debug!("host end of bridge is gone, message dropped");
				false
			}
		}
	}

	pub fn is_connected(&self) -> bool {
		!self.tx.is_closed()
	}
}

/// Host end of the bridge.
#[derive(Debug)]
pub struct HostPort {
	rx: UnboundedReceiver<String>,
}

impl HostPort {
	/// Next raw message, or `None` once every surface port is dropped.
	pub async fn recv(&mut self) -> Option<String> {
		self.rx.next().await
	}

	/// Stops accepting messages; queued ones can still be drained.
	pub fn close(&mut self) {
		self.rx.close();
	}
}
