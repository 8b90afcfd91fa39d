use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use url::form_urlencoded;

use crate::bridge::{BootPayload, HostPort, SurfaceMessage};
use crate::components::force_graph::{GraphData, GraphNode};
use crate::config::SurfaceConfig;
use crate::error::{BridgeError, ViewError};
use crate::theme::Theme;

/// State changes the surrounding UI reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
	Selected(Option<GraphNode>),
}

type Listener = Box<dyn FnMut(HostEvent)>;

/// Host-side owner of one graph view: builds boot payloads, applies
/// selections relayed by the surface and refuses all updates once torn down.
pub struct HostController {
	alive: bool,
	generation: u64,
	selected: Option<GraphNode>,
	theme: Theme,
	config: SurfaceConfig,
	listener: Option<Listener>,
}

impl HostController {
	pub fn new(theme: Theme, config: SurfaceConfig) -> Self {
		Self {
			alive: true,
			generation: 0,
			selected: None,
			theme,
			config,
			listener: None,
		}
	}

	pub fn set_listener(&mut self, listener: impl FnMut(HostEvent) + 'static) {
		self.listener = Some(Box::new(listener));
	}

	pub fn is_alive(&self) -> bool {
		self.alive
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn selected(&self) -> Option<&GraphNode> {
		self.selected.as_ref()
	}

	pub fn set_theme(&mut self, theme: Theme) {
		self.theme = theme;
	}

	/// Validates `data` and encodes the boot text for a new surface. Each call
	/// starts a new generation; the previous surface must be torn down.
	pub fn prepare(&mut self, data: GraphData) -> Result<String, ViewError> {
		data.validate()?;
		self.config.validate().map_err(BridgeError::from)?;
		self.generation += 1;
		let payload = BootPayload::new(
			self.generation,
			data,
			self.theme.clone(),
			self.config.clone(),
		);
		Ok(payload.encode()?)
	}

	/// Applies one raw bridge message. Returns whether host state changed.
	pub fn handle_message(&mut self, raw: &str) -> bool {
		if !self.alive {
			debug!("graph view is gone, ignoring bridge message");
			return false;
		}
		match SurfaceMessage::decode(raw) {
			Ok(SurfaceMessage::NodeClick { node }) => {
				info!("node selected: {} ({})", node.name, node.id);
				self.set_selected(Some(node));
				true
			}
			Err(e) => {
				warn!("discarding bridge message: {e}");
				false
			}
		}
	}

	/// Clears the selection; the surface keeps running.
	pub fn dismiss(&mut self) {
		if self.alive && self.selected.is_some() {
			self.set_selected(None);
		}
	}

	pub fn teardown(&mut self) {
		if !self.alive {
			return;
		}
		self.alive = false;
		self.selected = None;
		self.listener = None;
		debug!("graph view generation {} torn down", self.generation);
	}

	/// Route of the related-files view for the current selection.
	pub fn related_files_route(&self) -> Option<String> {
		let node = self.selected.as_ref()?;
		Some(related_files_route(node))
	}

	fn set_selected(&mut self, node: Option<GraphNode>) {
		self.selected = node.clone();
		if let Some(listener) = self.listener.as_mut() {
			listener(HostEvent::Selected(node));
		}
	}
}

/// `/files?scope=...` scoped by the node's path, or its name when it has none.
pub fn related_files_route(node: &GraphNode) -> String {
	files_route(node.path.as_deref().unwrap_or(&node.name))
}

pub fn files_route(scope: &str) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("scope", scope)
		.finish();
	format!("/files?{query}")
}

/// Forwards bridge messages from the surface booted as `generation` into
/// `controller`, until that surface goes away, a newer surface replaces it or
/// the controller is torn down.
pub async fn pump(
	controller: Rc<RefCell<HostController>>,
	mut port: HostPort,
	generation: u64,
) {
	while let Some(raw) = port.recv().await {
		let mut host = controller.borrow_mut();
		if !host.is_alive() {
			break;
		}
		if host.generation() != generation {
			debug!(
				"surface generation {generation} was replaced by {}, dropping its messages",
				host.generation()
			);
			break;
		}
		host.handle_message(&raw);
	}
	port.close();
	debug!("bridge pump finished");
}
