use log::{debug, info};

use super::state::ForceGraphState;
use crate::bridge::SurfacePort;

/// Lifecycle of one render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	Idle,
	Running,
	Stopped,
	Disposed,
}

/// Owns a surface's state and its end of the bridge. Nothing here outlives
/// [`SurfaceRuntime::dispose`]: the state, its pins and the port are dropped
/// together and every later call is a no-op.
pub struct SurfaceRuntime {
	phase: Phase,
	state: Option<ForceGraphState>,
	port: Option<SurfacePort>,
	error: Option<String>,
}

impl SurfaceRuntime {
	pub fn new(port: SurfacePort) -> Self {
		Self {
			phase: Phase::Idle,
			state: None,
			port: Some(port),
			error: None,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn state(&self) -> Option<&ForceGraphState> {
		self.state.as_ref()
	}

	/// Boot failure shown in place of the graph.
	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn start(&mut self, state: ForceGraphState) {
		if self.phase == Phase::Disposed {
			return;
		}
		info!(
			"surface started with {} nodes, {} links",
			state.graph.nodes.len(),
			state.graph.links.len()
		);
		self.state = Some(state);
		self.error = None;
		self.phase = Phase::Running;
	}

	pub fn fail(&mut self, message: impl Into<String>) {
		if self.phase == Phase::Disposed {
			return;
		}
		self.error = Some(message.into());
		self.state = None;
		self.phase = Phase::Stopped;
	}

	pub fn stop(&mut self) {
		if self.phase == Phase::Running {
			self.phase = Phase::Stopped;
		}
	}

	pub fn resume(&mut self) {
		if self.phase == Phase::Stopped && self.state.is_some() {
			self.phase = Phase::Running;
		}
	}

	pub fn dispose(&mut self) {
		if self.phase == Phase::Disposed {
			return;
		}
		if let Some(state) = self.state.as_mut() {
			state.release_all();
		}
		self.state = None;
		self.port = None;
		self.phase = Phase::Disposed;
		debug!("surface disposed");
	}

	/// One animation frame. Returns `false` once the runtime is disposed, so
	/// the caller stops scheduling frames.
	pub fn frame(&mut self, dt: f64) -> bool {
		match self.phase {
			Phase::Disposed => false,
			Phase::Running => {
				if let Some(state) = self.state.as_mut() {
					state.tick(dt);
				}
				true
			}
			Phase::Idle | Phase::Stopped => true,
		}
	}

	fn live_state(&mut self) -> Option<&mut ForceGraphState> {
		match self.phase {
			Phase::Running | Phase::Stopped => self.state.as_mut(),
			Phase::Idle | Phase::Disposed => None,
		}
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(s) = self.live_state() {
			s.pointer_down(sx, sy);
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(s) = self.live_state() {
			s.pointer_move(sx, sy);
		}
	}

	/// Ends the gesture and posts a selection if it was a click.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> bool {
		let Some(msg) = self.live_state().and_then(|s| s.pointer_up(sx, sy)) else {
			return false;
		};
		self.port.as_ref().is_some_and(|port| port.post(&msg))
	}

	pub fn pointer_leave(&mut self) {
		if let Some(s) = self.live_state() {
			s.pointer_leave();
		}
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if let Some(s) = self.live_state() {
			s.wheel(sx, sy, delta_y);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		if let Some(s) = self.live_state() {
			s.resize(width, height);
		}
	}
}

impl Drop for SurfaceRuntime {
	fn drop(&mut self) {
		self.dispose();
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::bridge::{self, BootPayload, SurfaceMessage};
	use crate::components::force_graph::GraphData;
	use crate::config::SurfaceConfig;
	use crate::theme::Theme;

	fn state() -> ForceGraphState {
		let payload = BootPayload::new(1, GraphData::sample(), Theme::light(), SurfaceConfig::default());
		ForceGraphState::boot(payload, 640.0, 480.0).unwrap()
	}

	fn node_screen_pos(rt: &SurfaceRuntime, idx: usize) -> (f64, f64) {
		let s = rt.state().unwrap();
		let (x, y) = s.simulation.position(idx).unwrap();
		s.transform.graph_to_screen(x, y)
	}

	#[test]
	fn click_is_posted_over_the_bridge() {
		let (port, mut host) = bridge::channel();
		let mut rt = SurfaceRuntime::new(port);
		rt.start(state());
		let (x, y) = node_screen_pos(&rt, 6);
		rt.pointer_down(x, y);
		assert!(rt.pointer_up(x, y));

		let text = block_on(host.recv()).unwrap();
		let SurfaceMessage::NodeClick { node } = SurfaceMessage::decode(&text).unwrap();
		assert_eq!(node.name, "Performance");
	}

	#[test]
	fn frames_stop_after_dispose() {
		let (port, mut host) = bridge::channel();
		let mut rt = SurfaceRuntime::new(port);
		rt.start(state());
		assert!(rt.frame(0.016));

		let (x, y) = node_screen_pos(&rt, 0);
		rt.pointer_down(x, y);
		rt.dispose();
		assert_eq!(rt.phase(), Phase::Disposed);
		assert!(rt.state().is_none());

		assert!(!rt.frame(0.016));
		assert!(!rt.pointer_up(x, y));
		// the port went with the runtime, so the host sees end of stream
		assert_eq!(block_on(host.recv()), None);

		rt.dispose();
		rt.start(state());
		assert_eq!(rt.phase(), Phase::Disposed);
	}

	#[test]
	fn stopped_surface_keeps_positions() {
		let (port, _host) = bridge::channel();
		let mut rt = SurfaceRuntime::new(port);
		rt.start(state());
		rt.stop();
		let before = rt.state().unwrap().simulation.nodes().to_vec();
		assert!(rt.frame(0.016));
		assert_eq!(rt.state().unwrap().simulation.nodes(), before.as_slice());
		rt.resume();
		rt.frame(0.016);
		assert_ne!(rt.state().unwrap().simulation.nodes(), before.as_slice());
	}

	#[test]
	fn failed_boot_keeps_message_and_ignores_input() {
		let (port, _host) = bridge::channel();
		let mut rt = SurfaceRuntime::new(port);
		rt.fail("link 0 references unknown node id `x`");
		assert_eq!(rt.phase(), Phase::Stopped);
		assert!(rt.error().is_some());
		rt.resume();
		assert_eq!(rt.phase(), Phase::Stopped);
		rt.pointer_down(1.0, 1.0);
		assert!(!rt.pointer_up(1.0, 1.0));
	}
}
