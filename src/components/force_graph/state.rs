use std::collections::HashSet;

use super::scale::{self, ZoomTransform};
use super::simulation::Simulation;
use super::types::{GraphData, GraphNode};
use crate::bridge::{BootPayload, SurfaceMessage};
use crate::config::{SurfaceConfig, ViewConfig};
use crate::error::LayoutError;
use crate::theme::Theme;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Set on press over a node, cleared once the pointer travels too far.
	pub click_candidate: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

const FOCUS_DELAY: f64 = 0.08;
const FOCUS_RISE: f64 = 1.8;
const FOCUS_FALL: f64 = 1.26;

/// Emphasis on the hovered node and its neighborhood. Once the pointer moves
/// off, the last focus stays on screen until `level` has faded out.
#[derive(Clone, Debug, Default)]
pub struct Focus {
	node: Option<usize>,
	members: HashSet<usize>,
	held: bool,
	waited: f64,
	/// 0 when nothing is emphasized, approaching 1 while the pointer rests.
	pub level: f64,
}

impl Focus {
	/// Node under the pointer right now, ignoring a fading focus.
	pub fn hovered(&self) -> Option<usize> {
		self.node.filter(|_| self.held)
	}

	fn hold(&mut self, idx: usize, neighbors: &[usize]) {
		if self.held && self.node == Some(idx) {
			return;
		}
		if !self.held {
			self.waited = 0.0;
		}
		self.node = Some(idx);
		self.members.clear();
		self.members.insert(idx);
		self.members.extend(neighbors.iter().copied());
		self.held = true;
	}

	fn release(&mut self) {
		self.held = false;
	}

	fn advance(&mut self, dt: f64) {
		if self.held {
			self.waited = (self.waited + dt).min(FOCUS_DELAY);
			if self.waited >= FOCUS_DELAY {
				self.level += (1.0 - self.level) * FOCUS_RISE * dt;
			}
		} else if self.node.is_some() {
			self.level -= self.level * FOCUS_FALL * dt;
			if self.level < 0.01 {
				*self = Self::default();
			}
		}
	}
}

/// Tooltip anchored near the pointer, in screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub x: f64,
	pub y: f64,
	pub lines: Vec<String>,
}

impl Tooltip {
	fn for_node(node: &GraphNode, sx: f64, sy: f64) -> Self {
		let mut lines = vec![node.name.clone(), format!("Type: {}", node.kind)];
		if let Some(count) = node.count {
			lines.push(format!("Docs: {count}"));
		}
		Self {
			x: sx + 10.0,
			y: sy - 10.0,
			lines,
		}
	}
}

/// Everything one render surface knows: its boot data, the live layout and
/// the pointer state.
pub struct ForceGraphState {
	pub graph: GraphData,
	pub simulation: Simulation,
	pub theme: Theme,
	pub view: ViewConfig,
	pub transform: ZoomTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub focus: Focus,
	pub tooltip: Option<Tooltip>,
	pub width: f64,
	pub height: f64,
	neighbors: Vec<Vec<usize>>,
}

impl ForceGraphState {
	pub fn boot(payload: BootPayload, width: f64, height: f64) -> Result<Self, LayoutError> {
		let BootPayload {
			graph,
			theme,
			config: SurfaceConfig { layout, view },
			..
		} = payload;
		let simulation = Simulation::new(&graph, (width / 2.0, height / 2.0), layout)?;

		let mut neighbors = vec![Vec::new(); graph.nodes.len()];
		for link in simulation.links() {
			neighbors[link.source].push(link.target);
			neighbors[link.target].push(link.source);
		}

		Ok(Self {
			graph,
			simulation,
			theme,
			view,
			transform: ZoomTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			focus: Focus::default(),
			tooltip: None,
			width,
			height,
			neighbors,
		})
	}

	pub fn node(&self, idx: usize) -> Option<&GraphNode> {
		self.graph.nodes.get(idx)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		// overlapping circles: the closest center wins
		self.simulation
			.nodes()
			.iter()
			.filter_map(|n| {
				let r = scale::node_radius(self.graph.nodes[n.index].kind);
				let (dx, dy) = (n.x - gx, n.y - gy);
				let d2 = dx * dx + dy * dy;
				(d2 <= r * r).then_some((n.index, d2))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(idx, _)| idx)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			let Some((nx, ny)) = self.simulation.position(idx) else {
				return;
			};
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: sx,
				start_y: sy,
				node_start_x: nx,
				node_start_y: ny,
				click_candidate: true,
			};
			self.simulation.pin(idx, nx, ny);
			self.simulation.reheat();
			self.tooltip = None;
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.drag.active {
			let Some(idx) = self.drag.node_idx else {
				return;
			};
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if dx.hypot(dy) > self.view.click_tolerance {
				self.drag.click_candidate = false;
			}
			let k = self.transform.k;
			self.simulation.pin(
				idx,
				self.drag.node_start_x + dx / k,
				self.drag.node_start_y + dy / k,
			);
			return;
		}

		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}

		let hovered = self.node_at_position(sx, sy);
		self.set_hover(hovered);
		self.tooltip = hovered
			.and_then(|idx| self.node(idx))
			.map(|node| Tooltip::for_node(node, sx, sy));
	}

	/// Ends a drag or pan. A press that never left the node is a click.
	pub fn pointer_up(&mut self, _sx: f64, _sy: f64) -> Option<SurfaceMessage> {
		self.pan.active = false;
		if !self.drag.active {
			return None;
		}
		let drag = std::mem::take(&mut self.drag);
		let idx = drag.node_idx?;
		self.simulation.unpin(idx);
		self.simulation.cool();

		if !drag.click_candidate {
			return None;
		}
		self.node(idx).map(|node| SurfaceMessage::NodeClick { node: node.clone() })
	}

	pub fn pointer_leave(&mut self) {
		if let Some(idx) = std::mem::take(&mut self.drag).node_idx {
			self.simulation.unpin(idx);
			self.simulation.cool();
		}
		self.pan.active = false;
		self.set_hover(None);
		self.tooltip = None;
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.transform.zoom_at(
			sx,
			sy,
			scale::wheel_factor(delta_y),
			self.view.min_zoom,
			self.view.max_zoom,
		);
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		match node {
			Some(idx) => {
				let neighbors = self.neighbors.get(idx).map_or(&[][..], Vec::as_slice);
				self.focus.hold(idx, neighbors);
			}
			None => self.focus.release(),
		}
	}

	/// Whether `idx` is the focused node or one of its neighbors.
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.focus.members.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.focus.node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.focus.node.is_some()
	}

	/// Advances the layout (if it has not settled) and the focus fade.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.tick();
		self.focus.advance(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.set_center(width / 2.0, height / 2.0);
		let alpha = self.simulation.alpha().max(self.simulation.config().drag_alpha_target);
		self.simulation.set_alpha(alpha);
	}

	/// Drops every pin; used when the surface goes away mid-drag.
	pub fn release_all(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.simulation.unpin_all();
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::force_graph::NodeKind;

	fn booted() -> ForceGraphState {
		let payload = BootPayload::new(1, GraphData::sample(), Theme::dark(), SurfaceConfig::default());
		ForceGraphState::boot(payload, 800.0, 600.0).unwrap()
	}

	fn screen_pos(s: &ForceGraphState, idx: usize) -> (f64, f64) {
		let (x, y) = s.simulation.position(idx).unwrap();
		s.transform.graph_to_screen(x, y)
	}

	#[test]
	fn clicking_documentation_posts_full_node() {
		let mut s = booted();
		let (x, y) = screen_pos(&s, 0);
		s.pointer_down(x, y);
		let msg = s.pointer_up(x, y).unwrap();
		let value = serde_json::to_value(&msg).unwrap();
		assert_eq!(
			value,
			json!({ "type": "nodeClick", "node": { "id": "1", "name": "Documentation", "kind": "topic", "count": 45 } })
		);
		assert!(!s.simulation.is_pinned(0));
	}

	#[test]
	fn dragging_pins_node_to_pointer_then_releases() {
		let mut s = booted();
		for _ in 0..400 {
			s.tick(0.016);
		}
		assert!(s.simulation.is_settled());

		let (x, y) = screen_pos(&s, 3);
		s.pointer_down(x, y);
		assert!(!s.simulation.is_settled());
		s.pointer_move(x + 50.0, y - 20.0);
		let (px, py) = s.transform.screen_to_graph(x + 50.0, y - 20.0);
		for _ in 0..5 {
			s.tick(0.016);
			let (nx, ny) = s.simulation.position(3).unwrap();
			assert!((nx - px).abs() < 1e-9 && (ny - py).abs() < 1e-9);
		}

		assert_eq!(s.pointer_up(x + 50.0, y - 20.0), None);
		assert!(!s.simulation.is_pinned(3));
		assert!(s.simulation.alpha() > 0.0);
		let before = s.simulation.position(3).unwrap();
		s.tick(0.016);
		s.tick(0.016);
		assert_ne!(s.simulation.position(3).unwrap(), before);
	}

	#[test]
	fn drag_respects_zoom() {
		let mut s = booted();
		s.wheel(400.0, 300.0, -500.0);
		let k = s.transform.k;
		assert!(k > 1.0);
		let (x, y) = screen_pos(&s, 1);
		let (gx, gy) = s.simulation.position(1).unwrap();
		s.pointer_down(x, y);
		s.pointer_move(x + 40.0, y);
		// the pin only takes effect on the next tick
		assert_eq!(s.simulation.position(1).unwrap(), (gx, gy));
		s.tick(0.016);
		let (nx, ny) = s.simulation.position(1).unwrap();
		assert!((nx - (gx + 40.0 / k)).abs() < 1e-9);
		assert!((ny - gy).abs() < 1e-9);
	}

	#[test]
	fn pointer_leave_clears_pin_and_tooltip() {
		let mut s = booted();
		let (x, y) = screen_pos(&s, 5);
		s.pointer_down(x, y);
		assert!(s.simulation.is_pinned(5));
		s.pointer_leave();
		assert!(!s.simulation.is_pinned(5));
		assert!(!s.drag.active);
		assert_eq!(s.tooltip, None);
	}

	#[test]
	fn hover_shows_tooltip_and_mouse_out_hides_it() {
		let mut s = booted();
		let (x, y) = screen_pos(&s, 0);
		s.pointer_move(x, y);
		let tip = s.tooltip.clone().unwrap();
		assert_eq!(tip.lines, ["Documentation", "Type: topic", "Docs: 45"]);
		assert_eq!((tip.x, tip.y), (x + 10.0, y - 10.0));
		assert!(s.is_highlighted(1) && s.is_highlighted(2));
		assert!(!s.is_highlighted(6));

		s.pointer_move(-5000.0, -5000.0);
		assert_eq!(s.tooltip, None);
		assert_eq!(s.focus.hovered(), None);
	}

	#[test]
	fn focus_fades_out_after_the_pointer_leaves() {
		let mut s = booted();
		let (x, y) = screen_pos(&s, 0);
		s.pointer_move(x, y);
		for _ in 0..60 {
			s.tick(0.016);
		}
		assert!(s.focus.level > 0.5);

		s.pointer_leave();
		assert_eq!(s.focus.hovered(), None);
		// still drawn while it fades
		assert!(s.has_active_highlight() && s.is_highlighted(1));
		for _ in 0..400 {
			s.tick(0.016);
		}
		assert!(!s.has_active_highlight());
		assert!(!s.is_highlighted(0));
		assert_eq!(s.focus.level, 0.0);
	}

	#[test]
	fn tooltip_omits_missing_count() {
		let node = GraphNode::new("x", "Loose", NodeKind::Document);
		let tip = Tooltip::for_node(&node, 0.0, 0.0);
		assert_eq!(tip.lines, ["Loose", "Type: document"]);
	}

	#[test]
	fn background_drag_pans_whole_view() {
		let mut s = booted();
		let before = s.simulation.position(0).unwrap();
		s.pointer_down(-1000.0, -1000.0);
		s.pointer_move(-970.0, -990.0);
		assert_eq!((s.transform.x, s.transform.y), (30.0, 10.0));
		assert_eq!(s.pointer_up(-970.0, -990.0), None);
		assert!(!s.pan.active);
		assert_eq!(s.simulation.position(0).unwrap(), before);
	}

	#[test]
	fn resize_recenters_a_settled_layout() {
		let mut s = booted();
		while !s.simulation.is_settled() {
			s.tick(0.016);
		}
		s.resize(1200.0, 600.0);
		assert!(!s.simulation.is_settled());
		for _ in 0..300 {
			s.tick(0.016);
		}
		let n = s.simulation.nodes().len() as f64;
		let cx = s.simulation.nodes().iter().map(|n| n.x).sum::<f64>() / n;
		assert!((cx - 600.0).abs() < 1.0, "center x = {cx}");
	}

	#[test]
	fn wheel_zoom_stays_in_range() {
		let mut s = booted();
		for delta in [-100_000.0, 42.0, 1e9, -3.0] {
			s.wheel(10.0, 10.0, delta);
			assert!((0.5..=4.0).contains(&s.transform.k));
		}
	}
}
