//! Force-directed layout: link springs, many-body repulsion, centering and
//! collision, cooled by a decaying alpha.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::types::GraphData;
use crate::config::LayoutConfig;
use crate::error::LayoutError;

const INITIAL_RADIUS: f64 = 10.0;

/// Live layout state of one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub index: usize,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl SimNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// A link with both endpoints resolved to node indices.
#[derive(Clone, Debug, PartialEq)]
pub struct SimLink {
	pub source: usize,
	pub target: usize,
	pub strength: f64,
	spring: f64,
	bias: f64,
}

/// Linear congruential generator used to separate coincident nodes.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = (1_664_525 * self.0 + 1_013_904_223) % 4_294_967_296;
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

#[derive(Clone, Debug)]
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	config: LayoutConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	rng: Lcg,
}

impl Simulation {
	/// Builds a simulation, failing on any inconsistency in `data`.
	pub fn new(
		data: &GraphData,
		center: (f64, f64),
		config: LayoutConfig,
	) -> Result<Self, LayoutError> {
		data.validate()?;

		let index: HashMap<&str, usize> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();

		// phyllotaxis spiral, so no two nodes start on the same spot
		let angle_step = PI * (3.0 - 5f64.sqrt());
		let nodes = (0..data.nodes.len())
			.map(|i| {
				let r = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let a = i as f64 * angle_step;
				SimNode {
					index: i,
					x: center.0 + r * a.cos(),
					y: center.1 + r * a.sin(),
					..SimNode::default()
				}
			})
			.collect();

		let mut degree = vec![0usize; data.nodes.len()];
		let mut links = Vec::with_capacity(data.links.len());
		for (i, link) in data.links.iter().enumerate() {
			let resolve = |id: &String| {
				index
					.get(id.as_str())
					.copied()
					.ok_or_else(|| LayoutError::MissingEndpoint {
						link: i,
						id: id.clone(),
					})
			};
			let (source, target) = (resolve(&link.source)?, resolve(&link.target)?);
			degree[source] += 1;
			degree[target] += 1;
			links.push(SimLink {
				source,
				target,
				strength: link.strength(),
				spring: 0.0,
				bias: 0.0,
			});
		}
		for link in &mut links {
			let (ds, dt) = (degree[link.source] as f64, degree[link.target] as f64);
			link.bias = ds / (ds + dt);
			link.spring = (link.strength / ds.min(dt)).min(1.0);
		}

		Ok(Self {
			nodes,
			links,
			config,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			rng: Lcg(1),
		})
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
		self.nodes.get(idx).map(|n| (n.x, n.y))
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha.clamp(0.0, 1.0);
	}

	/// Re-arms a settled simulation so ticking resumes.
	pub fn restart(&mut self) {
		if self.alpha < self.config.alpha_min {
			self.alpha = self.config.alpha_min.max(self.alpha_target);
		}
	}

	/// Raises the alpha target for an active drag and resumes motion.
	pub fn reheat(&mut self) {
		self.set_alpha_target(self.config.drag_alpha_target);
		self.restart();
	}

	/// Lets alpha decay towards zero again.
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(n) = self.nodes.get_mut(idx) {
			n.fx = Some(x);
			n.fy = Some(y);
		}
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(n) = self.nodes.get_mut(idx) {
			n.fx = None;
			n.fy = None;
		}
	}

	pub fn unpin_all(&mut self) {
		for n in &mut self.nodes {
			n.fx = None;
			n.fy = None;
		}
	}

	pub fn is_pinned(&self, idx: usize) -> bool {
		self.nodes.get(idx).is_some_and(SimNode::is_pinned)
	}

	/// Advances one step unless the simulation has settled.
	pub fn tick(&mut self) -> bool {
		if self.is_settled() {
			return false;
		}
		self.step();
		true
	}

	/// Advances exactly one step.
	pub fn step(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_links();
		self.apply_many_body();
		self.apply_center();
		self.apply_collide();

		let keep = 1.0 - self.config.velocity_decay;
		for n in &mut self.nodes {
			match n.fx {
				Some(fx) => {
					n.x = fx;
					n.vx = 0.0;
				}
				None => {
					n.vx *= keep;
					n.x += n.vx;
				}
			}
			match n.fy {
				Some(fy) => {
					n.y = fy;
					n.vy = 0.0;
				}
				None => {
					n.vy *= keep;
					n.y += n.vy;
				}
			}
		}
	}

	fn apply_links(&mut self) {
		let distance = self.config.link_distance;
		for li in 0..self.links.len() {
			let SimLink {
				source,
				target,
				spring,
				bias,
				..
			} = self.links[li];
			let (s, t) = (&self.nodes[source], &self.nodes[target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let f = (l - distance) / l * self.alpha * spring;
			let (x, y) = (x * f, y * f);
			self.nodes[target].vx -= x * bias;
			self.nodes[target].vy -= y * bias;
			self.nodes[source].vx += x * (1.0 - bias);
			self.nodes[source].vy += y * (1.0 - bias);
		}
	}

	fn apply_many_body(&mut self) {
		let charge = self.config.charge_strength * self.alpha;
		let min2 = self.config.distance_min * self.config.distance_min;
		let n = self.nodes.len();
		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut dx = self.nodes[j].x - self.nodes[i].x;
				let mut dy = self.nodes[j].y - self.nodes[i].y;
				if dx == 0.0 {
					dx = self.rng.jiggle();
				}
				if dy == 0.0 {
					dy = self.rng.jiggle();
				}
				let mut l2 = dx * dx + dy * dy;
				if l2 < min2 {
					l2 = (min2 * l2).sqrt();
				}
				self.nodes[i].vx += dx * charge / l2;
				self.nodes[i].vy += dy * charge / l2;
			}
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (sx / n - self.center.0, sy / n - self.center.1);
		for node in &mut self.nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}

	fn apply_collide(&mut self) {
		let r = self.config.collide_radius;
		let min_sep = r + r;
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let mut x = a.x + a.vx - b.x - b.vx;
				let mut y = a.y + a.vy - b.y - b.vy;
				let mut l = x * x + y * y;
				if l >= min_sep * min_sep {
					continue;
				}
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				let l = l.sqrt();
				let f = (min_sep - l) / l;
				let (x, y) = (x * f, y * f);
				// equal radii: the correction is split evenly
				self.nodes[i].vx += x * 0.5;
				self.nodes[i].vy += y * 0.5;
				self.nodes[j].vx -= x * 0.5;
				self.nodes[j].vy -= y * 0.5;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode, NodeKind};

	fn sample_sim() -> Simulation {
		Simulation::new(&GraphData::sample(), (400.0, 300.0), LayoutConfig::default()).unwrap()
	}

	fn distance(sim: &Simulation, a: usize, b: usize) -> f64 {
		let (ax, ay) = sim.position(a).unwrap();
		let (bx, by) = sim.position(b).unwrap();
		((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
	}

	#[test]
	fn every_node_is_finite_after_one_tick() {
		let mut sim = sample_sim();
		assert!(sim.tick());
		for n in sim.nodes() {
			assert!(n.x.is_finite() && n.y.is_finite(), "{n:?}");
		}
	}

	#[test]
	fn self_loops_and_coincident_nodes_stay_finite() {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("a", "A", NodeKind::Document),
				GraphNode::new("b", "B", NodeKind::Tag),
			],
			links: vec![GraphLink::new("a", "a", 1.0), GraphLink::new("a", "b", 1.0)],
		};
		let mut sim = Simulation::new(&data, (0.0, 0.0), LayoutConfig::default()).unwrap();
		sim.pin(0, 5.0, 5.0);
		sim.pin(1, 5.0, 5.0);
		sim.step();
		sim.unpin_all();
		for _ in 0..20 {
			sim.step();
		}
		assert!(sim.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
	}

	#[test]
	fn empty_graph_ticks_without_panicking() {
		let mut sim =
			Simulation::new(&GraphData::default(), (0.0, 0.0), LayoutConfig::default()).unwrap();
		assert!(sim.tick());
	}

	#[test]
	fn dangling_reference_fails_construction() {
		let mut data = GraphData::sample();
		data.links.push(GraphLink::new("ghost", "1", 1.0));
		let err = Simulation::new(&data, (0.0, 0.0), LayoutConfig::default()).unwrap_err();
		assert_eq!(
			err,
			LayoutError::MissingEndpoint {
				link: 6,
				id: "ghost".into()
			}
		);
	}

	#[test]
	fn alpha_decays_until_the_simulation_settles() {
		let mut sim = sample_sim();
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert!(sim.is_settled());
		assert!((250..=350).contains(&ticks), "settled after {ticks} ticks");
		assert!(!sim.tick());
	}

	#[test]
	fn pinned_node_stays_exactly_on_pin() {
		let mut sim = sample_sim();
		sim.reheat();
		sim.pin(2, 123.5, -40.25);
		for _ in 0..10 {
			sim.tick();
			assert_eq!(sim.position(2), Some((123.5, -40.25)));
		}
	}

	#[test]
	fn releasing_a_pin_resumes_motion() {
		let mut sim = sample_sim();
		while sim.tick() {}
		sim.reheat();
		sim.pin(0, 0.0, 0.0);
		for _ in 0..5 {
			sim.tick();
		}
		sim.unpin(0);
		sim.cool();
		assert!(!sim.is_pinned(0));
		assert!(sim.alpha() > 0.0);
		let before = sim.position(0).unwrap();
		sim.tick();
		sim.tick();
		assert_ne!(sim.position(0).unwrap(), before);
	}

	#[test]
	fn reheat_restarts_a_settled_simulation() {
		let mut sim = sample_sim();
		while sim.tick() {}
		sim.reheat();
		assert!(!sim.is_settled());
		assert!(sim.tick());
	}

	#[test]
	fn layout_pulls_linked_nodes_together_and_keeps_them_apart() {
		let mut sim = sample_sim();
		for _ in 0..300 {
			sim.step();
		}
		// 1 and 2 are linked, 1 and 7 are three hops apart
		assert!(distance(&sim, 0, 1) < distance(&sim, 0, 6));
		for i in 0..sim.nodes().len() {
			for j in (i + 1)..sim.nodes().len() {
				assert!(distance(&sim, i, j) > 40.0, "{i} and {j} overlap");
			}
		}
	}

	#[test]
	fn layout_is_centered() {
		let mut sim = sample_sim();
		for _ in 0..50 {
			sim.step();
		}
		let n = sim.nodes().len() as f64;
		let cx = sim.nodes().iter().map(|n| n.x).sum::<f64>() / n;
		let cy = sim.nodes().iter().map(|n| n.y).sum::<f64>() / n;
		assert!((cx - 400.0).abs() < 50.0 && (cy - 300.0).abs() < 50.0);
	}

	#[test]
	fn construction_is_deterministic() {
		let (mut a, mut b) = (sample_sim(), sample_sim());
		for _ in 0..30 {
			a.step();
			b.step();
		}
		assert_eq!(a.nodes(), b.nodes());
	}
}
