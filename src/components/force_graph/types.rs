use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	Document,
	Topic,
	Tag,
}

impl NodeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Document => "document",
			Self::Topic => "topic",
			Self::Tag => "tag",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A node as supplied by the host. Positions live in the simulation, never here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	#[serde(alias = "type")]
	pub kind: NodeKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub count: Option<u32>,
	/// Scope for the related-files view.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			kind,
			count: None,
			path: None,
		}
	}

	pub fn with_count(mut self, count: u32) -> Self {
		self.count = Some(count);
		self
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub strength: Option<f64>,
}

impl GraphLink {
	pub fn new(source: impl Into<String>, target: impl Into<String>, strength: f64) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			strength: Some(strength),
		}
	}

	/// Strength with the missing-value default applied.
	pub fn strength(&self) -> f64 {
		self.strength.unwrap_or(1.0)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Checks id uniqueness, link endpoints and link strengths.
	pub fn validate(&self) -> Result<(), LayoutError> {
		let mut ids = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !ids.insert(node.id.as_str()) {
				return Err(LayoutError::DuplicateNode {
					id: node.id.clone(),
				});
			}
		}
		for (i, link) in self.links.iter().enumerate() {
			for end in [&link.source, &link.target] {
				if !ids.contains(end.as_str()) {
					return Err(LayoutError::MissingEndpoint {
						link: i,
						id: end.clone(),
					});
				}
			}
			let strength = link.strength();
			if !strength.is_finite() || strength <= 0.0 {
				return Err(LayoutError::InvalidStrength { link: i, strength });
			}
		}
		Ok(())
	}

	/// Built-in graph shown when the supplier has nothing usable.
	pub fn sample() -> Self {
		let nodes = [
			("1", "Documentation", NodeKind::Topic, 45),
			("2", "API Reference", NodeKind::Topic, 32),
			("3", "Guides", NodeKind::Topic, 28),
			("4", "Architecture", NodeKind::Topic, 15),
			("5", "Integration", NodeKind::Topic, 22),
			("6", "Security", NodeKind::Tag, 18),
			("7", "Performance", NodeKind::Tag, 12),
		]
		.into_iter()
		.map(|(id, name, kind, count)| GraphNode::new(id, name, kind).with_count(count))
		.collect();

		let links = [
			("1", "2", 3.0),
			("1", "3", 2.0),
			("2", "4", 2.0),
			("3", "5", 1.0),
			("4", "6", 2.0),
			("5", "7", 1.0),
		]
		.into_iter()
		.map(|(s, t, w)| GraphLink::new(s, t, w))
		.collect();

		Self { nodes, links }
	}
}

/// Topic summary from the supplier's topic listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topic {
	#[serde(default)]
	pub id: Option<String>,
	pub name: String,
	#[serde(default)]
	pub count: Option<u32>,
}

impl From<&GraphNode> for Topic {
	fn from(node: &GraphNode) -> Self {
		Self {
			id: Some(node.id.clone()),
			name: node.name.clone(),
			count: node.count,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_is_valid_with_seven_nodes_and_six_links() {
		let g = GraphData::sample();
		assert_eq!(g.nodes.len(), 7);
		assert_eq!(g.links.len(), 6);
		assert_eq!(g.validate(), Ok(()));
	}

	#[test]
	fn dangling_link_is_a_configuration_error() {
		let mut g = GraphData::sample();
		g.links.push(GraphLink::new("1", "99", 1.0));
		assert_eq!(
			g.validate(),
			Err(LayoutError::MissingEndpoint {
				link: 6,
				id: "99".into()
			})
		);
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let mut g = GraphData::sample();
		g.nodes.push(GraphNode::new("3", "Again", NodeKind::Tag));
		assert!(matches!(g.validate(), Err(LayoutError::DuplicateNode { id }) if id == "3"));
	}

	#[test]
	fn non_positive_strength_is_rejected() {
		let mut g = GraphData::sample();
		g.links[0].strength = Some(0.0);
		assert!(matches!(
			g.validate(),
			Err(LayoutError::InvalidStrength { link: 0, .. })
		));
	}

	#[test]
	fn accepts_legacy_type_key_and_missing_strength() {
		let g: GraphData = serde_json::from_str(
			r#"{"nodes":[{"id":"a","name":"A","type":"document"}],
			    "links":[{"source":"a","target":"a"}]}"#,
		)
		.unwrap();
		assert_eq!(g.nodes[0].kind, NodeKind::Document);
		assert_eq!(g.links[0].strength(), 1.0);
	}
}
