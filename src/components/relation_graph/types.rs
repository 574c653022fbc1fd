use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::error::{GraphError, Result};

/// Backend identifier of an entity (graph node).
pub type EntityId = i64;
/// Backend identifier of a relation (graph edge).
pub type RelationId = i64;

/// A node as handed to the core by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
	pub id: EntityId,
	pub name: String,
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
}

/// An edge as handed to the core by the host. Endpoints may be missing from
/// the node set; such edges are dropped at rebuild.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEdge {
	pub id: RelationId,
	pub source_id: EntityId,
	pub target_id: EntityId,
	pub type_label: String,
}

/// Immutable point-in-time copy of the visible nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
	pub nodes: Vec<SnapshotNode>,
	pub edges: Vec<SnapshotEdge>,
}

impl Snapshot {
	/// Parses a snapshot from its JSON wire form.
	pub fn from_json(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(GraphError::parse)
	}

	/// Builds a snapshot from backend entity and relation records.
	pub fn from_records(entities: &[Entity], relations: &[Relation]) -> Self {
		Self {
			nodes: entities
				.iter()
				.map(|entity| SnapshotNode {
					id: entity.id,
					name: entity.name.clone(),
					kind: Some(entity.kind.clone()),
				})
				.collect(),
			edges: relations
				.iter()
				.map(|relation| SnapshotEdge {
					id: relation.id,
					source_id: relation.source_id,
					target_id: relation.target_id,
					type_label: relation.relation_type.clone(),
				})
				.collect(),
		}
	}
}

/// Entity record as served by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	pub id: EntityId,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// Relation record as served by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
	pub id: RelationId,
	pub source_id: EntityId,
	pub target_id: EntityId,
	pub relation_type: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// Simulation-facing node.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: EntityId,
	pub label: String,
	pub position: DVec2,
	pub velocity: DVec2,
	/// Fixed coordinates while a drag is active; overrides the simulated position.
	pub pinned: Option<DVec2>,
}

/// Simulation-facing edge with endpoints resolved to node indices.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: RelationId,
	pub source: usize,
	pub target: usize,
	pub source_id: EntityId,
	pub target_id: EntityId,
	pub type_label: String,
}

impl GraphEdge {
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// What a screen point resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
	Node(EntityId),
	Edge(RelationId),
}

/// Intents surfaced to the host. The core never acts on them itself.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
	NodeSelected(EntityId),
	EdgeSelected(RelationId),
	/// Informational; positions are not persisted.
	NodeDragEnd { id: EntityId, position: DVec2 },
}
