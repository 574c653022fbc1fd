//! Errors surfaced by the layout core.
//!
//! Only malformed snapshots are reported. Coincident nodes are handled
//! inside the force step and never reach the caller.

use thiserror::Error;

use super::types::{EntityId, RelationId};

/// Convenience alias for fallible graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Things that can go wrong when handing data to the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
	/// The snapshot could not be used. The previous graph stays in place.
	#[error("invalid graph input: {0}")]
	InvalidGraphInput(String),
}

impl GraphError {
	pub(crate) fn parse(source: serde_json::Error) -> Self {
		Self::InvalidGraphInput(format!("malformed JSON: {source}"))
	}

	pub(crate) fn duplicate_node(id: EntityId) -> Self {
		Self::InvalidGraphInput(format!("duplicate node id {id}"))
	}

	pub(crate) fn duplicate_edge(id: RelationId) -> Self {
		Self::InvalidGraphInput(format!("duplicate edge id {id}"))
	}

	pub(crate) fn non_finite(what: &str, value: f64) -> Self {
		Self::InvalidGraphInput(format!("{what} must be finite, got {value}"))
	}
}
