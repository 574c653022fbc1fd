mod canvas;
mod component;
pub mod config;
pub mod error;
mod forces;
mod listener;
pub mod render;
pub mod simulation;
pub mod state;
pub mod surface;
pub mod transform;
pub mod types;

pub use canvas::CanvasRenderer;
pub use component::RelationGraphCanvas;
pub use config::{GraphConfig, LayoutConfig, SurfaceConfig};
pub use error::{GraphError, Result};
pub use render::{DrawCommand, DrawList, Renderer, render_frame};
pub use simulation::{LayoutSimulator, RebuildStats};
pub use state::RelationGraphState;
pub use surface::{Gesture, InteractionSurface};
pub use transform::ViewTransform;
pub use types::{
	Entity, EntityId, GraphEdge, GraphNode, HitTarget, Relation, RelationId, Snapshot,
	SnapshotEdge, SnapshotNode, SurfaceEvent,
};
