//! Headless force layout.
//!
//! Owns node positions and velocities and advances them one discrete step at
//! a time. Nothing in here knows about canvases or pointer input.

use std::collections::{HashMap, HashSet};

use glam::DVec2;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::LayoutConfig;
use super::error::{GraphError, Result};
use super::forces::{self, Link};
use super::types::{EntityId, GraphEdge, GraphNode, Snapshot};

const DEFAULT_SEED: u64 = 0x5eed_1a70;

/// What a rebuild did, for logging and for hosts that want to show it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildStats {
	pub kept_nodes: usize,
	pub added_nodes: usize,
	pub removed_nodes: usize,
	pub edges: usize,
	pub dropped_edges: usize,
	/// Whether alpha was raised because the topology changed.
	pub reheated: bool,
}

/// Force-directed layout over the current snapshot.
pub struct LayoutSimulator {
	config: LayoutConfig,
	center: DVec2,
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	links: Vec<Link>,
	index_by_id: HashMap<EntityId, usize>,
	alpha: f64,
	built: bool,
	tick_count: u64,
	rng: StdRng,
}

impl LayoutSimulator {
	/// Creates an empty simulation centred on a `width` × `height` canvas.
	pub fn new(config: LayoutConfig, width: f64, height: f64) -> Self {
		Self::with_seed(config, width, height, DEFAULT_SEED)
	}

	/// Same as [`LayoutSimulator::new`] with an explicit seed for the
	/// placement jitter of new nodes.
	pub fn with_seed(config: LayoutConfig, width: f64, height: f64, seed: u64) -> Self {
		Self {
			center: DVec2::new(width / 2.0, height / 2.0),
			nodes: Vec::new(),
			edges: Vec::new(),
			links: Vec::new(),
			index_by_id: HashMap::new(),
			alpha: 0.0,
			built: false,
			tick_count: 0,
			rng: StdRng::seed_from_u64(seed),
			config,
		}
	}

	/// Replaces the active graph with `snapshot`.
	///
	/// Nodes whose id was already present keep their position, velocity and
	/// pin. New nodes are scattered around the canvas centre. Edges with an
	/// unknown endpoint are dropped. The snapshot is validated before
	/// anything is touched, so a rejected snapshot leaves the previous graph
	/// intact.
	pub fn rebuild(&mut self, snapshot: &Snapshot) -> Result<RebuildStats> {
		let mut index_by_id = HashMap::with_capacity(snapshot.nodes.len());
		for (index, node) in snapshot.nodes.iter().enumerate() {
			if index_by_id.insert(node.id, index).is_some() {
				warn!("rejecting snapshot: duplicate node id {}", node.id);
				return Err(GraphError::duplicate_node(node.id));
			}
		}
		let mut edge_ids = HashSet::with_capacity(snapshot.edges.len());
		for edge in &snapshot.edges {
			if !edge_ids.insert(edge.id) {
				warn!("rejecting snapshot: duplicate edge id {}", edge.id);
				return Err(GraphError::duplicate_edge(edge.id));
			}
		}

		let mut stats = RebuildStats::default();
		let mut prior = std::mem::take(&mut self.nodes)
			.into_iter()
			.map(|node| (node.id, node))
			.collect::<HashMap<_, _>>();
		let prior_edges = std::mem::take(&mut self.edges)
			.into_iter()
			.map(|edge| (edge.id, (edge.source_id, edge.target_id)))
			.collect::<HashMap<_, _>>();

		let mut nodes = Vec::with_capacity(snapshot.nodes.len());
		for incoming in &snapshot.nodes {
			if let Some(mut node) = prior.remove(&incoming.id) {
				node.label.clone_from(&incoming.name);
				nodes.push(node);
				stats.kept_nodes += 1;
			} else {
				nodes.push(self.seed_node(incoming.id, incoming.name.clone()));
				stats.added_nodes += 1;
			}
		}
		stats.removed_nodes = prior.len();

		let mut edges = Vec::with_capacity(snapshot.edges.len());
		let mut degrees = vec![0usize; nodes.len()];
		for edge in &snapshot.edges {
			let (Some(&source), Some(&target)) = (
				index_by_id.get(&edge.source_id),
				index_by_id.get(&edge.target_id),
			) else {
				debug!(
					"dropping edge {}: endpoint {} -> {} not in snapshot",
					edge.id, edge.source_id, edge.target_id
				);
				stats.dropped_edges += 1;
				continue;
			};
			if source != target {
				degrees[source] += 1;
				degrees[target] += 1;
			}
			edges.push(GraphEdge {
				id: edge.id,
				source,
				target,
				source_id: edge.source_id,
				target_id: edge.target_id,
				type_label: edge.type_label.clone(),
			});
		}
		stats.edges = edges.len();

		let topology_changed = !self.built
			|| stats.added_nodes > 0
			|| stats.removed_nodes > 0
			|| edges.len() != prior_edges.len()
			|| edges.iter().any(|edge| {
				prior_edges.get(&edge.id) != Some(&(edge.source_id, edge.target_id))
			});

		self.links = edges
			.iter()
			.filter(|edge| !edge.is_self_loop())
			.map(|edge| Link::new(edge.source, edge.target, &degrees))
			.collect();
		self.nodes = nodes;
		self.edges = edges;
		self.index_by_id = index_by_id;

		if topology_changed {
			let warm = if self.built {
				self.config.rebuild_alpha
			} else {
				self.config.initial_alpha
			};
			self.reheat(warm);
			stats.reheated = true;
		}
		self.built = true;

		debug!(
			"rebuild: {} kept, {} added, {} removed, {} edges ({} dropped), alpha {:.3}",
			stats.kept_nodes,
			stats.added_nodes,
			stats.removed_nodes,
			stats.edges,
			stats.dropped_edges,
			self.alpha
		);
		Ok(stats)
	}

	fn seed_node(&mut self, id: EntityId, label: String) -> GraphNode {
		let jitter = self.config.seed_jitter.abs().max(f64::EPSILON);
		let offset = DVec2::new(
			self.rng.gen_range(-jitter..=jitter),
			self.rng.gen_range(-jitter..=jitter),
		);
		GraphNode {
			id,
			label,
			position: self.center + offset,
			velocity: DVec2::ZERO,
			pinned: None,
		}
	}

	/// Advances the layout by one step and decays alpha.
	pub fn tick(&mut self) {
		let alpha = self.alpha;
		let config = &self.config;

		forces::apply_links(&mut self.nodes, &self.links, config.link_distance, alpha);
		forces::apply_many_body(&mut self.nodes, config.charge, config.min_distance, alpha);
		forces::apply_centering(&mut self.nodes, self.center, config.center_strength);
		forces::integrate(&mut self.nodes, config.velocity_decay);

		let was_settled = self.is_settled();
		self.alpha = (self.alpha * (1.0 - config.alpha_decay)).max(config.alpha_floor.min(self.alpha));
		self.tick_count += 1;
		if !was_settled && self.is_settled() {
			debug!("layout settled after {} ticks", self.tick_count);
		}
	}

	/// Holds node `id` at `position` until [`LayoutSimulator::clear_pinned`].
	/// Returns `false` for an unknown id.
	pub fn set_pinned(&mut self, id: EntityId, position: DVec2) -> bool {
		let Some(&index) = self.index_by_id.get(&id) else {
			return false;
		};
		let node = &mut self.nodes[index];
		node.pinned = Some(position);
		node.position = position;
		node.velocity = DVec2::ZERO;
		self.reheat(self.config.drag_alpha);
		true
	}

	/// Releases a pin. The node keeps its current position.
	pub fn clear_pinned(&mut self, id: EntityId) -> bool {
		let Some(&index) = self.index_by_id.get(&id) else {
			return false;
		};
		self.nodes[index].pinned.take().is_some()
	}

	/// Raises alpha to at least `alpha`. Never cools the layout.
	pub fn reheat(&mut self, alpha: f64) {
		if alpha > self.alpha {
			self.alpha = alpha;
		}
	}

	/// True once alpha has decayed below the convergence threshold.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn center(&self) -> DVec2 {
		self.center
	}

	pub fn tick_count(&self) -> u64 {
		self.tick_count
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	pub fn node_index(&self, id: EntityId) -> Option<usize> {
		self.index_by_id.get(&id).copied()
	}

	pub fn node(&self, id: EntityId) -> Option<&GraphNode> {
		self.node_index(id).map(|index| &self.nodes[index])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relation_graph::types::{SnapshotEdge, SnapshotNode};

	fn snapshot(nodes: &[i64], edges: &[(i64, i64, i64)]) -> Snapshot {
		Snapshot {
			nodes: nodes
				.iter()
				.map(|&id| SnapshotNode {
					id,
					name: format!("n{id}"),
					kind: None,
				})
				.collect(),
			edges: edges
				.iter()
				.map(|&(id, source_id, target_id)| SnapshotEdge {
					id,
					source_id,
					target_id,
					type_label: "rel".into(),
				})
				.collect(),
		}
	}

	fn simulator() -> LayoutSimulator {
		LayoutSimulator::new(LayoutConfig::default(), 800.0, 600.0)
	}

	#[test]
	fn new_nodes_seed_near_center() {
		let mut sim = simulator();
		sim.rebuild(&snapshot(&[1, 2, 3], &[])).unwrap();
		let jitter = LayoutConfig::default().seed_jitter;
		for node in sim.nodes() {
			let offset = node.position - DVec2::new(400.0, 300.0);
			assert!(offset.x.abs() <= jitter && offset.y.abs() <= jitter);
		}
		assert_ne!(sim.nodes()[0].position, sim.nodes()[1].position);
	}

	#[test]
	fn empty_graph_is_valid() {
		let mut sim = simulator();
		let stats = sim.rebuild(&Snapshot::default()).unwrap();
		assert_eq!(stats.edges, 0);
		for _ in 0..10 {
			sim.tick();
		}
		assert!(sim.nodes().is_empty());
	}

	#[test]
	fn isolated_node_stays_finite() {
		let mut sim = simulator();
		sim.rebuild(&snapshot(&[1], &[])).unwrap();
		for _ in 0..50 {
			sim.tick();
		}
		assert!(sim.nodes()[0].position.is_finite());
	}

	#[test]
	fn rejected_snapshot_keeps_previous_graph() {
		let mut sim = simulator();
		sim.rebuild(&snapshot(&[1, 2], &[(1, 1, 2)])).unwrap();
		for _ in 0..20 {
			sim.tick();
		}
		let before = sim.nodes().to_vec();
		let alpha = sim.alpha();

		let err = sim.rebuild(&snapshot(&[1, 1], &[])).unwrap_err();
		assert_eq!(err, GraphError::duplicate_node(1));
		let err = sim.rebuild(&snapshot(&[1, 2], &[(5, 1, 2), (5, 2, 1)])).unwrap_err();
		assert_eq!(err, GraphError::duplicate_edge(5));

		assert_eq!(sim.nodes(), before.as_slice());
		assert_eq!(sim.edges().len(), 1);
		assert_eq!(sim.alpha(), alpha);
	}

	#[test]
	fn unchanged_topology_does_not_reheat() {
		let mut sim = simulator();
		sim.rebuild(&snapshot(&[1, 2], &[(1, 1, 2)])).unwrap();
		for _ in 0..100 {
			sim.tick();
		}
		let alpha = sim.alpha();
		let stats = sim.rebuild(&snapshot(&[1, 2], &[(1, 1, 2)])).unwrap();
		assert!(!stats.reheated);
		assert_eq!(sim.alpha(), alpha);
	}

	#[test]
	fn topology_change_reheats_to_warm_alpha() {
		let mut sim = simulator();
		sim.rebuild(&snapshot(&[1, 2], &[])).unwrap();
		while !sim.is_settled() {
			sim.tick();
		}
		let stats = sim.rebuild(&snapshot(&[1, 2, 3], &[(1, 1, 3)])).unwrap();
		assert!(stats.reheated);
		assert_eq!(stats.added_nodes, 1);
		assert_eq!(sim.alpha(), LayoutConfig::default().rebuild_alpha);
	}

	#[test]
	fn rebuild_updates_labels_of_kept_nodes() {
		let mut sim = simulator();
		sim.rebuild(&snapshot(&[1], &[])).unwrap();
		let mut renamed = snapshot(&[1], &[]);
		renamed.nodes[0].name = "Alice".into();
		sim.rebuild(&renamed).unwrap();
		assert_eq!(sim.node(1).unwrap().label, "Alice");
	}

	#[test]
	fn pin_holds_node_and_reheats() {
		let mut sim = simulator();
		sim.rebuild(&snapshot(&[1, 2], &[(1, 1, 2)])).unwrap();
		while !sim.is_settled() {
			sim.tick();
		}

		let pin = DVec2::new(10.0, 20.0);
		assert!(sim.set_pinned(1, pin));
		assert!(!sim.is_settled());
		assert_eq!(sim.alpha(), LayoutConfig::default().drag_alpha);
		for _ in 0..30 {
			sim.tick();
		}
		assert_eq!(sim.node(1).unwrap().position, pin);

		assert!(sim.clear_pinned(1));
		assert!(!sim.clear_pinned(1));
		assert_eq!(sim.node(1).unwrap().pinned, None);
		assert!(!sim.set_pinned(99, pin));
	}

	#[test]
	fn self_loop_is_kept_but_exerts_no_force() {
		let mut sim = simulator();
		let stats = sim.rebuild(&snapshot(&[1], &[(1, 1, 1)])).unwrap();
		assert_eq!(stats.edges, 1);
		sim.tick();
		assert!(sim.nodes()[0].position.is_finite());
	}

	#[test]
	fn same_seed_same_layout() {
		let mut a = LayoutSimulator::with_seed(LayoutConfig::default(), 800.0, 600.0, 7);
		let mut b = LayoutSimulator::with_seed(LayoutConfig::default(), 800.0, 600.0, 7);
		let data = snapshot(&[1, 2, 3], &[(1, 1, 2), (2, 2, 3)]);
		a.rebuild(&data).unwrap();
		b.rebuild(&data).unwrap();
		for _ in 0..40 {
			a.tick();
			b.tick();
		}
		assert_eq!(a.nodes(), b.nodes());
	}
}
