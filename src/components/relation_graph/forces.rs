use glam::DVec2;
use log::trace;

use super::types::GraphNode;

/// Below this separation two points count as coincident.
const COINCIDENT_EPSILON: f64 = 1e-9;

/// Precomputed spring between two node indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Link {
	pub(super) source: usize,
	pub(super) target: usize,
	pub(super) strength: f64,
	/// Share of the correction taken by the target; the better-connected end
	/// moves less.
	pub(super) bias: f64,
}

impl Link {
	/// Builds the spring for an edge given both endpoint degrees.
	pub(super) fn new(source: usize, target: usize, degrees: &[usize]) -> Self {
		let source_degree = degrees[source].max(1) as f64;
		let target_degree = degrees[target].max(1) as f64;
		Self {
			source,
			target,
			strength: 1.0 / source_degree.min(target_degree),
			bias: source_degree / (source_degree + target_degree),
		}
	}
}

/// Deterministic unit vector for a coincident pair, so the same pair always
/// separates the same way.
fn separation_direction(a: usize, b: usize) -> DVec2 {
	let angle = ((a as f64) * 0.618_034 + (b as f64) * 0.414_214 + 0.37) * std::f64::consts::TAU;
	DVec2::new(angle.cos(), angle.sin())
}

/// Spring forces pulling linked nodes toward `distance` apart.
pub(super) fn apply_links(nodes: &mut [GraphNode], links: &[Link], distance: f64, alpha: f64) {
	for link in links {
		let (source, target) = (&nodes[link.source], &nodes[link.target]);
		let mut delta =
			(target.position + target.velocity) - (source.position + source.velocity);
		let mut length = delta.length();
		if length < COINCIDENT_EPSILON {
			trace!(
				"link {} -> {}: endpoints coincide, separating",
				source.id, target.id
			);
			delta = separation_direction(link.source, link.target) * COINCIDENT_EPSILON;
			length = COINCIDENT_EPSILON;
		}

		let pull = delta * ((length - distance) / length * alpha * link.strength);
		nodes[link.target].velocity -= pull * link.bias;
		nodes[link.source].velocity += pull * (1.0 - link.bias);
	}
}

/// Pairwise repulsion (or attraction for a positive `charge`) falling off
/// with distance. Squared distances are clamped to `min_distance²`.
pub(super) fn apply_many_body(nodes: &mut [GraphNode], charge: f64, min_distance: f64, alpha: f64) {
	let min_distance_sq = min_distance * min_distance;
	let count = nodes.len();
	for i in 0..count {
		for j in (i + 1)..count {
			let mut delta = nodes[j].position - nodes[i].position;
			let mut distance_sq = delta.length_squared();
			if distance_sq < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
				trace!(
					"nodes {} and {} coincide, clamping separation",
					nodes[i].id, nodes[j].id
				);
				delta = separation_direction(i, j) * min_distance;
				distance_sq = min_distance_sq;
			} else if distance_sq < min_distance_sq {
				distance_sq = min_distance_sq;
			}

			let weight = charge * alpha / distance_sq;
			nodes[i].velocity += delta * weight;
			nodes[j].velocity -= delta * weight;
		}
	}
}

/// Translates free nodes so the layout centroid drifts toward `center`.
pub(super) fn apply_centering(nodes: &mut [GraphNode], center: DVec2, strength: f64) {
	if nodes.is_empty() || strength <= 0.0 {
		return;
	}

	let centroid = nodes.iter().map(|node| node.position).sum::<DVec2>() / nodes.len() as f64;
	let shift = (center - centroid) * strength;
	for node in nodes.iter_mut().filter(|node| node.pinned.is_none()) {
		node.position += shift;
	}
}

/// Euler step. Pinned nodes are held at their pin with zero velocity.
pub(super) fn integrate(nodes: &mut [GraphNode], velocity_decay: f64) {
	let keep = 1.0 - velocity_decay;
	for node in nodes {
		match node.pinned {
			Some(pin) => {
				node.position = pin;
				node.velocity = DVec2::ZERO;
			}
			None => {
				node.velocity *= keep;
				node.position += node.velocity;
			}
		}
	}
}
