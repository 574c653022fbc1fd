//! Pointer handling, hit testing and the pan/zoom transform.
//!
//! The surface reads node positions from the simulator and writes back only
//! through pins. Selections and drag ends leave as [`SurfaceEvent`]s for the
//! host to act on.

use glam::DVec2;
use log::debug;

use super::config::SurfaceConfig;
use super::simulation::LayoutSimulator;
use super::transform::ViewTransform;
use super::types::{EntityId, HitTarget, RelationId, SurfaceEvent};

/// Gesture state machine. A press on a node drags it, a press on empty
/// canvas pans.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
	Idle,
	Dragging {
		id: EntityId,
		origin: DVec2,
		/// Node position minus the pressed point, in graph space.
		grab: DVec2,
		moved: bool,
	},
	Panning {
		origin: DVec2,
		last: DVec2,
		moved: bool,
	},
}

pub struct InteractionSurface {
	config: SurfaceConfig,
	transform: ViewTransform,
	gesture: Gesture,
	hovered_edge: Option<RelationId>,
	suppress_click: bool,
	width: f64,
	height: f64,
	needs_redraw: bool,
}

fn distance_to_segment(point: DVec2, a: DVec2, b: DVec2) -> f64 {
	let ab = b - a;
	let length_sq = ab.length_squared();
	if length_sq <= f64::EPSILON {
		return point.distance(a);
	}
	let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
	point.distance(a + ab * t)
}

impl InteractionSurface {
	pub fn new(config: SurfaceConfig, width: f64, height: f64) -> Self {
		Self {
			config,
			transform: ViewTransform::IDENTITY,
			gesture: Gesture::Idle,
			hovered_edge: None,
			suppress_click: false,
			width,
			height,
			needs_redraw: true,
		}
	}

	pub fn config(&self) -> &SurfaceConfig {
		&self.config
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn gesture(&self) -> Gesture {
		self.gesture
	}

	pub fn hovered_edge(&self) -> Option<RelationId> {
		self.hovered_edge
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Whether something changed since the last [`Self::take_redraw`].
	pub fn needs_redraw(&self) -> bool {
		self.needs_redraw
	}

	pub(super) fn take_redraw(&mut self) -> bool {
		std::mem::take(&mut self.needs_redraw)
	}

	pub(super) fn request_redraw(&mut self) {
		self.needs_redraw = true;
	}

	/// Nearest node whose marker contains the point, else nearest edge within
	/// the stroke tolerance, else nothing.
	pub fn hit_test(&self, sim: &LayoutSimulator, screen: DVec2) -> Option<HitTarget> {
		let point = self.transform.screen_to_graph(screen);
		let nodes = sim.nodes();

		let node = nodes
			.iter()
			.map(|node| (node.id, node.position.distance(point)))
			.filter(|&(_, distance)| distance <= self.config.node_radius)
			.min_by(|a, b| a.1.total_cmp(&b.1));
		if let Some((id, _)) = node {
			return Some(HitTarget::Node(id));
		}

		let tolerance = self.config.edge_hit_tolerance / self.transform.k;
		sim.edges()
			.iter()
			.filter(|edge| !edge.is_self_loop())
			.map(|edge| {
				let distance = distance_to_segment(
					point,
					nodes[edge.source].position,
					nodes[edge.target].position,
				);
				(edge.id, distance)
			})
			.filter(|&(_, distance)| distance <= tolerance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(id, _)| HitTarget::Edge(id))
	}

	pub fn pointer_down(&mut self, sim: &mut LayoutSimulator, screen: DVec2) {
		self.gesture = match self.hit_test(sim, screen) {
			Some(HitTarget::Node(id)) => {
				// Pin where the node is; it keeps its offset to the pointer once it moves.
				let pressed = self.transform.screen_to_graph(screen);
				let position = sim.node(id).map_or(pressed, |node| node.position);
				sim.set_pinned(id, position);
				debug!("drag start on node {id}");
				Gesture::Dragging {
					id,
					origin: screen,
					grab: position - pressed,
					moved: false,
				}
			}
			_ => Gesture::Panning {
				origin: screen,
				last: screen,
				moved: false,
			},
		};
		self.suppress_click = false;
		self.needs_redraw = true;
	}

	pub fn pointer_move(&mut self, sim: &mut LayoutSimulator, screen: DVec2) {
		if self.gesture == Gesture::Idle {
			let hovered = match self.hit_test(sim, screen) {
				Some(HitTarget::Edge(id)) => Some(id),
				_ => None,
			};
			if hovered != self.hovered_edge {
				self.hovered_edge = hovered;
				self.needs_redraw = true;
			}
			return;
		}

		let tolerance = self.config.click_tolerance;
		match &mut self.gesture {
			Gesture::Idle => {}
			Gesture::Dragging {
				id,
				origin,
				grab,
				moved,
			} => {
				*moved |= origin.distance(screen) > tolerance;
				if *moved {
					sim.set_pinned(*id, self.transform.screen_to_graph(screen) + *grab);
					self.needs_redraw = true;
				}
			}
			Gesture::Panning {
				origin,
				last,
				moved,
			} => {
				*moved |= origin.distance(screen) > tolerance;
				let delta = screen - *last;
				*last = screen;
				self.transform.pan_by(delta);
				self.needs_redraw = true;
			}
		}
	}

	/// Ends the current gesture. A node drag that actually moved reports
	/// where the node was released.
	pub fn pointer_up(&mut self, sim: &mut LayoutSimulator) -> Option<SurfaceEvent> {
		let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
		match gesture {
			Gesture::Idle => None,
			Gesture::Dragging { id, moved, .. } => {
				sim.clear_pinned(id);
				self.suppress_click = moved;
				self.needs_redraw = true;
				if !moved {
					return None;
				}
				let position = sim.node(id)?.position;
				debug!("drag end on node {id} at ({:.1}, {:.1})", position.x, position.y);
				Some(SurfaceEvent::NodeDragEnd { id, position })
			}
			Gesture::Panning { moved, .. } => {
				self.suppress_click = moved;
				None
			}
		}
	}

	/// Pointer left the canvas: finish any gesture and drop the hover.
	pub fn pointer_leave(&mut self, sim: &mut LayoutSimulator) -> Option<SurfaceEvent> {
		let event = self.pointer_up(sim);
		self.suppress_click = false;
		if self.hovered_edge.take().is_some() {
			self.needs_redraw = true;
		}
		event
	}

	/// Resolves a click unless it is the tail of a drag or pan.
	pub fn click(&mut self, sim: &LayoutSimulator, screen: DVec2) -> Option<SurfaceEvent> {
		if std::mem::take(&mut self.suppress_click) {
			return None;
		}
		match self.hit_test(sim, screen)? {
			HitTarget::Node(id) => Some(SurfaceEvent::NodeSelected(id)),
			HitTarget::Edge(id) => Some(SurfaceEvent::EdgeSelected(id)),
		}
	}

	/// Wheel zoom anchored at the pointer. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, screen: DVec2, delta_y: f64) {
		let factor = 2f64.powf(-delta_y * self.config.wheel_sensitivity);
		if self.transform.zoom_at(
			screen,
			factor,
			self.config.min_scale,
			self.config.max_scale,
		) {
			self.needs_redraw = true;
		}
	}

	/// Sets the scale directly, keeping `anchor` fixed.
	pub fn zoom_to(&mut self, scale: f64, anchor: DVec2) {
		let factor = scale / self.transform.k;
		if self.transform.zoom_at(
			anchor,
			factor,
			self.config.min_scale,
			self.config.max_scale,
		) {
			self.needs_redraw = true;
		}
	}

	/// New canvas size. The offset shifts by half the size change so the
	/// view stays centred.
	pub fn resize(&mut self, width: f64, height: f64) {
		let delta = DVec2::new(width - self.width, height - self.height) / 2.0;
		self.transform.pan_by(delta);
		self.width = width;
		self.height = height;
		self.needs_redraw = true;
	}

	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::IDENTITY;
		self.needs_redraw = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relation_graph::config::LayoutConfig;
	use crate::components::relation_graph::types::{Snapshot, SnapshotEdge, SnapshotNode};

	fn fixture() -> (LayoutSimulator, InteractionSurface) {
		let mut sim = LayoutSimulator::new(LayoutConfig::default(), 800.0, 600.0);
		sim.rebuild(&Snapshot {
			nodes: [1, 2]
				.into_iter()
				.map(|id| SnapshotNode {
					id,
					name: format!("n{id}"),
					kind: None,
				})
				.collect(),
			edges: vec![SnapshotEdge {
				id: 10,
				source_id: 1,
				target_id: 2,
				type_label: "friend".into(),
			}],
		})
		.unwrap();
		// Fixed positions make the geometry easy to reason about.
		sim.set_pinned(1, DVec2::new(100.0, 100.0));
		sim.set_pinned(2, DVec2::new(300.0, 100.0));
		sim.clear_pinned(1);
		sim.clear_pinned(2);
		(sim, InteractionSurface::new(SurfaceConfig::default(), 800.0, 600.0))
	}

	#[test]
	fn hit_test_prefers_nodes_then_edges() {
		let (sim, surface) = fixture();
		assert_eq!(
			surface.hit_test(&sim, DVec2::new(105.0, 100.0)),
			Some(HitTarget::Node(1))
		);
		assert_eq!(
			surface.hit_test(&sim, DVec2::new(200.0, 103.0)),
			Some(HitTarget::Edge(10))
		);
		assert_eq!(surface.hit_test(&sim, DVec2::new(200.0, 150.0)), None);
	}

	#[test]
	fn edge_tolerance_is_in_screen_pixels() {
		let (sim, mut surface) = fixture();
		surface.zoom_to(2.0, DVec2::ZERO);
		// Edge now at screen y = 200; 3px off still hits, 6px does not.
		assert_eq!(
			surface.hit_test(&sim, DVec2::new(400.0, 203.0)),
			Some(HitTarget::Edge(10))
		);
		assert_eq!(surface.hit_test(&sim, DVec2::new(400.0, 206.0)), None);
	}

	#[test]
	fn click_selects_node_or_edge() {
		let (sim, mut surface) = fixture();
		assert_eq!(
			surface.click(&sim, DVec2::new(300.0, 100.0)),
			Some(SurfaceEvent::NodeSelected(2))
		);
		assert_eq!(
			surface.click(&sim, DVec2::new(200.0, 101.0)),
			Some(SurfaceEvent::EdgeSelected(10))
		);
		assert_eq!(surface.click(&sim, DVec2::new(700.0, 500.0)), None);
	}

	#[test]
	fn press_and_release_without_moving_still_clicks() {
		let (mut sim, mut surface) = fixture();
		let at = DVec2::new(100.0, 100.0);
		surface.pointer_down(&mut sim, at);
		surface.pointer_move(&mut sim, at + DVec2::new(1.0, 1.0));
		assert_eq!(surface.pointer_up(&mut sim), None);
		assert_eq!(sim.node(1).unwrap().pinned, None);
		assert_eq!(surface.click(&sim, at), Some(SurfaceEvent::NodeSelected(1)));
	}

	#[test]
	fn drag_moves_node_and_suppresses_click() {
		let (mut sim, mut surface) = fixture();
		surface.pointer_down(&mut sim, DVec2::new(100.0, 100.0));
		assert!(matches!(surface.gesture(), Gesture::Dragging { id: 1, .. }));
		assert!(sim.node(1).unwrap().pinned.is_some());

		surface.pointer_move(&mut sim, DVec2::new(150.0, 180.0));
		assert_eq!(sim.node(1).unwrap().position, DVec2::new(150.0, 180.0));

		let event = surface.pointer_up(&mut sim);
		assert_eq!(
			event,
			Some(SurfaceEvent::NodeDragEnd {
				id: 1,
				position: DVec2::new(150.0, 180.0),
			})
		);
		assert_eq!(surface.gesture(), Gesture::Idle);
		assert_eq!(surface.click(&sim, DVec2::new(150.0, 180.0)), None);
		// Only the click right after the drag is swallowed.
		assert_eq!(
			surface.click(&sim, DVec2::new(150.0, 180.0)),
			Some(SurfaceEvent::NodeSelected(1))
		);
	}

	#[test]
	fn off_centre_grab_keeps_its_offset() {
		let (mut sim, mut surface) = fixture();
		surface.pointer_down(&mut sim, DVec2::new(110.0, 95.0));
		assert_eq!(sim.node(1).unwrap().position, DVec2::new(100.0, 100.0));

		surface.pointer_move(&mut sim, DVec2::new(160.0, 145.0));
		assert_eq!(sim.node(1).unwrap().position, DVec2::new(150.0, 150.0));
		let event = surface.pointer_up(&mut sim);
		assert_eq!(
			event,
			Some(SurfaceEvent::NodeDragEnd {
				id: 1,
				position: DVec2::new(150.0, 150.0),
			})
		);
	}

	#[test]
	fn non_finite_wheel_delta_is_ignored() {
		let (_, mut surface) = fixture();
		surface.take_redraw();
		surface.wheel(DVec2::new(10.0, 10.0), f64::NAN);
		surface.wheel(DVec2::new(10.0, 10.0), f64::INFINITY);
		assert_eq!(surface.transform(), ViewTransform::IDENTITY);
		assert!(!surface.take_redraw());
	}

	#[test]
	fn press_on_empty_canvas_pans() {
		let (mut sim, mut surface) = fixture();
		surface.pointer_down(&mut sim, DVec2::new(500.0, 400.0));
		surface.pointer_move(&mut sim, DVec2::new(520.0, 390.0));
		surface.pointer_move(&mut sim, DVec2::new(540.0, 380.0));
		assert_eq!(surface.pointer_up(&mut sim), None);
		assert_eq!(surface.transform().offset(), DVec2::new(40.0, -20.0));
		assert_eq!(sim.node(1).unwrap().position, DVec2::new(100.0, 100.0));
		assert_eq!(surface.click(&sim, DVec2::new(540.0, 380.0)), None);
	}

	#[test]
	fn hover_tracks_edge_under_pointer() {
		let (mut sim, mut surface) = fixture();
		surface.take_redraw();
		surface.pointer_move(&mut sim, DVec2::new(200.0, 100.0));
		assert_eq!(surface.hovered_edge(), Some(10));
		assert!(surface.take_redraw());

		surface.pointer_move(&mut sim, DVec2::new(200.0, 101.0));
		assert!(!surface.take_redraw());

		surface.pointer_move(&mut sim, DVec2::new(200.0, 300.0));
		assert_eq!(surface.hovered_edge(), None);
		assert!(surface.take_redraw());
	}

	#[test]
	fn leave_releases_drag() {
		let (mut sim, mut surface) = fixture();
		surface.pointer_down(&mut sim, DVec2::new(300.0, 100.0));
		surface.pointer_move(&mut sim, DVec2::new(320.0, 140.0));
		let event = surface.pointer_leave(&mut sim);
		assert!(matches!(event, Some(SurfaceEvent::NodeDragEnd { id: 2, .. })));
		assert_eq!(sim.node(2).unwrap().pinned, None);
		assert_eq!(surface.gesture(), Gesture::Idle);
	}

	#[test]
	fn resize_recentres_without_touching_scale() {
		let (_, mut surface) = fixture();
		surface.resize(1000.0, 500.0);
		assert_eq!(surface.transform().offset(), DVec2::new(100.0, -50.0));
		assert_eq!(surface.transform().k, 1.0);
		assert_eq!(surface.size(), (1000.0, 500.0));
	}

	#[test]
	fn wheel_in_and_out_round_trips() {
		let (_, mut surface) = fixture();
		let anchor = DVec2::new(321.0, 123.0);
		let start = surface.transform();
		surface.wheel(anchor, -120.0);
		assert!(surface.transform().k > 1.0);
		surface.wheel(anchor, 120.0);
		let end = surface.transform();
		assert!((end.k - start.k).abs() < 1e-9);
		assert!((end.offset() - start.offset()).length() < 1e-9);
	}
}
