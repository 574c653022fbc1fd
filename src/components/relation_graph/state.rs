use glam::DVec2;
use log::error;

use super::config::GraphConfig;
use super::error::Result;
use super::render::{Renderer, render_frame};
use super::simulation::{LayoutSimulator, RebuildStats};
use super::surface::InteractionSurface;
use super::types::{HitTarget, Snapshot, SurfaceEvent};

/// Everything one graph view owns: the layout, the surface, and the
/// redraw bookkeeping between them. Hosts drive it with `rebuild`, one
/// `frame` per animation callback, and the pointer handlers.
pub struct RelationGraphState {
	sim: LayoutSimulator,
	surface: InteractionSurface,
}

impl RelationGraphState {
	pub fn new(config: GraphConfig, width: f64, height: f64) -> Self {
		Self {
			sim: LayoutSimulator::new(config.layout, width, height),
			surface: InteractionSurface::new(config.surface, width, height),
		}
	}

	/// Builds the state around an existing simulator, e.g. one with a fixed seed.
	pub fn with_simulator(sim: LayoutSimulator, config: GraphConfig, width: f64, height: f64) -> Self {
		Self {
			sim,
			surface: InteractionSurface::new(config.surface, width, height),
		}
	}

	pub fn simulator(&self) -> &LayoutSimulator {
		&self.sim
	}

	pub fn surface(&self) -> &InteractionSurface {
		&self.surface
	}

	/// Applies a new snapshot. On error nothing changes and the previous
	/// graph keeps being drawn.
	pub fn rebuild(&mut self, snapshot: &Snapshot) -> Result<RebuildStats> {
		let stats = self.sim.rebuild(snapshot).inspect_err(|err| {
			error!("snapshot rejected, keeping previous graph: {err}");
		})?;
		self.surface.request_redraw();
		Ok(stats)
	}

	/// One scheduler callback: tick if the layout is still moving, then
	/// draw if anything changed. Returns whether a frame was drawn.
	pub fn frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
		let ticked = !self.sim.is_settled();
		if ticked {
			self.sim.tick();
		}
		let dirty = self.surface.take_redraw();
		if !(ticked || dirty) {
			return false;
		}
		render_frame(&self.sim, &self.surface, renderer);
		true
	}

	/// True when neither the layout nor the view needs another frame.
	pub fn is_idle(&self) -> bool {
		self.sim.is_settled() && !self.surface.needs_redraw()
	}

	pub fn hit_test(&self, screen: DVec2) -> Option<HitTarget> {
		self.surface.hit_test(&self.sim, screen)
	}

	pub fn pointer_down(&mut self, screen: DVec2) {
		self.surface.pointer_down(&mut self.sim, screen);
	}

	pub fn pointer_move(&mut self, screen: DVec2) {
		self.surface.pointer_move(&mut self.sim, screen);
	}

	pub fn pointer_up(&mut self) -> Option<SurfaceEvent> {
		self.surface.pointer_up(&mut self.sim)
	}

	pub fn pointer_leave(&mut self) -> Option<SurfaceEvent> {
		self.surface.pointer_leave(&mut self.sim)
	}

	pub fn click(&mut self, screen: DVec2) -> Option<SurfaceEvent> {
		self.surface.click(&self.sim, screen)
	}

	pub fn wheel(&mut self, screen: DVec2, delta_y: f64) {
		self.surface.wheel(screen, delta_y);
	}

	/// Canvas size changed. Recentres the view; topology and alpha are left
	/// alone.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.surface.resize(width, height);
	}

	pub fn reset_view(&mut self) {
		self.surface.reset_view();
	}
}
