//! Tunables for the layout and the drawing surface.
//!
//! Every field has a default, so a host may pass a partial JSON object and
//! only override what it cares about. Force constants follow the d3-force
//! defaults the relation map was originally tuned with.

use serde::{Deserialize, Serialize};

use super::error::{GraphError, Result};

/// Force and convergence parameters of the layout simulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Rest length of an edge spring, in graph units.
	pub link_distance: f64,
	/// Many-body strength. Negative values repel.
	pub charge: f64,
	/// Distances below this are clamped before the inverse-square falloff.
	pub min_distance: f64,
	/// Fraction of the offset between layout centroid and canvas centre
	/// removed each tick.
	pub center_strength: f64,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// Alpha of the first build.
	pub initial_alpha: f64,
	/// Alpha a topology change reheats to.
	pub rebuild_alpha: f64,
	/// Alpha a pin reheats to.
	pub drag_alpha: f64,
	/// Multiplicative decay applied to alpha each tick.
	pub alpha_decay: f64,
	/// Below this the layout counts as settled.
	pub alpha_min: f64,
	/// Alpha never decays below this.
	pub alpha_floor: f64,
	/// Half-width of the square new nodes are scattered in around the centre.
	pub seed_jitter: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: 120.0,
			charge: -300.0,
			min_distance: 1.0,
			center_strength: 0.1,
			velocity_decay: 0.4,
			initial_alpha: 1.0,
			rebuild_alpha: 0.5,
			drag_alpha: 0.3,
			// Reaches alpha_min from 1.0 in 300 ticks.
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			alpha_min: 0.001,
			alpha_floor: 0.0001,
			seed_jitter: 30.0,
		}
	}
}

/// Drawing and gesture parameters of the interaction surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
	/// Node marker radius in graph units.
	pub node_radius: f64,
	pub label_offset_x: f64,
	pub label_offset_y: f64,
	/// Edge labels sit this far above the edge midpoint.
	pub edge_label_offset: f64,
	/// How close to an edge, in screen pixels, still counts as a hit.
	pub edge_hit_tolerance: f64,
	/// Pointer travel, in screen pixels, after which a press is a drag.
	pub click_tolerance: f64,
	pub min_scale: f64,
	pub max_scale: f64,
	pub wheel_sensitivity: f64,
	pub edge_width: f64,
	pub edge_hover_width: f64,
	/// Opacity of edge strokes, hovered or not.
	pub edge_opacity: f64,
	pub node_font_px: f64,
	pub edge_font_px: f64,
	pub background: String,
	pub node_fill: String,
	pub edge_stroke: String,
	pub edge_hover_stroke: String,
	pub node_label_color: String,
	pub edge_label_color: String,
}

impl Default for SurfaceConfig {
	fn default() -> Self {
		Self {
			node_radius: 18.0,
			label_offset_x: 22.0,
			label_offset_y: 5.0,
			edge_label_offset: 6.0,
			edge_hit_tolerance: 4.0,
			click_tolerance: 3.0,
			min_scale: 0.2,
			max_scale: 3.0,
			wheel_sensitivity: 0.002,
			edge_width: 2.0,
			edge_hover_width: 3.0,
			edge_opacity: 0.6,
			node_font_px: 12.0,
			edge_font_px: 11.0,
			background: "#ffffff".into(),
			node_fill: "#4DA1FF".into(),
			edge_stroke: "#999999".into(),
			edge_hover_stroke: "#ff6b6b".into(),
			node_label_color: "#222222".into(),
			edge_label_color: "#555555".into(),
		}
	}
}

/// Combined configuration of one graph view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub layout: LayoutConfig,
	pub surface: SurfaceConfig,
}

impl GraphConfig {
	/// Parses a (possibly partial) configuration and checks its values.
	pub fn from_json(text: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(text).map_err(GraphError::parse)?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects values the simulator or surface cannot work with.
	pub fn validate(&self) -> Result<()> {
		let layout = &self.layout;
		let surface = &self.surface;
		for (name, value) in [
			("layout.link_distance", layout.link_distance),
			("layout.charge", layout.charge),
			("layout.min_distance", layout.min_distance),
			("layout.center_strength", layout.center_strength),
			("layout.velocity_decay", layout.velocity_decay),
			("layout.initial_alpha", layout.initial_alpha),
			("layout.rebuild_alpha", layout.rebuild_alpha),
			("layout.drag_alpha", layout.drag_alpha),
			("layout.alpha_decay", layout.alpha_decay),
			("layout.alpha_min", layout.alpha_min),
			("layout.alpha_floor", layout.alpha_floor),
			("layout.seed_jitter", layout.seed_jitter),
			("surface.node_radius", surface.node_radius),
			("surface.label_offset_x", surface.label_offset_x),
			("surface.label_offset_y", surface.label_offset_y),
			("surface.edge_label_offset", surface.edge_label_offset),
			("surface.edge_hit_tolerance", surface.edge_hit_tolerance),
			("surface.click_tolerance", surface.click_tolerance),
			("surface.min_scale", surface.min_scale),
			("surface.max_scale", surface.max_scale),
			("surface.wheel_sensitivity", surface.wheel_sensitivity),
			("surface.edge_width", surface.edge_width),
			("surface.edge_hover_width", surface.edge_hover_width),
			("surface.edge_opacity", surface.edge_opacity),
			("surface.node_font_px", surface.node_font_px),
			("surface.edge_font_px", surface.edge_font_px),
		] {
			if !value.is_finite() {
				return Err(GraphError::non_finite(name, value));
			}
		}

		if !(layout.alpha_decay > 0.0 && layout.alpha_decay < 1.0) {
			return Err(GraphError::InvalidGraphInput(format!(
				"layout.alpha_decay must be in (0, 1), got {}",
				layout.alpha_decay
			)));
		}
		// Alpha never drops below the floor, which must sit under the settle threshold.
		if !(layout.alpha_floor >= 0.0 && layout.alpha_floor < layout.alpha_min) {
			return Err(GraphError::InvalidGraphInput(format!(
				"layout.alpha_floor must be in [0, alpha_min), got {} with alpha_min {}",
				layout.alpha_floor, layout.alpha_min
			)));
		}
		if !(0.0..=1.0).contains(&surface.edge_opacity) {
			return Err(GraphError::InvalidGraphInput(format!(
				"surface.edge_opacity must be in [0, 1], got {}",
				surface.edge_opacity
			)));
		}
		if !(0.0..=1.0).contains(&layout.velocity_decay) {
			return Err(GraphError::InvalidGraphInput(format!(
				"layout.velocity_decay must be in [0, 1], got {}",
				layout.velocity_decay
			)));
		}
		if layout.min_distance <= 0.0 {
			return Err(GraphError::InvalidGraphInput(
				"layout.min_distance must be positive".into(),
			));
		}
		if surface.min_scale <= 0.0 || surface.min_scale > surface.max_scale {
			return Err(GraphError::InvalidGraphInput(format!(
				"surface scale range [{}, {}] is empty",
				surface.min_scale, surface.max_scale
			)));
		}
		Ok(())
	}
}
