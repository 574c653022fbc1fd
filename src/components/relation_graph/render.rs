//! Backend-neutral frame drawing.
//!
//! [`render_frame`] walks the simulation once per frame and issues draw calls
//! against a [`Renderer`]. Swapping canvas for anything else means writing
//! another `Renderer`; the layout and interaction code stay as they are.

use glam::DVec2;

use super::simulation::LayoutSimulator;
use super::surface::InteractionSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
	Left,
	Center,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke<'a> {
	pub color: &'a str,
	pub width: f64,
	pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle<'a> {
	pub color: &'a str,
	pub size_px: f64,
	pub align: TextAlign,
}

/// Drawing primitives a backend has to provide. Coordinates are screen
/// pixels.
pub trait Renderer {
	fn clear(&mut self, width: f64, height: f64, color: &str);
	fn line(&mut self, from: DVec2, to: DVec2, stroke: Stroke<'_>);
	fn circle(&mut self, center: DVec2, radius: f64, fill: &str);
	fn text(&mut self, at: DVec2, text: &str, style: TextStyle<'_>);
}

/// Draws one frame: edges, edge labels, nodes, node labels, in that order.
pub fn render_frame<R: Renderer + ?Sized>(
	sim: &LayoutSimulator,
	surface: &InteractionSurface,
	renderer: &mut R,
) {
	let config = surface.config();
	let transform = surface.transform();
	let (width, height) = surface.size();
	let k = transform.k;
	let nodes = sim.nodes();

	renderer.clear(width, height, &config.background);

	let normal = Stroke {
		color: &config.edge_stroke,
		width: config.edge_width * k,
		opacity: config.edge_opacity,
	};
	let hovered = Stroke {
		color: &config.edge_hover_stroke,
		width: config.edge_hover_width * k,
		opacity: config.edge_opacity,
	};
	for edge in sim.edges() {
		if edge.is_self_loop() {
			continue;
		}
		let from = transform.graph_to_screen(nodes[edge.source].position);
		let to = transform.graph_to_screen(nodes[edge.target].position);
		let stroke = if surface.hovered_edge() == Some(edge.id) {
			hovered
		} else {
			normal
		};
		renderer.line(from, to, stroke);
	}

	let edge_label = TextStyle {
		color: &config.edge_label_color,
		size_px: config.edge_font_px * k,
		align: TextAlign::Center,
	};
	for edge in sim.edges() {
		let midpoint = (nodes[edge.source].position + nodes[edge.target].position) / 2.0;
		let at = transform.graph_to_screen(midpoint) - DVec2::new(0.0, config.edge_label_offset * k);
		renderer.text(at, &edge.type_label, edge_label);
	}

	let radius = config.node_radius * k;
	for node in nodes {
		renderer.circle(transform.graph_to_screen(node.position), radius, &config.node_fill);
	}

	let node_label = TextStyle {
		color: &config.node_label_color,
		size_px: config.node_font_px * k,
		align: TextAlign::Left,
	};
	let label_offset = DVec2::new(config.label_offset_x, config.label_offset_y) * k;
	for node in nodes {
		let at = transform.graph_to_screen(node.position) + label_offset;
		renderer.text(at, &node.label, node_label);
	}
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
	Clear {
		width: f64,
		height: f64,
		color: String,
	},
	Line {
		from: DVec2,
		to: DVec2,
		color: String,
		width: f64,
		opacity: f64,
	},
	Circle {
		center: DVec2,
		radius: f64,
		fill: String,
	},
	Text {
		at: DVec2,
		text: String,
		color: String,
		size_px: f64,
		align: TextAlign,
	},
}

/// Headless renderer that records draw calls instead of painting them.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
	pub commands: Vec<DrawCommand>,
}

impl DrawList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
		self.commands
			.iter()
			.filter(|command| matches!(command, DrawCommand::Line { .. }))
	}

	pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
		self.commands
			.iter()
			.filter(|command| matches!(command, DrawCommand::Circle { .. }))
	}

	pub fn texts(&self) -> impl Iterator<Item = &DrawCommand> {
		self.commands
			.iter()
			.filter(|command| matches!(command, DrawCommand::Text { .. }))
	}
}

impl Renderer for DrawList {
	fn clear(&mut self, width: f64, height: f64, color: &str) {
		self.commands.clear();
		self.commands.push(DrawCommand::Clear {
			width,
			height,
			color: color.to_owned(),
		});
	}

	fn line(&mut self, from: DVec2, to: DVec2, stroke: Stroke<'_>) {
		self.commands.push(DrawCommand::Line {
			from,
			to,
			color: stroke.color.to_owned(),
			width: stroke.width,
			opacity: stroke.opacity,
		});
	}

	fn circle(&mut self, center: DVec2, radius: f64, fill: &str) {
		self.commands.push(DrawCommand::Circle {
			center,
			radius,
			fill: fill.to_owned(),
		});
	}

	fn text(&mut self, at: DVec2, text: &str, style: TextStyle<'_>) {
		self.commands.push(DrawCommand::Text {
			at,
			text: text.to_owned(),
			color: style.color.to_owned(),
			size_px: style.size_px,
			align: style.align,
		});
	}
}
