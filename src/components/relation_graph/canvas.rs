use std::f64::consts::PI;

use glam::DVec2;
use web_sys::CanvasRenderingContext2d;

use super::render::{Renderer, Stroke, TextAlign, TextStyle};

/// [`Renderer`] over a 2D canvas context.
pub struct CanvasRenderer<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasRenderer<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl Renderer for CanvasRenderer<'_> {
	fn clear(&mut self, width: f64, height: f64, color: &str) {
		self.ctx.set_fill_style_str(color);
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn line(&mut self, from: DVec2, to: DVec2, stroke: Stroke<'_>) {
		self.ctx.set_global_alpha(stroke.opacity);
		self.ctx.set_stroke_style_str(stroke.color);
		self.ctx.set_line_width(stroke.width);
		self.ctx.begin_path();
		self.ctx.move_to(from.x, from.y);
		self.ctx.line_to(to.x, to.y);
		self.ctx.stroke();
		self.ctx.set_global_alpha(1.0);
	}

	fn circle(&mut self, center: DVec2, radius: f64, fill: &str) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		self.ctx.set_fill_style_str(fill);
		self.ctx.fill();
	}

	fn text(&mut self, at: DVec2, text: &str, style: TextStyle<'_>) {
		self.ctx.set_fill_style_str(style.color);
		self.ctx.set_font(&format!("{}px sans-serif", style.size_px));
		self.ctx.set_text_align(match style.align {
			TextAlign::Left => "left",
			TextAlign::Center => "center",
		});
		let _ = self.ctx.fill_text(text, at.x, at.y);
	}
}
