use glam::DVec2;

/// Pan/zoom mapping from graph space to screen pixels:
/// `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn offset(&self) -> DVec2 {
		DVec2::new(self.x, self.y)
	}

	pub fn graph_to_screen(&self, point: DVec2) -> DVec2 {
		point * self.k + self.offset()
	}

	pub fn screen_to_graph(&self, point: DVec2) -> DVec2 {
		(point - self.offset()) / self.k
	}

	pub fn pan_by(&mut self, delta: DVec2) {
		self.x += delta.x;
		self.y += delta.y;
	}

	/// Scales by `factor` (clamped to `[min_scale, max_scale]`) keeping the
	/// graph point under `anchor` fixed on screen. Returns whether anything
	/// changed.
	pub fn zoom_at(&mut self, anchor: DVec2, factor: f64, min_scale: f64, max_scale: f64) -> bool {
		if !(factor.is_finite() && factor > 0.0 && anchor.is_finite()) {
			return false;
		}
		let k = (self.k * factor).clamp(min_scale, max_scale);
		if k == self.k {
			return false;
		}
		let ratio = k / self.k;
		self.x = anchor.x - (anchor.x - self.x) * ratio;
		self.y = anchor.y - (anchor.y - self.y) * ratio;
		self.k = k;
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f64 = 1e-9;

	#[test]
	fn screen_and_graph_are_inverse() {
		let transform = ViewTransform {
			x: 35.0,
			y: -12.5,
			k: 1.7,
		};
		let point = DVec2::new(123.4, -56.7);
		let back = transform.screen_to_graph(transform.graph_to_screen(point));
		assert!((back - point).length() < EPS);
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut transform = ViewTransform {
			x: 10.0,
			y: 20.0,
			k: 1.0,
		};
		let anchor = DVec2::new(300.0, 200.0);
		let under = transform.screen_to_graph(anchor);
		assert!(transform.zoom_at(anchor, 1.5, 0.2, 3.0));
		assert!((transform.graph_to_screen(under) - anchor).length() < EPS);
	}

	#[test]
	fn zoom_in_then_out_round_trips() {
		let start = ViewTransform {
			x: -40.0,
			y: 15.0,
			k: 1.2,
		};
		let mut transform = start;
		let anchor = DVec2::new(250.0, 410.0);
		transform.zoom_at(anchor, 1.8, 0.2, 3.0);
		transform.zoom_at(anchor, 1.0 / 1.8, 0.2, 3.0);
		assert!((transform.x - start.x).abs() < EPS);
		assert!((transform.y - start.y).abs() < EPS);
		assert!((transform.k - start.k).abs() < EPS);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut transform = ViewTransform::IDENTITY;
		transform.zoom_at(DVec2::ZERO, 100.0, 0.2, 3.0);
		assert_eq!(transform.k, 3.0);
		assert!(!transform.zoom_at(DVec2::ZERO, 2.0, 0.2, 3.0));
		transform.zoom_at(DVec2::ZERO, 0.0001, 0.2, 3.0);
		assert_eq!(transform.k, 0.2);
	}

	#[test]
	fn zoom_ignores_nan_and_non_positive_factors() {
		let mut transform = ViewTransform::IDENTITY;
		let anchor = DVec2::new(10.0, 10.0);
		assert!(!transform.zoom_at(anchor, f64::NAN, 0.2, 3.0));
		assert!(!transform.zoom_at(anchor, f64::INFINITY, 0.2, 3.0));
		assert!(!transform.zoom_at(anchor, 0.0, 0.2, 3.0));
		assert!(!transform.zoom_at(DVec2::NAN, 2.0, 0.2, 3.0));
		assert_eq!(transform, ViewTransform::IDENTITY);
	}
}
