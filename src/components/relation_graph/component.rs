use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::DVec2;
use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::canvas::CanvasRenderer;
use super::config::GraphConfig;
use super::error::GraphError;
use super::listener::ListenerGuard;
use super::state::RelationGraphState;
use super::types::{EntityId, RelationId, Snapshot, SurfaceEvent};

type SharedState = Rc<RefCell<Option<RelationGraphState>>>;
type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

#[derive(Clone, Copy)]
struct Callbacks {
	node_selected: Option<Callback<EntityId>>,
	edge_selected: Option<Callback<RelationId>>,
	node_drag_end: Option<Callback<(EntityId, DVec2)>>,
}

impl Callbacks {
	fn dispatch(&self, event: Option<SurfaceEvent>) {
		match event {
			Some(SurfaceEvent::NodeSelected(id)) => {
				if let Some(callback) = self.node_selected {
					callback.run(id);
				}
			}
			Some(SurfaceEvent::EdgeSelected(id)) => {
				if let Some(callback) = self.edge_selected {
					callback.run(id);
				}
			}
			Some(SurfaceEvent::NodeDragEnd { id, position }) => {
				if let Some(callback) = self.node_drag_end {
					callback.run((id, position));
				}
			}
			None => {}
		}
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<DVec2> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(DVec2::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas view of a relation map.
///
/// Every change of `data` rebuilds the layout in place; nodes that survive
/// keep their positions. Selections and drag ends are reported through the
/// callbacks, never acted on here.
#[component]
pub fn RelationGraphCanvas(
	#[prop(into)] data: Signal<Snapshot>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] config: Option<GraphConfig>,
	#[prop(optional, into)] on_node_selected: Option<Callback<EntityId>>,
	#[prop(optional, into)] on_edge_selected: Option<Callback<RelationId>>,
	#[prop(optional, into)] on_node_drag_end: Option<Callback<(EntityId, DVec2)>>,
	#[prop(optional, into)] on_error: Option<Callback<GraphError>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<ListenerGuard>>> = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let callbacks = Callbacks {
		node_selected: on_node_selected,
		edge_selected: on_edge_selected,
		node_drag_end: on_node_drag_end,
	};
	let report = move |err: GraphError| {
		if let Some(callback) = on_error {
			callback.run(err);
		}
	};
	let config = match config.map(|c| c.validate().map(|()| c)) {
		Some(Ok(config)) => config,
		Some(Err(err)) => {
			error!("invalid graph config, using defaults: {err}");
			report(err);
			GraphConfig::default()
		}
		None => GraphConfig::default(),
	};

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let (state_init, animate_init, resize_cb_init, alive_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), alive.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("relation graph: no window");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("relation graph: canvas has no 2d context");
			return;
		};

		let mut graph = RelationGraphState::new(config.clone(), w, h);
		if let Err(err) = data.with_untracked(|snapshot| graph.rebuild(snapshot)) {
			report(err);
		}
		*state_init.borrow_mut() = Some(graph);
		info!("relation graph mounted at {w}x{h}");

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			let on_resize = Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			});
			match ListenerGuard::attach(&window, "resize", on_resize) {
				Ok(guard) => *resize_cb_init.borrow_mut() = Some(guard),
				Err(err) => error!("relation graph: resize listener failed: {err:?}"),
			}
		}

		let (state_anim, animate_inner, resize_anim, alive_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			alive_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				// View is gone: release the layout, unhook resize and stop scheduling.
				state_anim.borrow_mut().take();
				resize_anim.borrow_mut().take();
				debug!("relation graph torn down");
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.frame(&mut CanvasRenderer::new(&ctx));
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(window) = web_sys::window() {
					let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_data = state.clone();
	Effect::new(move |_| {
		let result = data.with(|snapshot| {
			state_data
				.borrow_mut()
				.as_mut()
				.map(|s| s.rebuild(snapshot))
		});
		if let Some(Err(err)) = result {
			report(err);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(at);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(at);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let event = state_mu.borrow_mut().as_mut().and_then(|s| s.pointer_up());
		callbacks.dispatch(event);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let event = state_ml.borrow_mut().as_mut().and_then(|s| s.pointer_leave());
		callbacks.dispatch(event);
	};

	let state_cl = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let event = state_cl.borrow_mut().as_mut().and_then(|s| s.click(at));
		callbacks.dispatch(event);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(at, ev.delta_y());
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_dc.borrow_mut() {
			// Double-click on empty canvas restores the default view.
			if s.hit_test(at).is_none() {
				s.reset_view();
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="relation-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
