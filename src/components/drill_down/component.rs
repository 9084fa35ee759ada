use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::error::{DrillDownError, Result};
use super::render::{self, CanvasSurface, PanState, TimeAxis, ViewTransform};
use super::state::DrillDownState;
use super::types::ElementGraph;

/// Companion name the sample scene uses for its time axis.
pub const TIMELINE: &str = "timeline";

struct Scene {
	graph: ElementGraph,
	engine: DrillDownState,
	surface: CanvasSurface,
	axis: TimeAxis,
	view: ViewTransform,
	pan: PanState,
	width: f64,
	height: f64,
	last_error: Option<DrillDownError>,
}

impl Scene {
	fn new(graph: ElementGraph, width: f64, height: f64) -> Self {
		let axis = TimeAxis::default();
		let mut engine = DrillDownState::default();
		engine.register_collaborator(TIMELINE, Box::new(axis.clone()));
		let mut scene = Self {
			graph,
			engine,
			surface: CanvasSurface::default(),
			axis,
			view: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			pan: PanState::default(),
			width,
			height,
			last_error: None,
		};
		let roots = scene.graph.roots();
		let laid_out = scene
			.engine
			.layout(&mut scene.graph, &mut scene.surface, &roots);
		scene.report(laid_out);
		match scene.graph.entry_root() {
			Some(root) => scene.engine.select(root),
			None => warn!("Scene has no root to focus"),
		}
		scene
	}

	fn frame(&mut self) {
		let pass = self.redraw();
		self.report(pass);
	}

	fn redraw(&mut self) -> Result<()> {
		self.engine
			.init_render_loop(&mut self.graph, &mut self.surface)?;
		for id in self.graph.ids().to_vec() {
			self.engine
				.render_element(&mut self.graph, &mut self.surface, id)?;
		}
		Ok(())
	}

	/// Logs a fault once instead of every frame.
	fn report(&mut self, outcome: Result<()>) {
		match outcome {
			Ok(()) => self.last_error = None,
			Err(err) => {
				if self.last_error.as_ref() != Some(&err) {
					error!("Redraw aborted: {err}");
				}
				self.last_error = Some(err);
			}
		}
	}

	fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.view.x) / self.view.k,
			(sy - self.view.y) / self.view.k,
		)
	}

	fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Canvas that lays out `data`, focuses its first root and drills down on click.
#[component]
pub fn DrillDownCanvas(
	#[prop(into)] data: Signal<ElementGraph>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let scene: Rc<RefCell<Option<Scene>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (scene_init, animate_init, resize_cb_init) =
		(scene.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
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
			error!("Canvas has no 2d context");
			return;
		};
		*scene_init.borrow_mut() = Some(Scene::new(data.get(), w, h));

		if fullscreen {
			let (scene_resize, canvas_resize) = (scene_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *scene_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (scene_anim, animate_inner) = (scene_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *scene_anim.borrow_mut() {
				s.frame();
				render::render(&s.surface, &s.view, &s.axis, s.width, s.height, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let scene_md = scene.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *scene_md.borrow_mut() {
			let (gx, gy) = s.screen_to_graph(x, y);
			if let Some(id) = s.surface.element_at(gx, gy) {
				s.engine.select(id);
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.view.x;
				s.pan.transform_start_y = s.view.y;
			}
		}
	};

	let scene_mm = scene.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *scene_mm.borrow_mut() {
			if s.pan.active {
				s.view.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.view.y = s.pan.transform_start_y + (y - s.pan.start_y);
			}
		}
	};

	let scene_mu = scene.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *scene_mu.borrow_mut() {
			s.pan.active = false;
		}
	};

	let scene_ml = scene.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *scene_ml.borrow_mut() {
			s.pan.active = false;
		}
	};

	let scene_wh = scene.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *scene_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.view.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.view.k;
			s.view.x = x - (x - s.view.x) * ratio;
			s.view.y = y - (y - s.view.y) * ratio;
			s.view.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="drill-down-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: pointer;"
		/>
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |value: std::result::Result<JsValue, JsValue>| {
		value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
	};
	(dim(window.inner_width()), dim(window.inner_height()))
}

/// Client coordinates relative to the canvas' top-left corner.
fn canvas_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	client_x: i32,
	client_y: i32,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}
