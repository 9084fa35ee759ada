use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::f64::consts::PI;
use std::rc::Rc;

use glam::Vec3;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::collab::{Collaborator, Handoff};
use super::config::Color;
use super::surface::{MeshHandle, MeshKind, MeshSpec, RenderSurface};
use super::types::ElementId;

/// Pixels per world unit before zoom.
pub const WORLD_SCALE: f64 = 160.0;
/// How quickly depth shrinks things.
const DEPTH_FALLOFF: f64 = 0.08;
const HIT_SLOP: f64 = 4.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Screen-plane point of a world position, plus the depth scale applied to it.
pub fn project(position: Vec3) -> (f64, f64, f64) {
	let depth = 1.0 / (1.0 + (position.z as f64).max(0.0) * DEPTH_FALLOFF);
	(
		position.x as f64 * WORLD_SCALE * depth,
		-(position.y as f64) * WORLD_SCALE * depth,
		depth,
	)
}

#[derive(Clone, Debug)]
pub struct Mesh {
	pub spec: MeshSpec,
	pub color: Color,
	pub opacity: f32,
}

/// [`RenderSurface`] that keeps meshes in memory and paints them on a 2D canvas.
#[derive(Debug, Default)]
pub struct CanvasSurface {
	next: u64,
	meshes: HashMap<MeshHandle, Mesh>,
	scene: BTreeSet<MeshHandle>,
}

impl CanvasSurface {
	fn displayed(&self) -> impl Iterator<Item = &Mesh> + '_ {
		self.scene.iter().filter_map(|handle| self.meshes.get(handle))
	}

	/// Topmost displayed sphere under a graph-space point.
	pub fn element_at(&self, gx: f64, gy: f64) -> Option<ElementId> {
		let mut found = None;
		let mut best = f64::MAX;
		for mesh in self.displayed() {
			let MeshKind::Sphere { radius } = mesh.spec.kind else {
				continue;
			};
			let (x, y, depth) = project(mesh.spec.position);
			let dist = ((x - gx).powi(2) + (y - gy).powi(2)).sqrt();
			if dist < radius as f64 * WORLD_SCALE * depth + HIT_SLOP && dist < best {
				best = dist;
				found = Some(mesh.spec.element);
			}
		}
		found
	}
}

impl RenderSurface for CanvasSurface {
	fn instantiate(&mut self, spec: MeshSpec) -> Option<MeshHandle> {
		if !spec.position.is_finite() {
			return None;
		}
		self.next += 1;
		let handle = MeshHandle(self.next);
		let color = spec.color;
		self.meshes.insert(handle, Mesh {
			spec,
			color,
			opacity: 1.0,
		});
		Some(handle)
	}

	fn upsert(&mut self, handle: MeshHandle) {
		if self.meshes.contains_key(&handle) {
			self.scene.insert(handle);
		}
	}

	fn remove(&mut self, handle: MeshHandle) -> bool {
		self.scene.remove(&handle);
		self.meshes.remove(&handle).is_some()
	}

	fn recolor(&mut self, handle: MeshHandle, color: Color, opacity: f32) {
		if let Some(mesh) = self.meshes.get_mut(&handle) {
			mesh.color = color;
			mesh.opacity = opacity;
		}
	}
}

/// Collaborator that keeps the latest maximum time for the axis overlay.
#[derive(Clone, Debug, Default)]
pub struct TimeAxis {
	pub max_time: Rc<Cell<Option<i64>>>,
	pub placed: Rc<Cell<usize>>,
}

impl Collaborator for TimeAxis {
	fn receive(&mut self, handoff: &Handoff<'_>) {
		self.max_time.set(handoff.derived.max_time);
		self.placed.set(handoff.positions.len());
	}
}

pub fn render(
	surface: &CanvasSurface,
	view: &ViewTransform,
	axis: &TimeAxis,
	width: f64,
	height: f64,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(view.x, view.y);
	let _ = ctx.scale(view.k, view.k);
	draw_links(surface, view, ctx);
	draw_spheres(surface, view, ctx);
	ctx.restore();

	if let Some(max_time) = axis.max_time.get() {
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.6)");
		ctx.set_font("12px sans-serif");
		let label = format!("t max {max_time} ({} placed)", axis.placed.get());
		let _ = ctx.fill_text(&label, 12.0, height - 12.0);
	}
}

fn draw_links(surface: &CanvasSurface, view: &ViewTransform, ctx: &CanvasRenderingContext2d) {
	let k = view.k;
	let (dash, gap) = (6.0 / k, 4.0 / k);
	for mesh in surface.displayed() {
		let MeshKind::Link { from } = mesh.spec.kind else {
			continue;
		};
		let (x1, y1, _) = project(from);
		let (x2, y2, _) = project(mesh.spec.position);
		ctx.set_stroke_style_str(&mesh.color.to_css(mesh.opacity * 0.6));
		ctx.set_line_width(1.5 / k);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_spheres(surface: &CanvasSurface, view: &ViewTransform, ctx: &CanvasRenderingContext2d) {
	let k = view.k;
	let mut spheres: Vec<(&Mesh, f32)> = surface
		.displayed()
		.filter_map(|mesh| match mesh.spec.kind {
			MeshKind::Sphere { radius } => Some((mesh, radius)),
			MeshKind::Link { .. } => None,
		})
		.collect();
	// Far first, so nearer spheres overlap them.
	spheres.sort_by(|a, b| b.0.spec.position.z.total_cmp(&a.0.spec.position.z));

	for (mesh, radius) in spheres {
		let (x, y, depth) = project(mesh.spec.position);
		let r = radius as f64 * WORLD_SCALE * depth;
		ctx.begin_path();
		let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&mesh.color.to_css(mesh.opacity));
		ctx.fill();

		if mesh.opacity >= 1.0 {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(&mesh.spec.label, x + r + 3.0, y + 3.0);
		}
	}
}
