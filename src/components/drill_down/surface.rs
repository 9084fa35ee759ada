use glam::Vec3;

use super::config::Color;
use super::types::ElementId;

/// Opaque reference to a representation owned by a [`RenderSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum MeshKind {
	Sphere { radius: f32 },
	/// Connector drawn from a previous solid to the current one.
	Link { from: Vec3 },
}

/// Everything a backend needs to build one representation.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSpec {
	pub element: ElementId,
	pub kind: MeshKind,
	pub label: String,
	pub color: Color,
	pub position: Vec3,
}

/// Rendering backend driven by the engine.
///
/// The backend owns the graphics resources; the engine only holds handles it
/// obtained from `instantiate` and gives them back through `remove`.
pub trait RenderSurface {
	/// Builds a representation. `None` means construction failed and the
	/// engine will try again on a later pass.
	fn instantiate(&mut self, spec: MeshSpec) -> Option<MeshHandle>;

	/// Submits an existing representation for display. Repeating it is harmless.
	fn upsert(&mut self, handle: MeshHandle);

	/// Detaches and destroys a representation.
	fn remove(&mut self, handle: MeshHandle) -> bool;

	/// Sets color and opacity. Unknown handles are ignored.
	fn recolor(&mut self, handle: MeshHandle, color: Color, opacity: f32);
}
