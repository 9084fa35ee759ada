use std::collections::{BTreeSet, HashMap};

use super::config::Color;
use super::surface::{MeshHandle, MeshSpec, RenderSurface};

/// In-memory surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
	next: u64,
	pub meshes: HashMap<MeshHandle, MeshSpec>,
	pub displayed: BTreeSet<MeshHandle>,
	pub colors: HashMap<MeshHandle, (Color, f32)>,
	pub instantiated: usize,
	pub upserts: usize,
	pub removed: Vec<MeshHandle>,
	/// Number of upcoming `instantiate` calls that fail.
	pub failures: usize,
}

impl RecordingSurface {
	pub fn color_of(&self, handle: MeshHandle) -> Option<(Color, f32)> {
		self.colors.get(&handle).copied()
	}
}

impl RenderSurface for RecordingSurface {
	fn instantiate(&mut self, spec: MeshSpec) -> Option<MeshHandle> {
		if self.failures > 0 {
			self.failures -= 1;
			return None;
		}
		self.next += 1;
		let handle = MeshHandle(self.next);
		self.colors.insert(handle, (spec.color, 1.0));
		self.meshes.insert(handle, spec);
		self.instantiated += 1;
		Some(handle)
	}

	fn upsert(&mut self, handle: MeshHandle) {
		self.upserts += 1;
		self.displayed.insert(handle);
	}

	fn remove(&mut self, handle: MeshHandle) -> bool {
		self.displayed.remove(&handle);
		self.colors.remove(&handle);
		let existed = self.meshes.remove(&handle).is_some();
		if existed {
			self.removed.push(handle);
		}
		existed
	}

	fn recolor(&mut self, handle: MeshHandle, color: Color, opacity: f32) {
		if self.meshes.contains_key(&handle) {
			self.colors.insert(handle, (color, opacity));
		}
	}
}
