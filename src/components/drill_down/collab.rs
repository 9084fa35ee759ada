use std::collections::HashMap;

use super::spiral::PositionCache;

/// Scalar state gathered while building meshes, handed to collaborators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DerivedState {
	/// Largest time value announced by a time-series root.
	pub max_time: Option<i64>,
}

/// What a collaborator receives: derived state plus a read-only view of the
/// positions placed so far.
#[derive(Clone, Copy, Debug)]
pub struct Handoff<'a> {
	pub derived: DerivedState,
	pub positions: &'a PositionCache,
}

/// A secondary layout engine that consumes this engine's derived state.
pub trait Collaborator {
	fn receive(&mut self, handoff: &Handoff<'_>);
}

/// Collaborators looked up by the name elements declare as their companion.
#[derive(Default)]
pub struct CollaboratorRegistry {
	entries: HashMap<String, Box<dyn Collaborator>>,
}

impl std::fmt::Debug for CollaboratorRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut names: Vec<_> = self.entries.keys().collect();
		names.sort();
		f.debug_struct("CollaboratorRegistry")
			.field("names", &names)
			.finish()
	}
}

impl CollaboratorRegistry {
	pub fn register(&mut self, name: impl Into<String>, collaborator: Box<dyn Collaborator>) {
		self.entries.insert(name.into(), collaborator);
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Collaborator + 'static)> {
		self.entries.get_mut(name).map(|c| c.as_mut())
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use glam::Vec3;

	use super::*;
	use crate::components::drill_down::types::ElementId;

	struct Recorder(Rc<RefCell<Vec<(Option<i64>, usize)>>>);

	impl Collaborator for Recorder {
		fn receive(&mut self, handoff: &Handoff<'_>) {
			self.0
				.borrow_mut()
				.push((handoff.derived.max_time, handoff.positions.len()));
		}
	}

	#[test]
	fn lookup_by_name() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let mut registry = CollaboratorRegistry::default();
		registry.register("curve", Box::new(Recorder(log.clone())));
		assert!(registry.get_mut("curve").is_some());
		assert!(registry.get_mut("surface").is_none());

		let mut positions = PositionCache::default();
		positions.insert_if_absent(ElementId(1), Vec3::ZERO);
		let handoff = Handoff {
			derived: DerivedState { max_time: Some(42) },
			positions: &positions,
		};
		registry.get_mut("curve").unwrap().receive(&handoff);

		assert_eq!(*log.borrow(), vec![(Some(42), 1)]);
		assert_eq!(format!("{registry:?}"), "CollaboratorRegistry { names: [\"curve\"] }");
	}
}
