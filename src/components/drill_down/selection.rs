use std::collections::HashSet;

use glam::Vec3;

use super::error::{DrillDownError, Result};
use super::types::{ElementGraph, ElementId};

/// One step of the drill-down path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusEntry {
	pub id: ElementId,
	pub anchor: Vec3,
}

/// Drill-down path; the top entry is the current focus.
#[derive(Clone, Debug, Default)]
pub struct SelectionStack {
	entries: Vec<FocusEntry>,
}

impl SelectionStack {
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn push(&mut self, id: ElementId, anchor: Vec3) {
		self.entries.push(FocusEntry { id, anchor });
	}

	/// Removes the top entry. The bottom entry is the root focus and stays.
	pub fn pop(&mut self) -> Option<FocusEntry> {
		if self.entries.len() > 1 {
			self.entries.pop()
		} else {
			None
		}
	}

	pub fn top(&self) -> Option<&FocusEntry> {
		self.entries.last()
	}

	pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
		self.entries.iter().map(|entry| entry.id)
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

/// Whether `ancestor` lies on the first-parent chain above `id`.
///
/// Only the first parent is followed; graphs where a node has several parents
/// are not supported.
pub fn is_ancestor(graph: &ElementGraph, ancestor: ElementId, id: ElementId) -> Result<bool> {
	let mut seen = HashSet::from([id]);
	let mut current = graph.get(id)?.first_parent();
	while let Some(parent) = current {
		if parent == ancestor {
			return Ok(true);
		}
		if !seen.insert(parent) {
			return Err(DrillDownError::Cycle(parent));
		}
		current = graph.get(parent)?.first_parent();
	}
	Ok(false)
}

pub fn is_child(graph: &ElementGraph, parent: ElementId, id: ElementId) -> Result<bool> {
	Ok(graph.get(parent)?.children.contains(&id))
}
