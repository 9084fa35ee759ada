use std::collections::HashSet;

use log::{info, warn};

use super::error::{DrillDownError, Result};
use super::surface::RenderSurface;
use super::types::{ElementGraph, ElementId, StateFlags};

/// Destroys the representation of `id` and of every descendant.
///
/// Abstract and solid elements keep their own handle but their children are
/// still visited. Repeating the call on a torn-down subtree changes nothing.
pub fn remove_subtree(
	graph: &mut ElementGraph,
	surface: &mut impl RenderSurface,
	id: ElementId,
) -> Result<()> {
	let mut visited = HashSet::new();
	remove_all(graph, surface, id, &mut visited)
}

fn remove_all(
	graph: &mut ElementGraph,
	surface: &mut impl RenderSurface,
	id: ElementId,
	visited: &mut HashSet<ElementId>,
) -> Result<()> {
	if !visited.insert(id) {
		return Ok(());
	}
	let element = graph.get_mut(id)?;
	if !element.is_abstract && !element.genre.is_solid() {
		if let Some(handle) = element.handle.take() {
			let removed = surface.remove(handle);
			info!("Child item removed {}: {removed}", element.name);
			if !removed {
				warn!("Surface did not know mesh {handle:?} of {}", element.name);
			}
		}
	}
	let children = element.children.clone();
	for child in children {
		remove_all(graph, surface, child, visited)?;
	}
	Ok(())
}

/// Hides and deselects every child of `id` and tears down their subtrees.
pub fn hide_children(
	graph: &mut ElementGraph,
	surface: &mut impl RenderSurface,
	id: ElementId,
) -> Result<()> {
	let children = graph.get(id)?.children.clone();
	for child in children {
		let element = graph.get_mut(child)?;
		element.apply_state(StateFlags::HIDDEN, true);
		element.apply_state(StateFlags::SELECTED, false);
		remove_subtree(graph, surface, child)?;
	}
	Ok(())
}

/// Walks up from `from` tearing down the branches that no longer lead to
/// `focus`. Stops at the sibling level of `focus` or at a root and returns the
/// element it stopped on.
pub fn deselect_elements(
	graph: &mut ElementGraph,
	surface: &mut impl RenderSurface,
	from: ElementId,
	focus: ElementId,
) -> Result<ElementId> {
	let focus_parent = graph.get(focus)?.first_parent();
	let mut seen = HashSet::new();
	let mut current = from;
	loop {
		if !seen.insert(current) {
			return Err(DrillDownError::Cycle(current));
		}
		let element = graph.get(current)?;
		let keeps_focus = element.children.contains(&focus) || current == focus;
		let parent = element.first_parent();
		if !keeps_focus {
			hide_children(graph, surface, current)?;
		}
		match parent {
			None => return Ok(current),
			Some(_) if focus_parent.is_some() && parent == focus_parent => return Ok(current),
			Some(next) => current = next,
		}
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::drill_down::config::Color;
	use crate::components::drill_down::surface::{MeshKind, MeshSpec};
	use crate::components::drill_down::test_support::RecordingSurface;
	use crate::components::drill_down::types::{Element, Genre};

	fn attach(graph: &mut ElementGraph, surface: &mut RecordingSurface, id: ElementId) {
		let handle = surface
			.instantiate(MeshSpec {
				element: id,
				kind: MeshKind::Sphere { radius: 0.1 },
				label: format!("{id}"),
				color: Color::DARK_BLUE,
				position: glam::Vec3::ZERO,
			})
			.unwrap();
		surface.upsert(handle);
		graph.get_mut(id).unwrap().handle = Some(handle);
	}

	/// root(1) -> a(2) -> a1(3) -> a1x(5); root -> b(4)
	fn scene(surface: &mut RecordingSurface) -> ElementGraph {
		let mut graph = ElementGraph::new();
		for (id, name) in [(1, "root"), (2, "a"), (3, "a1"), (4, "b"), (5, "a1x")] {
			graph.insert(Element::new(id, name, Genre::Container));
			attach(&mut graph, surface, ElementId(id));
		}
		graph.link(ElementId(1), ElementId(2)).unwrap();
		graph.link(ElementId(2), ElementId(3)).unwrap();
		graph.link(ElementId(1), ElementId(4)).unwrap();
		graph.link(ElementId(3), ElementId(5)).unwrap();
		graph
	}

	#[test]
	fn removes_whole_subtree_once() {
		let mut surface = RecordingSurface::default();
		let mut graph = scene(&mut surface);
		remove_subtree(&mut graph, &mut surface, ElementId(2)).unwrap();
		assert_eq!(surface.removed.len(), 3);
		for id in [2, 3, 5] {
			assert!(graph.get(ElementId(id)).unwrap().handle.is_none());
		}
		assert!(graph.get(ElementId(4)).unwrap().handle.is_some());

		remove_subtree(&mut graph, &mut surface, ElementId(2)).unwrap();
		assert_eq!(surface.removed.len(), 3);
	}

	#[test]
	fn solid_and_abstract_keep_their_own_handle() {
		let mut surface = RecordingSurface::default();
		let mut graph = ElementGraph::new();
		graph.insert(Element::new(1, "solid", Genre::Solid));
		graph.insert(Element::new(2, "abstract", Genre::Container).abstracted());
		graph.insert(Element::new(3, "leaf", Genre::Container));
		graph.link(ElementId(1), ElementId(2)).unwrap();
		graph.link(ElementId(2), ElementId(3)).unwrap();
		for id in 1..=3 {
			attach(&mut graph, &mut surface, ElementId(id));
		}

		remove_subtree(&mut graph, &mut surface, ElementId(1)).unwrap();

		assert!(graph.get(ElementId(1)).unwrap().handle.is_some());
		assert!(graph.get(ElementId(2)).unwrap().handle.is_some());
		assert!(graph.get(ElementId(3)).unwrap().handle.is_none());
	}

	#[test]
	fn dangling_child_fails_fast() {
		let mut surface = RecordingSurface::default();
		let mut graph = scene(&mut surface);
		graph.get_mut(ElementId(4)).unwrap().children.push(ElementId(99));
		assert_eq!(
			remove_subtree(&mut graph, &mut surface, ElementId(1)),
			Err(DrillDownError::MissingElement(ElementId(99)))
		);
	}

	#[test]
	fn deselect_stops_at_sibling_level() {
		let mut surface = RecordingSurface::default();
		let mut graph = scene(&mut surface);

		let stop = deselect_elements(&mut graph, &mut surface, ElementId(3), ElementId(4)).unwrap();

		assert_eq!(stop, ElementId(2));
		assert!(graph.get(ElementId(3)).unwrap().is_set(StateFlags::HIDDEN));
		assert!(graph.get(ElementId(3)).unwrap().handle.is_none());
		assert!(graph.get(ElementId(5)).unwrap().handle.is_none());
		assert!(graph.get(ElementId(2)).unwrap().handle.is_some());
		assert!(graph.get(ElementId(4)).unwrap().handle.is_some());
	}

	#[test]
	fn deselect_towards_parent_keeps_its_children() {
		let mut surface = RecordingSurface::default();
		let mut graph = scene(&mut surface);

		let stop = deselect_elements(&mut graph, &mut surface, ElementId(3), ElementId(2)).unwrap();

		assert_eq!(stop, ElementId(2));
		assert!(graph.get(ElementId(5)).unwrap().handle.is_none());
		assert!(graph.get(ElementId(3)).unwrap().handle.is_some());
		assert!(!graph.get(ElementId(3)).unwrap().is_set(StateFlags::HIDDEN));
	}

	proptest! {
		#[test]
		fn no_descendant_keeps_a_handle(parents in proptest::collection::vec(0usize..64, 1..40), pick in 0usize..40) {
			let mut surface = RecordingSurface::default();
			let mut graph = ElementGraph::new();
			graph.insert(Element::new(0, "root", Genre::Container));
			attach(&mut graph, &mut surface, ElementId(0));
			for (i, parent) in parents.iter().enumerate() {
				let id = ElementId(i as i64 + 1);
				graph.insert(Element::new(id.0, format!("n{}", id.0), Genre::Container));
				attach(&mut graph, &mut surface, id);
				graph.link(ElementId((parent % (i + 1)) as i64), id).unwrap();
			}
			let target = ElementId((pick % (parents.len() + 1)) as i64);
			remove_subtree(&mut graph, &mut surface, target).unwrap();

			let mut pending = vec![target];
			while let Some(id) = pending.pop() {
				let element = graph.get(id).unwrap();
				prop_assert!(element.handle.is_none());
				pending.extend(element.children.iter().copied());
			}
		}
	}
}
