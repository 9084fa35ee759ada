use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use glam::Vec3;
use log::{debug, trace};

use super::error::{DrillDownError, Result};
use super::types::{ElementGraph, ElementId};

/// Binet's closed form evaluated at a real index, read as a point in the
/// complex plane: `(phi^n - e^(i*pi*n) * phi^-n) / sqrt(5)`.
fn binet(n: f64) -> (f64, f64) {
	let phi = (1.0 + 5f64.sqrt()) / 2.0;
	let grow = phi.powf(n);
	let shrink = phi.powf(-n);
	let (sin, cos) = (PI * n).sin_cos();
	(
		(grow - cos * shrink) / 5f64.sqrt(),
		-sin * shrink / 5f64.sqrt(),
	)
}

/// Point on the spiral for a (non-positive) counter, relative to the origin.
pub fn spiral_point(counter: f64) -> Vec3 {
	let (re, im) = binet(counter);
	Vec3::new(-re as f32, im as f32, -counter as f32)
}

/// Spiral point translated onto `anchor`.
pub fn calculate_location(anchor: Vec3, counter: f64) -> Vec3 {
	anchor + spiral_point(counter)
}

/// Positions keyed by element id, remembering first-insertion order so that
/// snapshots iterate deterministically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionCache {
	positions: HashMap<ElementId, Vec3>,
	order: Vec<ElementId>,
}

impl PositionCache {
	pub fn get(&self, id: ElementId) -> Option<Vec3> {
		self.positions.get(&id).copied()
	}

	pub fn contains(&self, id: ElementId) -> bool {
		self.positions.contains_key(&id)
	}

	/// Stores `position` unless `id` already has one; returns the stored value.
	pub fn insert_if_absent(&mut self, id: ElementId, position: Vec3) -> Vec3 {
		if let Some(existing) = self.positions.get(&id) {
			return *existing;
		}
		self.positions.insert(id, position);
		self.order.push(id);
		position
	}

	pub fn ids(&self) -> &[ElementId] {
		&self.order
	}

	pub fn iter(&self) -> impl Iterator<Item = (ElementId, Vec3)> + '_ {
		self.order.iter().map(|id| (*id, self.positions[id]))
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	pub fn clear(&mut self) {
		self.positions.clear();
		self.order.clear();
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
	#[default]
	Uninitialized,
	FirstNode,
	Streaming,
	Cached,
}

/// Per-session placement state: phase, spiral counter and the position cache.
#[derive(Clone, Debug)]
pub struct Session {
	phase: SessionPhase,
	counter: f64,
	step: f64,
	cache: PositionCache,
}

impl Session {
	pub fn new(step: f64) -> Self {
		Self {
			phase: SessionPhase::Uninitialized,
			counter: 0.0,
			step,
			cache: PositionCache::default(),
		}
	}

	pub fn phase(&self) -> SessionPhase {
		self.phase
	}

	pub fn counter(&self) -> f64 {
		self.counter
	}

	pub fn cache(&self) -> &PositionCache {
		&self.cache
	}

	/// Back to `Uninitialized`; the next coordinate request starts a new cache.
	pub fn reset(&mut self) {
		self.phase = SessionPhase::Uninitialized;
		self.counter = 0.0;
		self.cache.clear();
	}

	/// Position for `id`, placing it on the session spiral if it has none yet.
	///
	/// Once the cache has been populated this is a pure lookup.
	pub fn next_coordinate(&mut self, id: ElementId) -> Result<Vec3> {
		match self.phase {
			SessionPhase::Cached => self.cache.get(id).ok_or(DrillDownError::Uncached(id)),
			SessionPhase::Uninitialized => {
				self.cache.clear();
				self.counter = 0.0;
				self.phase = SessionPhase::FirstNode;
				debug!("Session started at {id}");
				Ok(self.cache.insert_if_absent(id, Vec3::ZERO))
			}
			SessionPhase::FirstNode | SessionPhase::Streaming => {
				if let Some(position) = self.cache.get(id) {
					return Ok(position);
				}
				self.counter -= self.step;
				self.phase = SessionPhase::Streaming;
				let position = spiral_point(self.counter);
				trace!("{id} placed at {position} (counter {:.1})", self.counter);
				Ok(self.cache.insert_if_absent(id, position))
			}
		}
	}

	/// Lays out the descendants of everything cached so far, then freezes the
	/// cache. Does nothing before the first placement or once already `Cached`.
	pub fn populate(&mut self, graph: &ElementGraph) -> Result<()> {
		if matches!(self.phase, SessionPhase::Uninitialized | SessionPhase::Cached) {
			return Ok(());
		}
		// Population adds keys, so walk a snapshot of the seeds.
		let seeds = self.cache.ids().to_vec();
		let mut visited = HashSet::new();
		for id in seeds {
			if !graph.get(id)?.genre.is_solid() && visited.insert(id) {
				self.init_locn_cache(graph, id, &mut visited)?;
			}
		}
		debug!("Position cache populated with {} entries", self.cache.len());
		self.phase = SessionPhase::Cached;
		Ok(())
	}

	fn init_locn_cache(
		&mut self,
		graph: &ElementGraph,
		id: ElementId,
		visited: &mut HashSet<ElementId>,
	) -> Result<()> {
		let element = graph.get(id)?;
		if element.children.is_empty() {
			return Ok(());
		}
		if !element.genre.is_solid() {
			self.calc_locn_starter(graph, id)?;
		}
		for &child in &element.children {
			if !graph.get(child)?.genre.is_solid() && visited.insert(child) {
				self.init_locn_cache(graph, child, visited)?;
			}
		}
		Ok(())
	}

	/// Places the children of `parent` on a fresh spiral around its position.
	fn calc_locn_starter(&mut self, graph: &ElementGraph, parent: ElementId) -> Result<()> {
		let Some(anchor) = self.cache.get(parent) else {
			return Ok(());
		};
		let mut counter = -self.step;
		for &child in &graph.get(parent)?.children {
			graph.get(child)?;
			self.cache
				.insert_if_absent(child, calculate_location(anchor, counter));
			counter -= self.step;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::drill_down::types::{Element, Genre};

	fn distance(anchor: Vec3, point: Vec3) -> f32 {
		(point - anchor).length()
	}

	/// Random tree: element `i` hangs under `parents[i - 1] % i`.
	fn tree(parents: &[usize], solid: &[bool]) -> ElementGraph {
		let mut graph = ElementGraph::new();
		graph.insert(Element::new(0, "root", Genre::Container));
		for (i, parent) in parents.iter().enumerate() {
			let id = i as i64 + 1;
			let genre = if solid.get(i).copied().unwrap_or(false) {
				Genre::Solid
			} else {
				Genre::Container
			};
			graph.insert(Element::new(id, format!("n{id}"), genre));
			graph
				.link(ElementId((parent % (i + 1)) as i64), ElementId(id))
				.unwrap();
		}
		graph
	}

	#[test]
	fn first_coordinate_is_origin() {
		let mut session = Session::new(0.1);
		let position = session.next_coordinate(ElementId(7)).unwrap();
		assert_eq!(position, Vec3::ZERO);
		assert_eq!(session.phase(), SessionPhase::FirstNode);
		assert_eq!(session.cache().get(ElementId(7)), Some(Vec3::ZERO));
	}

	#[test]
	fn streaming_places_on_spiral() {
		let mut session = Session::new(0.1);
		session.next_coordinate(ElementId(1)).unwrap();
		let second = session.next_coordinate(ElementId(2)).unwrap();
		assert_eq!(session.phase(), SessionPhase::Streaming);
		assert_eq!(second, spiral_point(-0.1));
		assert!((second.z - 0.1).abs() < 1e-6);
	}

	#[test]
	fn cached_phase_reports_missing_ids() {
		let mut graph = ElementGraph::new();
		graph.insert(Element::new(1, "root", Genre::Container));
		let mut session = Session::new(0.1);
		session.next_coordinate(ElementId(1)).unwrap();
		session.populate(&graph).unwrap();
		assert_eq!(session.phase(), SessionPhase::Cached);
		assert_eq!(
			session.next_coordinate(ElementId(5)),
			Err(DrillDownError::Uncached(ElementId(5)))
		);
	}

	#[test]
	fn populate_anchors_children_on_parent() {
		let mut graph = ElementGraph::new();
		let root = graph.insert(Element::new(1, "root", Genre::Container));
		let other = graph.insert(Element::new(2, "other", Genre::Container));
		let leaf = graph.insert(Element::new(3, "leaf", Genre::Solid));
		graph.link(other, leaf).unwrap();

		let mut session = Session::new(0.1);
		session.next_coordinate(root).unwrap();
		let anchor = session.next_coordinate(other).unwrap();
		session.populate(&graph).unwrap();

		assert_eq!(
			session.cache().get(leaf),
			Some(calculate_location(anchor, -0.1))
		);
	}

	#[test]
	fn populate_skips_solid_subtrees() {
		let mut graph = ElementGraph::new();
		let root = graph.insert(Element::new(1, "root", Genre::Container));
		let solid = graph.insert(Element::new(2, "solid", Genre::Solid));
		let below = graph.insert(Element::new(3, "below", Genre::Container));
		graph.link(root, solid).unwrap();
		graph.link(solid, below).unwrap();

		let mut session = Session::new(0.1);
		session.next_coordinate(root).unwrap();
		session.populate(&graph).unwrap();

		assert!(session.cache().contains(solid));
		assert!(!session.cache().contains(below));
	}

	#[test]
	fn populate_fails_fast_on_dangling_seed() {
		let graph = ElementGraph::new();
		let mut session = Session::new(0.1);
		session.next_coordinate(ElementId(4)).unwrap();
		assert_eq!(
			session.populate(&graph),
			Err(DrillDownError::MissingElement(ElementId(4)))
		);
	}

	#[test]
	fn populate_waits_for_first_placement() {
		let graph = ElementGraph::new();
		let mut session = Session::new(0.1);
		session.populate(&graph).unwrap();
		assert_eq!(session.phase(), SessionPhase::Uninitialized);
		assert_eq!(session.next_coordinate(ElementId(1)).unwrap(), Vec3::ZERO);
	}

	#[test]
	fn reset_restarts_at_origin() {
		let mut session = Session::new(0.1);
		session.next_coordinate(ElementId(1)).unwrap();
		session.next_coordinate(ElementId(2)).unwrap();
		session.reset();
		assert!(session.cache().is_empty());
		assert_eq!(session.next_coordinate(ElementId(2)).unwrap(), Vec3::ZERO);
	}

	proptest! {
		#[test]
		fn sibling_distance_never_shrinks(count in 2usize..120) {
			let anchor = Vec3::new(1.5, -2.0, 0.25);
			let mut previous = 0.0f32;
			let mut counter = -0.1;
			for _ in 0..count {
				let d = distance(anchor, calculate_location(anchor, counter));
				prop_assert!(d >= previous);
				previous = d;
				counter -= 0.1;
			}
		}

		#[test]
		fn repeated_lookups_are_stable(ids in proptest::collection::vec(0i64..20, 1..40)) {
			let mut session = Session::new(0.1);
			let mut first_seen = HashMap::new();
			for id in ids {
				let before = session.counter();
				let known = first_seen.contains_key(&id);
				let position = session.next_coordinate(ElementId(id)).unwrap();
				let expected = *first_seen.entry(id).or_insert(position);
				prop_assert_eq!(position, expected);
				if known {
					prop_assert_eq!(session.counter(), before);
				}
			}
		}

		#[test]
		fn population_is_deterministic(
			parents in proptest::collection::vec(0usize..64, 1..30),
			solid in proptest::collection::vec(any::<bool>(), 30),
		) {
			let graph = tree(&parents, &solid);
			let run = || {
				let mut session = Session::new(0.1);
				for &id in graph.roots().iter() {
					session.next_coordinate(id).unwrap();
				}
				session.populate(&graph).unwrap();
				session.cache().clone()
			};
			prop_assert_eq!(run(), run());
		}
	}
}
