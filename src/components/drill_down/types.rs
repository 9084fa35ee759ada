use std::collections::HashMap;

use bitflags::bitflags;

use super::error::{DrillDownError, Result};
use super::surface::MeshHandle;

/// Stable identity of an element in the scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub i64);

impl std::fmt::Display for ElementId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Category tag of an element. Only `Solid` and `Space` change engine behavior.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Genre {
	Solid,
	Space,
	Related,
	Container,
	DataFlowStatistic,
	Other(String),
}

impl Genre {
	pub fn is_solid(&self) -> bool {
		matches!(self, Genre::Solid)
	}

	pub fn is_space(&self) -> bool {
		matches!(self, Genre::Space)
	}
}

bitflags! {
	/// Visibility and selection markers toggled by the engine.
	#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
	pub struct StateFlags: u8 {
		const HIDDEN   = 0b01;
		const SELECTED = 0b10;
	}
}

/// A node of the scene graph.
#[derive(Clone, Debug)]
pub struct Element {
	pub id: ElementId,
	pub name: String,
	pub genre: Genre,
	pub alias: String,
	pub data: String,
	pub is_abstract: bool,
	/// Name of a secondary layout engine that wants this batch's derived state.
	pub companion: Option<String>,
	pub parents: Vec<ElementId>,
	pub children: Vec<ElementId>,
	pub flags: StateFlags,
	pub handle: Option<MeshHandle>,
}

impl Element {
	pub fn new(id: i64, name: impl Into<String>, genre: Genre) -> Self {
		Self {
			id: ElementId(id),
			name: name.into(),
			genre,
			alias: String::new(),
			data: String::new(),
			is_abstract: false,
			companion: None,
			parents: Vec::new(),
			children: Vec::new(),
			flags: StateFlags::empty(),
			handle: None,
		}
	}

	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = alias.into();
		self
	}

	pub fn with_data(mut self, data: impl Into<String>) -> Self {
		self.data = data.into();
		self
	}

	pub fn with_companion(mut self, companion: impl Into<String>) -> Self {
		self.companion = Some(companion.into());
		self
	}

	pub fn abstracted(mut self) -> Self {
		self.is_abstract = true;
		self
	}

	pub fn hidden(mut self) -> Self {
		self.flags.insert(StateFlags::HIDDEN);
		self
	}

	pub fn is_set(&self, flag: StateFlags) -> bool {
		self.flags.contains(flag)
	}

	pub fn apply_state(&mut self, flag: StateFlags, on: bool) {
		self.flags.set(flag, on);
	}

	pub fn first_parent(&self) -> Option<ElementId> {
		self.parents.first().copied()
	}
}

/// Element storage owned by the host. Insertion order of `children` and of the
/// graph itself is traversal order.
#[derive(Clone, Debug, Default)]
pub struct ElementGraph {
	elements: HashMap<ElementId, Element>,
	order: Vec<ElementId>,
}

impl ElementGraph {
	/// Empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces an element and returns its id.
	pub fn insert(&mut self, element: Element) -> ElementId {
		let id = element.id;
		if self.elements.insert(id, element).is_none() {
			self.order.push(id);
		}
		id
	}

	/// Records `child` under `parent`, keeping insertion order on both sides.
	pub fn link(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
		self.get(child)?;
		let p = self.get_mut(parent)?;
		if !p.children.contains(&child) {
			p.children.push(child);
		}
		let c = self.get_mut(child)?;
		if !c.parents.contains(&parent) {
			c.parents.push(parent);
		}
		Ok(())
	}

	/// Looks up `id`, failing with [`DrillDownError::MissingElement`].
	pub fn get(&self, id: ElementId) -> Result<&Element> {
		self.elements
			.get(&id)
			.ok_or(DrillDownError::MissingElement(id))
	}

	/// Mutable [`get`](Self::get).
	pub fn get_mut(&mut self, id: ElementId) -> Result<&mut Element> {
		self.elements
			.get_mut(&id)
			.ok_or(DrillDownError::MissingElement(id))
	}

	/// Whether `id` is present.
	pub fn contains(&self, id: ElementId) -> bool {
		self.elements.contains_key(&id)
	}

	/// Ids in insertion order.
	pub fn ids(&self) -> &[ElementId] {
		&self.order
	}

	/// Elements without parents, in insertion order.
	pub fn roots(&self) -> Vec<ElementId> {
		self.order
			.iter()
			.copied()
			.filter(|id| self.elements[id].parents.is_empty())
			.collect()
	}

	/// First root a navigation can start from: visible, neither solid nor space.
	pub fn entry_root(&self) -> Option<ElementId> {
		self.roots().into_iter().find(|id| {
			let element = &self.elements[id];
			!element.is_set(StateFlags::HIDDEN) && !element.genre.is_solid() && !element.genre.is_space()
		})
	}

	/// Children of `id` tagged `genre`, in declared order.
	pub fn children_by_genre(&self, id: ElementId, genre: &Genre) -> Result<Vec<ElementId>> {
		let element = self.get(id)?;
		let mut found = Vec::new();
		for &child in &element.children {
			if &self.get(child)?.genre == genre {
				found.push(child);
			}
		}
		Ok(found)
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.order.len()
	}

	/// Whether the graph holds no element.
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}
}
