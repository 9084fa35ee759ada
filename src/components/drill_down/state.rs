use glam::Vec3;
use log::{debug, info, warn};

use super::collab::{Collaborator, CollaboratorRegistry, DerivedState, Handoff};
use super::config::LayoutParameters;
use super::error::{DrillDownError, Result};
use super::selection::{SelectionStack, is_ancestor, is_child};
use super::spiral::Session;
use super::surface::{MeshKind, MeshSpec, RenderSurface};
use super::types::{ElementGraph, ElementId, Genre, StateFlags};
use super::visibility::{deselect_elements, hide_children};

/// Drill-down navigation over an [`ElementGraph`].
///
/// The host lays out a top-level batch once, then per frame calls
/// [`init_render_loop`](Self::init_render_loop) followed by
/// [`render_element`](Self::render_element) for each element.
#[derive(Debug)]
pub struct DrillDownState {
	params: LayoutParameters,
	session: Session,
	stack: SelectionStack,
	pending: Option<ElementId>,
	derived: DerivedState,
	collaborators: CollaboratorRegistry,
}

impl Default for DrillDownState {
	fn default() -> Self {
		Self::new(LayoutParameters::default())
	}
}

impl DrillDownState {
	/// Fresh session with an empty stack.
	pub fn new(params: LayoutParameters) -> Self {
		Self {
			session: Session::new(params.spiral_step),
			params,
			stack: SelectionStack::default(),
			pending: None,
			derived: DerivedState::default(),
			collaborators: CollaboratorRegistry::default(),
		}
	}

	/// Tunables this engine was built with.
	pub fn params(&self) -> &LayoutParameters {
		&self.params
	}

	/// Placement session and its position cache.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Focus path, root first.
	pub fn stack(&self) -> &SelectionStack {
		&self.stack
	}

	/// State gathered while building meshes, handed to collaborators.
	pub fn derived(&self) -> DerivedState {
		self.derived
	}

	/// Current focus, if any.
	pub fn focus(&self) -> Option<ElementId> {
		self.stack.top().map(|entry| entry.id)
	}

	/// Registers the secondary engine that elements name as their companion.
	pub fn register_collaborator(&mut self, name: impl Into<String>, collaborator: Box<dyn Collaborator>) {
		self.collaborators.register(name, collaborator);
	}

	/// Records a click; it takes effect on the next `init_render_loop`.
	pub fn select(&mut self, id: ElementId) {
		self.pending = Some(id);
	}

	/// Starts a new navigation session.
	pub fn reset(&mut self) {
		self.session.reset();
		self.stack.clear();
		self.pending = None;
		self.derived = DerivedState::default();
		debug!("Navigation session reset");
	}

	/// Places and instantiates a top-level batch, skipping hidden elements.
	pub fn layout(
		&mut self,
		graph: &mut ElementGraph,
		surface: &mut impl RenderSurface,
		batch: &[ElementId],
	) -> Result<()> {
		let mut next_pos: Option<Vec3> = None;

		for &id in batch {
			if graph.get(id)?.is_set(StateFlags::HIDDEN) {
				continue;
			}
			let prev_solid_pos = next_pos;
			let position = self.session.next_coordinate(id)?;
			next_pos = Some(position);
			self.place_solid(graph, surface, id, position)?;

			let Some(from) = prev_solid_pos else {
				continue;
			};
			let color = self.params.palette.color_for(&graph.get(id)?.alias);
			for related in graph.children_by_genre(id, &Genre::Related)? {
				let element = graph.get(related)?;
				if let Some(handle) = element.handle {
					surface.upsert(handle);
					continue;
				}
				let spec = MeshSpec {
					element: related,
					kind: MeshKind::Link { from },
					label: element.name.clone(),
					color,
					position,
				};
				if let Some(handle) = surface.instantiate(spec) {
					surface.upsert(handle);
					graph.get_mut(related)?.handle = Some(handle);
				}
			}
		}

		if let Some(&first) = batch.first() {
			let companion = graph.get(first)?.companion.clone();
			if let Some(name) = companion.filter(|name| !name.is_empty()) {
				self.collaborate(&name);
			}
		}
		Ok(())
	}

	/// Hands the derived state to the collaborator registered as `name`.
	pub fn collaborate(&mut self, name: &str) {
		let Some(collaborator) = self.collaborators.get_mut(name) else {
			warn!("No collaborator registered as {name}");
			return;
		};
		debug!("Collaborating with {name}: {:?}", self.derived);
		collaborator.receive(&Handoff {
			derived: self.derived,
			positions: self.session.cache(),
		});
	}

	/// Applies the pending click, if any. Always reports completion.
	pub fn init_render_loop(
		&mut self,
		graph: &mut ElementGraph,
		surface: &mut impl RenderSurface,
	) -> Result<bool> {
		self.session.populate(graph)?;

		let Some(clicked) = self.pending.take() else {
			return Ok(true);
		};
		let genre = graph.get(clicked)?.genre.clone();
		if self.focus() == Some(clicked) {
			return Ok(true);
		}

		if let Some(top) = self.stack.top().copied()
			&& !genre.is_space()
			&& !is_ancestor(graph, top.id, clicked)?
		{
			if self.stack.pop().is_some() {
				debug!("Leaving {}", top.id);
			}
			hide_children(graph, surface, top.id)?;
			deselect_elements(graph, surface, top.id, clicked)?;
			self.discard_stale(graph, clicked)?;
		}

		if genre.is_solid() || genre.is_space() {
			return Ok(true);
		}

		if self.focus() != Some(clicked) {
			let anchor = self
				.session
				.cache()
				.get(clicked)
				.ok_or(DrillDownError::Uncached(clicked))?;
			self.stack.push(clicked, anchor);
			debug!("Focused {clicked} (depth {})", self.stack.len());
		}
		let children = graph.get(clicked)?.children.clone();
		for child in children {
			let element = graph.get_mut(child)?;
			element.apply_state(StateFlags::HIDDEN, false);
			element.apply_state(StateFlags::SELECTED, true);
		}
		Ok(true)
	}

	/// Pops entries left over from abandoned branches until the top leads to
	/// `clicked`.
	fn discard_stale(&mut self, graph: &ElementGraph, clicked: ElementId) -> Result<()> {
		while let Some(top) = self.stack.top().copied() {
			if top.id == clicked || is_ancestor(graph, top.id, clicked)? {
				break;
			}
			if self.stack.pop().is_none() {
				break;
			}
			debug!("Discarded stale focus {}", top.id);
		}
		Ok(())
	}

	/// Redraws one element. Returns whether it is the focus or one of its
	/// ancestors. The focus' children are lit but report `false`.
	pub fn render_element(
		&mut self,
		graph: &mut ElementGraph,
		surface: &mut impl RenderSurface,
		id: ElementId,
	) -> Result<bool> {
		let focus = self.focus().ok_or(DrillDownError::EmptySelection)?;
		let element = graph.get(id)?;

		if id == focus
			&& let Some(handle) = element.handle
		{
			surface.recolor(handle, self.params.focus_color, 1.0);
			let children = element.children.clone();
			for child in children {
				let element = graph.get(child)?;
				if element.genre.is_solid() || element.alias == self.params.statistic_alias {
					continue;
				}
				let handle = element.handle;
				match handle {
					Some(handle) => surface.upsert(handle),
					None => {
						let position = self.session.next_coordinate(child)?;
						self.place_solid(graph, surface, child, position)?;
					}
				}
			}
			return Ok(true);
		}

		let color = self.params.palette.color_for(&element.alias);
		let handle = element.handle;
		let in_spotlight = is_child(graph, focus, id)?;
		if let Some(handle) = handle {
			let opacity = if in_spotlight { 1.0 } else { self.params.dim_opacity };
			surface.recolor(handle, color, opacity);
		}
		Ok(id == focus || is_ancestor(graph, id, focus)?)
	}

	/// Builds the sphere for `id` unless it already has one.
	fn place_solid(
		&mut self,
		graph: &mut ElementGraph,
		surface: &mut impl RenderSurface,
		id: ElementId,
		position: Vec3,
	) -> Result<()> {
		let element = graph.get(id)?;
		if let Some(handle) = element.handle {
			surface.upsert(handle);
			return Ok(());
		}
		if element.alias == self.params.time_series_alias && !element.data.is_empty() {
			match element.data.trim().parse::<i64>() {
				Ok(max_time) => self.derived.max_time = Some(max_time),
				Err(err) => warn!("Ignoring time payload {:?} of {}: {err}", element.data, element.name),
			}
		}
		let spec = MeshSpec {
			element: id,
			kind: MeshKind::Sphere {
				radius: self.params.solid_radius,
			},
			label: element.name.clone(),
			color: self.params.palette.color_for(&element.alias),
			position,
		};
		match surface.instantiate(spec) {
			Some(handle) => {
				info!("Adding {}", element.name);
				surface.upsert(handle);
				graph.get_mut(id)?.handle = Some(handle);
			}
			None => warn!("Could not build mesh for {}, retrying next pass", element.name),
		}
		Ok(())
	}
}
