use thiserror::Error;

use super::types::ElementId;

/// Faults that abort the current redraw pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrillDownError {
	/// A click, link or walk named an id the graph does not hold.
	#[error("element {0} is referenced but not present in the graph")]
	MissingElement(ElementId),
	/// Nothing is focused yet.
	#[error("redraw requested with an empty selection stack")]
	EmptySelection,
	/// A lookup after the cache froze missed.
	#[error("no cached position for element {0}")]
	Uncached(ElementId),
	/// The parent chain loops back on itself.
	#[error("ancestor walk revisited element {0}")]
	Cycle(ElementId),
}

pub type Result<T, E = DrillDownError> = std::result::Result<T, E>;
