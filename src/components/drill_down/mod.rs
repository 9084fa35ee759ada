mod collab;
mod component;
mod config;
mod error;
mod render;
mod selection;
mod spiral;
mod state;
mod surface;
#[cfg(test)]
mod test_support;
mod types;
mod visibility;

pub use component::{DrillDownCanvas, TIMELINE};
pub use config::LayoutParameters;
pub use error::DrillDownError;
pub use state::DrillDownState;
pub use surface::RenderSurface;
pub use types::{Element, ElementGraph, ElementId, Genre};
