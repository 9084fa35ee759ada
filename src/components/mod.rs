//! Reusable view components.

pub mod drill_down;
