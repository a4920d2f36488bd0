//! Core record types for ottometer.
//!
//! This crate provides the grow unit model shared by the storage layer,
//! the HTTP server and the CLI:
//! - `GrowUnit`, a cultivation chamber description
//! - `GrowMedium`, the substrate the plants grow in
//! - Record validation and derived metrics (area, volume)

pub mod growunit;

// Re-export commonly used types at the crate root
pub use growunit::{GrowMedium, GrowUnit, ValidationError};
