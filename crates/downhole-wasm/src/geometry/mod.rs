//! Geometry types and trajectory integration for deviated holes.

pub mod trajectory;
pub mod types;

pub use trajectory::*;
pub use types::*;
