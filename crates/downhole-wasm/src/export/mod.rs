//! Export boundary: storage-ready attributes and measurement unit lookups.

pub mod attributes;
pub mod units;

pub use attributes::*;
pub use units::*;
