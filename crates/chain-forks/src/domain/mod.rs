//! # Domain Module
//!
//! Core domain types for the fork schedule engine.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod upgrades;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use upgrades::*;
pub use value_objects::*;
