//! # Ports Module
//!
//! Hexagonal architecture ports (inbound queries, outbound persistence).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
