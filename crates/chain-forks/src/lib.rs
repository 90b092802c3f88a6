//! # Chain Forks
//!
//! Fork schedule and compatibility engine.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A chain's consensus rules change at fixed heights. This crate answers:
//! - is a configured schedule internally consistent?
//! - can a node that already advanced under one schedule switch to another,
//!   and if not, how far back must it rewind?
//! - which upgrades are in force at a given block?
//!
//! ## Guarantees
//!
//! | Property | Description |
//! |----------|-------------|
//! | Ordering | Heights never decrease along the protocol order |
//! | Past is fixed | A boundary behind the head never moves without a rewind |
//! | Minimal rewind | Fixed-point search returns the lowest disagreeing point |
//! | Inclusive activation | An upgrade is active at its own height |
//!
//! ## Module Structure
//!
//! ```text
//! chain-forks/
//! ├── domain/          # Upgrade catalogue, ForkSchedule, Rules, checkpoints, errors
//! ├── algorithms/      # Ordering validation, compatibility check, rule derivation
//! ├── ports/           # RuleQuery (inbound) + ScheduleStore (outbound)
//! ├── application/     # ForkScheduleService startup orchestration
//! ├── networks.rs      # Built-in network tables and presets
//! └── config.rs        # ForkConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod networks;
pub mod ports;

// Re-exports
pub use algorithms::{
    check_compatible, check_compatible_at, check_compatible_bounded, derive_rules, is_active,
    rewind_round_limit, validate_fork_order,
};
pub use application::{ForkScheduleService, SetupOutcome};
pub use config::{load_schedule, ConfigError, ForkConfig};
pub use domain::{
    ActivationPoint, BlockHeight, CheckpointOracleConfig, CliqueConfig, CompatError,
    ConsensusEngine, Derivation, ForkSchedule, ForkScheduleBuilder, ForkScheduleError,
    OrderingError, Rules, TrustedCheckpoint, Upgrade,
};
pub use networks::{
    all_clique_protocol_changes, all_ethash_protocol_changes, all_frkhash_protocol_changes,
    test_chain_config, Network, NetworkTable, UnknownNetwork,
};
pub use ports::{InMemoryScheduleStore, RuleQuery, ScheduleStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
