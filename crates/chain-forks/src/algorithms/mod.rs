//! Algorithms for the fork schedule engine.

pub mod compatibility;
pub mod ordering;
pub mod rules;

pub use compatibility::{
    check_compatible, check_compatible_at, check_compatible_bounded, rewind_round_limit,
};
pub use ordering::validate_fork_order;
pub use rules::{derive_rules, is_active};
