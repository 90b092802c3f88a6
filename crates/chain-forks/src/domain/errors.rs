//! # Domain Errors
//!
//! Error types for the fork schedule engine.

use std::fmt;
use thiserror::Error;

use super::upgrades::Upgrade;

/// Block height type.
pub type BlockHeight = u64;

/// A schedule contradicts the fixed protocol order.
///
/// Fatal at startup: the configuration was authored wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    /// A later upgrade is scheduled while an earlier mandatory one is disabled.
    #[error(
        "unsupported fork ordering: {} not enabled, but {} enabled at {height}",
        .previous.config_key(),
        .current.config_key()
    )]
    NotEnabled {
        /// The disabled upgrade
        previous: Upgrade,
        /// The upgrade scheduled after it
        current: Upgrade,
        /// Height the later upgrade activates at
        height: BlockHeight,
    },

    /// A later upgrade activates before an earlier one.
    #[error(
        "unsupported fork ordering: {} enabled at {previous_height}, but {} enabled at {height}",
        .previous.config_key(),
        .current.config_key()
    )]
    OutOfOrder {
        /// The earlier upgrade in protocol order
        previous: Upgrade,
        /// Its activation height
        previous_height: BlockHeight,
        /// The upgrade activating too early
        current: Upgrade,
        /// Its activation height
        height: BlockHeight,
    },
}

impl OrderingError {
    /// The upgrade that broke the ordering.
    pub fn offending(&self) -> Upgrade {
        match self {
            OrderingError::NotEnabled { current, .. } => *current,
            OrderingError::OutOfOrder { current, .. } => *current,
        }
    }
}

/// Stored chain history was built with a schedule the candidate would alter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "mismatching {what} in database (have {}, want {}, rewindto {rewind_to})",
    OptHeight(*stored),
    OptHeight(*candidate)
)]
pub struct CompatError {
    /// What mismatched, e.g. "Byzantium fork block".
    pub what: &'static str,
    /// Height in the stored schedule.
    pub stored: Option<BlockHeight>,
    /// Height in the candidate schedule.
    pub candidate: Option<BlockHeight>,
    /// Newest height both schedules agree on; local history must be cut back to it.
    pub rewind_to: BlockHeight,
}

impl CompatError {
    /// Build an error, deriving the rewind point from the two heights.
    ///
    /// The lower configured height wins; an absent side adds no constraint.
    pub fn new(
        what: &'static str,
        stored: Option<BlockHeight>,
        candidate: Option<BlockHeight>,
    ) -> Self {
        let boundary = match (stored, candidate) {
            (None, other) | (other, None) => other,
            (Some(s), Some(c)) => Some(s.min(c)),
        };
        let rewind_to = boundary.map_or(0, |h| h.saturating_sub(1));
        Self {
            what,
            stored,
            candidate,
            rewind_to,
        }
    }
}

struct OptHeight(Option<BlockHeight>);

impl fmt::Display for OptHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(height) => write!(f, "{}", height),
            None => f.write_str("nil"),
        }
    }
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum ForkScheduleError {
    /// Schedule is internally inconsistent.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// Candidate schedule would rewrite committed history.
    #[error(transparent)]
    Compat(#[from] CompatError),

    /// The persistence layer failed.
    #[error("Schedule store error: {0}")]
    Store(String),

    /// No schedule could be resolved for this node.
    #[error("No fork schedule configured: {0}")]
    Unconfigured(String),
}
