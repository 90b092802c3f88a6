//! # Domain Invariants
//!
//! Activation-height primitives every algorithm builds on.
//!
//! All absent/present combinations are spelled out; an unscheduled upgrade is
//! never active and never equal to a scheduled one.

use super::errors::BlockHeight;

/// Whether an upgrade scheduled at `scheduled` is active at block `head`.
///
/// Activation is inclusive of its own height.
pub fn is_forked(scheduled: Option<BlockHeight>, head: BlockHeight) -> bool {
    match scheduled {
        Some(height) => height <= head,
        None => false,
    }
}

/// Whether two schedules put an upgrade at exactly the same height.
pub fn same_activation(a: Option<BlockHeight>, b: Option<BlockHeight>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x == y,
        (None, Some(_)) | (Some(_), None) => false,
    }
}

/// Invariant: an activation boundary the node has already passed must not move.
///
/// True when either side is active at `head` and the two heights differ.
/// A change that lies entirely above `head` is always allowed.
pub fn is_fork_incompatible(
    stored: Option<BlockHeight>,
    candidate: Option<BlockHeight>,
    head: BlockHeight,
) -> bool {
    (is_forked(stored, head) || is_forked(candidate, head)) && !same_activation(stored, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_forked_inclusive() {
        assert!(is_forked(Some(10), 10));
        assert!(!is_forked(Some(10), 9));
        assert!(is_forked(Some(0), 0));
        assert!(!is_forked(None, u64::MAX));
    }

    #[test]
    fn test_same_activation() {
        assert!(same_activation(None, None));
        assert!(same_activation(Some(5), Some(5)));
        assert!(!same_activation(Some(0), None));
        assert!(!same_activation(None, Some(0)));
        assert!(!same_activation(Some(1), Some(2)));
    }

    #[test]
    fn test_incompatible_past_change() {
        assert!(is_fork_incompatible(Some(800_000), Some(900_000), 850_000));
        assert!(is_fork_incompatible(Some(10), None, 10));
        assert!(is_fork_incompatible(None, Some(10), 10));
    }

    #[test]
    fn test_future_change_is_compatible() {
        assert!(!is_fork_incompatible(Some(100), Some(200), 99));
        assert!(!is_fork_incompatible(None, Some(200), 199));
        assert!(!is_fork_incompatible(Some(100), Some(100), 1_000));
    }
}
