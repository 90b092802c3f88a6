//! # Compatibility Checking
//!
//! Decides whether a node that already advanced under a stored schedule can
//! switch to a candidate schedule, and if not, how far back it must rewind.
//!
//! A single pass at a given head reports the first disagreeing boundary in
//! protocol order. The full check repeats the pass at each reported rewind
//! point until the point stops moving, because fixing one divergence can
//! expose an older one.

use tracing::{debug, warn};

use crate::domain::{
    is_fork_incompatible, is_forked, BlockHeight, CompatError, Derivation, ForkSchedule, Upgrade,
};

/// Identity attributes compared once their anchor upgrade is in force.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IdentityGuard {
    /// Both schedules must side the same way on the DAO fork.
    DaoSupport,
    /// Replay protection depends on a stable chain id.
    ChainId,
}

impl IdentityGuard {
    /// Guard checked right after `upgrade`'s own boundary.
    fn after(upgrade: Upgrade) -> Option<Self> {
        match upgrade {
            Upgrade::DaoFork => Some(IdentityGuard::DaoSupport),
            Upgrade::Eip158 => Some(IdentityGuard::ChainId),
            _ => None,
        }
    }

    fn anchor(self) -> Upgrade {
        match self {
            IdentityGuard::DaoSupport => Upgrade::DaoFork,
            IdentityGuard::ChainId => Upgrade::Eip158,
        }
    }

    fn label(self) -> &'static str {
        match self {
            IdentityGuard::DaoSupport => "DAO fork support flag",
            IdentityGuard::ChainId => "EIP158 chain ID",
        }
    }

    fn holds(self, stored: &ForkSchedule, candidate: &ForkSchedule) -> bool {
        match self {
            IdentityGuard::DaoSupport => stored.dao_fork_support() == candidate.dao_fork_support(),
            IdentityGuard::ChainId => stored.chain_id() == candidate.chain_id(),
        }
    }

    /// Only enforced once the stored schedule has passed the anchor.
    fn check(
        self,
        stored: &ForkSchedule,
        candidate: &ForkSchedule,
        head: BlockHeight,
    ) -> Result<(), CompatError> {
        let anchor = self.anchor();
        if is_forked(stored.activation(anchor), head) && !self.holds(stored, candidate) {
            return Err(CompatError::new(
                self.label(),
                stored.activation(anchor),
                candidate.activation(anchor),
            ));
        }
        Ok(())
    }
}

/// Whether a mismatch on `upgrade` is tolerated because the stored schedule
/// left it unset and relied on its fallback.
///
/// Petersburg unset in storage behaves as Constantinople, so a candidate
/// that writes Petersburg at the old Constantinople height changes nothing.
fn covered_by_fallback(
    stored: &ForkSchedule,
    candidate: &ForkSchedule,
    upgrade: Upgrade,
    head: BlockHeight,
) -> bool {
    match upgrade.derivation() {
        Derivation::DefaultsTo(base) => {
            stored.activation(upgrade).is_none()
                && !is_fork_incompatible(stored.activation(base), candidate.activation(upgrade), head)
        }
        Derivation::Direct | Derivation::ImpliedBy(_) => false,
    }
}

/// Single pass: first disagreement at `head`, in protocol order.
pub fn check_compatible_at(
    stored: &ForkSchedule,
    candidate: &ForkSchedule,
    head: BlockHeight,
) -> Result<(), CompatError> {
    for upgrade in Upgrade::ALL {
        let have = stored.activation(upgrade);
        let want = candidate.activation(upgrade);

        if is_fork_incompatible(have, want, head)
            && !covered_by_fallback(stored, candidate, upgrade, head)
        {
            return Err(CompatError::new(upgrade.label(), have, want));
        }

        if let Some(guard) = IdentityGuard::after(upgrade) {
            guard.check(stored, candidate, head)?;
        }
    }
    Ok(())
}

/// Upper bound on passes needed to converge.
///
/// Each unsettled pass moves the rewind point strictly below the previous
/// head onto one of the configured heights (minus one) or zero, so the
/// number of passes is bounded by the distinct heights of both schedules.
pub fn rewind_round_limit(stored: &ForkSchedule, candidate: &ForkSchedule) -> usize {
    stored.distinct_heights() + candidate.distinct_heights() + 2
}

/// Full check with the natural round limit.
///
/// `Ok` when the candidate agrees with everything the node has already
/// committed at `height`. Otherwise the error carries the lowest rewind
/// point the node must return to.
pub fn check_compatible(
    stored: &ForkSchedule,
    candidate: &ForkSchedule,
    height: BlockHeight,
) -> Result<(), CompatError> {
    check_compatible_bounded(stored, candidate, height, rewind_round_limit(stored, candidate))
}

/// Full check with an explicit round limit.
///
/// Reaching the limit returns the last error found; its rewind point is
/// still safe, just possibly not minimal.
pub fn check_compatible_bounded(
    stored: &ForkSchedule,
    candidate: &ForkSchedule,
    height: BlockHeight,
    max_rounds: usize,
) -> Result<(), CompatError> {
    let max_rounds = max_rounds.max(1);
    let mut head = height;
    let mut last: Option<CompatError> = None;

    for round in 0..max_rounds {
        let err = match check_compatible_at(stored, candidate, head) {
            Ok(()) => break,
            Err(err) => err,
        };

        if last.as_ref().is_some_and(|prev| prev.rewind_to == err.rewind_to) {
            break;
        }

        debug!(
            round,
            head,
            what = err.what,
            rewind_to = err.rewind_to,
            "Fork schedule divergence, rechecking below rewind point"
        );

        head = err.rewind_to;
        last = Some(err);

        if round + 1 == max_rounds {
            warn!(
                max_rounds,
                rewind_to = head,
                "Compatibility check hit its round limit before settling"
            );
        }
    }

    match last {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    fn staggered() -> ForkSchedule {
        ForkSchedule::builder(2u64)
            .activate(Upgrade::Homestead, 200_000)
            .activate_all(&[Upgrade::Eip150, Upgrade::Eip155, Upgrade::Eip158], 600_000)
            .activate(Upgrade::Byzantium, 800_000)
            .activate_all(&[Upgrade::Constantinople, Upgrade::Petersburg], 1_860_000)
            .activate(Upgrade::Istanbul, 3_050_000)
            .build()
    }

    #[test]
    fn test_identical_schedules_compatible() {
        let schedule = staggered();
        for head in [0, 200_000, 850_000, u64::MAX] {
            assert!(check_compatible(&schedule, &schedule, head).is_ok());
        }
    }

    #[test]
    fn test_moved_boundary_behind_head() {
        let candidate = staggered().with_activation(Upgrade::Byzantium, Some(900_000));
        let err = check_compatible(&staggered(), &candidate, 850_000).unwrap_err();
        assert_eq!(err.what, "Byzantium fork block");
        assert_eq!(err.stored, Some(800_000));
        assert_eq!(err.candidate, Some(900_000));
        assert_eq!(err.rewind_to, 799_999);
    }

    #[test]
    fn test_change_above_head_is_compatible() {
        let candidate = staggered().with_activation(Upgrade::Istanbul, Some(4_000_000));
        assert!(check_compatible(&staggered(), &candidate, 3_000_000).is_ok());
    }

    #[test]
    fn test_removed_boundary() {
        let candidate = staggered().with_activation(Upgrade::Istanbul, None);
        let err = check_compatible(&staggered(), &candidate, 3_100_000).unwrap_err();
        assert_eq!(err.what, "Istanbul fork block");
        assert_eq!(err.candidate, None);
        assert_eq!(err.rewind_to, 3_049_999);
    }

    #[test]
    fn test_fixed_point_reaches_older_divergence() {
        // YOLOv3 sits outside the ordered list, so the Byzantium mismatch
        // is reported first even though YOLOv3 diverged much earlier.
        let candidate = staggered()
            .with_activation(Upgrade::Byzantium, Some(900_000))
            .with_activation(Upgrade::YoloV3, Some(100_000));
        let single = check_compatible_at(&staggered(), &candidate, 2_000_000).unwrap_err();
        assert_eq!(single.what, "Byzantium fork block");
        assert_eq!(single.rewind_to, 799_999);

        let err = check_compatible(&staggered(), &candidate, 2_000_000).unwrap_err();
        assert_eq!(err.what, "YOLOv3 fork block");
        assert_eq!(err.rewind_to, 99_999);
    }

    #[test]
    fn test_fixed_point_result_is_self_consistent() {
        let candidate = staggered()
            .with_activation(Upgrade::Homestead, Some(300_000))
            .with_activation(Upgrade::Byzantium, Some(850_000));
        let err = check_compatible(&staggered(), &candidate, 900_000).unwrap_err();
        assert_eq!(err.rewind_to, 199_999);
        assert!(check_compatible_at(&staggered(), &candidate, err.rewind_to).is_ok());
    }

    #[test]
    fn test_petersburg_fallback_tolerated() {
        let stored = staggered().with_activation(Upgrade::Petersburg, None);
        let candidate = staggered();
        assert!(check_compatible(&stored, &candidate, 2_000_000).is_ok());
    }

    #[test]
    fn test_petersburg_fallback_mismatch_reported() {
        let stored = staggered().with_activation(Upgrade::Petersburg, None);
        let candidate = staggered().with_activation(Upgrade::Petersburg, Some(1_900_000));
        let err = check_compatible(&stored, &candidate, 2_000_000).unwrap_err();
        assert_eq!(err.what, "Petersburg fork block");
        assert_eq!(err.rewind_to, 1_899_999);
    }

    #[test]
    fn test_explicit_stored_petersburg_not_covered_by_fallback() {
        // Blocks 1_860_000..1_900_000 ran without Petersburg; moving it down
        // onto Constantinople would rewrite them.
        let stored = staggered().with_activation(Upgrade::Petersburg, Some(1_900_000));
        let candidate = staggered();
        let err = check_compatible(&stored, &candidate, 2_000_000).unwrap_err();
        assert_eq!(err.what, "Petersburg fork block");
        assert_eq!(err.stored, Some(1_900_000));
        assert_eq!(err.candidate, Some(1_860_000));
        assert_eq!(err.rewind_to, 1_859_999);
        assert!(check_compatible(&stored, &candidate, err.rewind_to).is_ok());
    }

    #[test]
    fn test_dao_support_guard() {
        let stored = staggered()
            .with_activation(Upgrade::DaoFork, Some(400_000))
            .with_dao_fork_support(true);
        let candidate = stored.with_dao_fork_support(false);
        let err = check_compatible(&stored, &candidate, 500_000).unwrap_err();
        assert_eq!(err.what, "DAO fork support flag");
        assert_eq!(err.rewind_to, 399_999);

        // Not yet at the DAO block: flag may still change.
        assert!(check_compatible(&stored, &candidate, 399_999).is_ok());
    }

    #[test]
    fn test_chain_id_guard() {
        let candidate = staggered().with_chain_id(Some(U256::from(7u64)));
        let err = check_compatible(&staggered(), &candidate, 700_000).unwrap_err();
        assert_eq!(err.what, "EIP158 chain ID");
        assert_eq!(err.stored, Some(600_000));
        assert_eq!(err.rewind_to, 599_999);

        assert!(check_compatible(&staggered(), &candidate, 599_999).is_ok());
    }

    #[test]
    fn test_height_check_precedes_guard() {
        let candidate = staggered()
            .with_activation(Upgrade::Eip158, Some(650_000))
            .with_chain_id(Some(U256::from(7u64)));
        let err = check_compatible_at(&staggered(), &candidate, 700_000).unwrap_err();
        assert_eq!(err.what, "EIP158 fork block");
    }

    #[test]
    fn test_zero_round_limit_still_checks_once() {
        let candidate = staggered().with_activation(Upgrade::Byzantium, Some(900_000));
        assert!(check_compatible_bounded(&staggered(), &candidate, 850_000, 0).is_err());
    }

    #[test]
    fn test_genesis_divergence_rewinds_to_zero() {
        let stored = ForkSchedule::builder(1u64).activate(Upgrade::Homestead, 0).build();
        let candidate = stored.with_activation(Upgrade::Homestead, Some(5));
        let err = check_compatible(&stored, &candidate, 10).unwrap_err();
        assert_eq!(err.rewind_to, 0);
    }
}
