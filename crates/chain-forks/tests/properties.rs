//! Property tests for ordering, compatibility and rule derivation.

use chain_forks::{
    check_compatible, check_compatible_bounded, is_active, validate_fork_order, BlockHeight,
    ForkSchedule, Upgrade,
};
use proptest::{collection, prelude::*};

/// Schedules whose heights never decrease along the protocol order.
fn ordered_schedule() -> impl Strategy<Value = ForkSchedule> {
    (
        collection::vec(0u64..50_000, 12),
        0usize..=12,
        any::<bool>(),
        any::<bool>(),
        1u64..5,
        any::<bool>(),
        prop::option::of(0u64..400_000),
    )
        .prop_map(|(steps, enabled, dao, muir, chain_id, support, yolo)| {
            let mut builder = ForkSchedule::builder(chain_id).dao_fork_support(support);
            let mut height = 0;
            for (i, (upgrade, step)) in Upgrade::ordered().zip(steps).enumerate() {
                height += step;
                let skipped = i >= enabled
                    || (upgrade == Upgrade::DaoFork && !dao)
                    || (upgrade == Upgrade::MuirGlacier && !muir);
                if !skipped {
                    builder = builder.activate(upgrade, height);
                }
            }
            if let Some(yolo) = yolo {
                builder = builder.activate(Upgrade::YoloV3, yolo);
            }
            builder.build()
        })
}

/// Schedules with arbitrary heights, ordered or not.
fn any_schedule() -> impl Strategy<Value = ForkSchedule> {
    (
        collection::vec(prop::option::of(0u64..2_000), Upgrade::COUNT),
        1u64..3,
        any::<bool>(),
    )
        .prop_map(|(heights, chain_id, support)| {
            let mut schedule = ForkSchedule::builder(chain_id)
                .dao_fork_support(support)
                .build();
            for (upgrade, height) in Upgrade::ALL.into_iter().zip(heights) {
                schedule = schedule.with_activation(upgrade, height);
            }
            schedule
        })
}

/// Move every boundary above `head` somewhere else above `head`, or drop it.
fn diverge_above(
    schedule: &ForkSchedule,
    head: BlockHeight,
    moves: &[Option<u64>],
) -> ForkSchedule {
    let mut next = schedule.clone();
    for (upgrade, shift) in Upgrade::ALL.into_iter().zip(moves) {
        let passed = matches!(schedule.activation(upgrade), Some(h) if h <= head);
        if !passed {
            next = next.with_activation(upgrade, shift.map(|s| head + 1 + s));
        }
    }
    next
}

proptest! {
    #[test]
    fn ordered_schedules_validate(schedule in ordered_schedule()) {
        prop_assert!(validate_fork_order(&schedule).is_ok());
    }

    #[test]
    fn compatibility_is_reflexive(schedule in any_schedule(), head in 0u64..3_000) {
        prop_assert!(check_compatible(&schedule, &schedule, head).is_ok());
    }

    #[test]
    fn future_only_divergence_is_compatible(
        schedule in ordered_schedule(),
        head in 0u64..700_000,
        moves in collection::vec(prop::option::of(0u64..100_000), Upgrade::COUNT),
    ) {
        let candidate = diverge_above(&schedule, head, &moves);
        prop_assert!(check_compatible(&schedule, &candidate, head).is_ok());
    }

    #[test]
    fn rewind_lands_below_head(
        stored in any_schedule(),
        candidate in any_schedule(),
        head in 0u64..3_000,
    ) {
        if let Err(err) = check_compatible(&stored, &candidate, head) {
            prop_assert!(err.rewind_to < head || err.rewind_to == 0);
        }
    }

    #[test]
    fn round_limit_is_sufficient(
        stored in any_schedule(),
        candidate in any_schedule(),
        head in 0u64..3_000,
    ) {
        prop_assert_eq!(
            check_compatible(&stored, &candidate, head),
            check_compatible_bounded(&stored, &candidate, head, usize::MAX)
        );
    }

    #[test]
    fn activation_is_inclusive_and_monotonic(
        schedule in any_schedule(),
        head in 0u64..3_000,
    ) {
        for upgrade in Upgrade::ALL {
            if is_active(&schedule, upgrade, head) {
                prop_assert!(is_active(&schedule, upgrade, head + 1));
            }
        }
        if let Some(height) = schedule.activation(Upgrade::Homestead) {
            prop_assert!(is_active(&schedule, Upgrade::Homestead, height));
            if height > 0 {
                prop_assert!(!is_active(&schedule, Upgrade::Homestead, height - 1));
            }
        }
    }
}
