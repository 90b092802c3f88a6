//! # Fork Ordering
//!
//! Rejects schedules that skip or reorder upgrades.
//!
//! Walks the fixed protocol order keeping the last upgrade that constrains
//! its successors. Optional upgrades left unscheduled do not constrain
//! anything; once scheduled they are checked like any other.

use crate::domain::{ActivationPoint, ForkSchedule, OrderingError, Upgrade};

/// Validate that activation heights never decrease along the protocol order
/// and that nothing activates after a disabled mandatory upgrade.
///
/// Fail-fast: the first violation is returned.
pub fn validate_fork_order(schedule: &ForkSchedule) -> Result<(), OrderingError> {
    let mut last: Option<ActivationPoint> = None;

    for upgrade in Upgrade::ordered() {
        let current = schedule.point(upgrade);

        if let Some(previous) = last {
            match (previous.height, current.height) {
                (None, Some(height)) => {
                    return Err(OrderingError::NotEnabled {
                        previous: previous.upgrade,
                        current: upgrade,
                        height,
                    });
                }
                (Some(previous_height), Some(height)) if previous_height > height => {
                    return Err(OrderingError::OutOfOrder {
                        previous: previous.upgrade,
                        previous_height,
                        current: upgrade,
                        height,
                    });
                }
                _ => {}
            }
        }

        if !current.optional_gap_allowed() || current.is_scheduled() {
            last = Some(current);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mainline(height: u64) -> ForkSchedule {
        ForkSchedule::builder(1u64)
            .activate_all(
                &[
                    Upgrade::Homestead,
                    Upgrade::Eip150,
                    Upgrade::Eip155,
                    Upgrade::Eip158,
                    Upgrade::Byzantium,
                    Upgrade::Constantinople,
                    Upgrade::Petersburg,
                    Upgrade::Istanbul,
                    Upgrade::Berlin,
                ],
                height,
            )
            .build()
    }

    #[test]
    fn test_empty_schedule_is_ordered() {
        assert!(validate_fork_order(&ForkSchedule::unscheduled()).is_ok());
    }

    #[test]
    fn test_genesis_schedule_is_ordered() {
        assert!(validate_fork_order(&mainline(0)).is_ok());
    }

    #[test]
    fn test_staggered_schedule_is_ordered() {
        let schedule = ForkSchedule::builder(2u64)
            .activate(Upgrade::Homestead, 200_000)
            .activate_all(&[Upgrade::Eip150, Upgrade::Eip155, Upgrade::Eip158], 600_000)
            .activate(Upgrade::Byzantium, 800_000)
            .activate_all(&[Upgrade::Constantinople, Upgrade::Petersburg], 1_860_000)
            .activate(Upgrade::Istanbul, 3_050_000)
            .activate(Upgrade::Berlin, 12_244_000)
            .build();
        assert!(validate_fork_order(&schedule).is_ok());
    }

    #[test]
    fn test_later_upgrade_below_earlier_fails() {
        let schedule = ForkSchedule::builder(1u64)
            .activate(Upgrade::Homestead, 10)
            .activate(Upgrade::Eip150, 5)
            .build();
        let err = validate_fork_order(&schedule).unwrap_err();
        assert_eq!(
            err,
            OrderingError::OutOfOrder {
                previous: Upgrade::Homestead,
                previous_height: 10,
                current: Upgrade::Eip150,
                height: 5,
            }
        );
    }

    #[test]
    fn test_disabled_mandatory_blocks_successors() {
        let schedule = mainline(0).with_activation(Upgrade::Byzantium, None);
        let err = validate_fork_order(&schedule).unwrap_err();
        assert_eq!(
            err,
            OrderingError::NotEnabled {
                previous: Upgrade::Byzantium,
                current: Upgrade::Constantinople,
                height: 0,
            }
        );
    }

    #[test]
    fn test_unscheduled_optional_is_skipped() {
        // DAO unset: Homestead is compared against EIP150 directly.
        let schedule = mainline(0).with_activation(Upgrade::Homestead, Some(1));
        let err = validate_fork_order(&schedule).unwrap_err();
        assert_eq!(
            err,
            OrderingError::OutOfOrder {
                previous: Upgrade::Homestead,
                previous_height: 1,
                current: Upgrade::Eip150,
                height: 0,
            }
        );

        // Muir Glacier unset: Berlin follows Istanbul.
        let schedule = mainline(7).with_activation(Upgrade::Berlin, Some(6));
        let err = validate_fork_order(&schedule).unwrap_err();
        assert_eq!(err.offending(), Upgrade::Berlin);
    }

    #[test]
    fn test_scheduled_optional_still_ordered() {
        let schedule = ForkSchedule::builder(1u64)
            .activate(Upgrade::Homestead, 100)
            .activate(Upgrade::DaoFork, 50)
            .build();
        let err = validate_fork_order(&schedule).unwrap_err();
        assert_eq!(err.offending(), Upgrade::DaoFork);
    }

    #[test]
    fn test_scheduled_optional_constrains_successor() {
        let schedule = ForkSchedule::builder(1u64)
            .activate(Upgrade::Homestead, 10)
            .activate(Upgrade::DaoFork, 20)
            .activate(Upgrade::Eip150, 15)
            .build();
        let err = validate_fork_order(&schedule).unwrap_err();
        assert_eq!(
            err,
            OrderingError::OutOfOrder {
                previous: Upgrade::DaoFork,
                previous_height: 20,
                current: Upgrade::Eip150,
                height: 15,
            }
        );
    }

    #[test]
    fn test_experimental_upgrades_not_ordered() {
        let schedule = mainline(100).with_activation(Upgrade::YoloV3, Some(0));
        assert!(validate_fork_order(&schedule).is_ok());
    }

    #[test]
    fn test_first_violation_reported() {
        let schedule = ForkSchedule::builder(1u64)
            .activate(Upgrade::Homestead, 10)
            .activate(Upgrade::Eip150, 5)
            .activate(Upgrade::Eip155, 1)
            .build();
        let err = validate_fork_order(&schedule).unwrap_err();
        assert_eq!(err.offending(), Upgrade::Eip150);
    }
}
