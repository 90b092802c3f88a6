//! # Outbound Ports
//!
//! Persistence of the schedule a node has accepted.

use parking_lot::RwLock;

use crate::domain::{ForkSchedule, ForkScheduleError};

/// Schedule persistence - outbound port.
///
/// The node keeps the schedule it last accepted next to its chain data so
/// that a restart with a changed configuration can be checked against it.
pub trait ScheduleStore: Send + Sync {
    /// Previously accepted schedule, `None` on a fresh database.
    fn load(&self) -> Result<Option<ForkSchedule>, ForkScheduleError>;

    /// Persist an accepted schedule, replacing the old one.
    fn store(&self, schedule: &ForkSchedule) -> Result<(), ForkScheduleError>;
}

// =============================================================================
// In-memory implementation
// =============================================================================

/// Store kept in process memory, for tests and tooling.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    schedule: RwLock<Option<ForkSchedule>>,
    /// Fail every call, to exercise error paths.
    pub should_fail: bool,
}

impl InMemoryScheduleStore {
    /// Empty store, as on a fresh database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `schedule`.
    pub fn with_schedule(schedule: ForkSchedule) -> Self {
        Self {
            schedule: RwLock::new(Some(schedule)),
            should_fail: false,
        }
    }

    /// Store whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn load(&self) -> Result<Option<ForkSchedule>, ForkScheduleError> {
        if self.should_fail {
            return Err(ForkScheduleError::Store("Mock failure".to_string()));
        }
        Ok(self.schedule.read().clone())
    }

    fn store(&self, schedule: &ForkSchedule) -> Result<(), ForkScheduleError> {
        if self.should_fail {
            return Err(ForkScheduleError::Store("Mock failure".to_string()));
        }
        *self.schedule.write() = Some(schedule.clone());
        Ok(())
    }
}
