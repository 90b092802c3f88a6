//! # Fork Schedule Service
//!
//! Startup orchestration: pick the schedule, vet it against what the node
//! already committed to, then hand it to concurrent readers.

use primitive_types::H256;
use std::sync::Arc;
use tracing::{info, warn};

use crate::algorithms::{check_compatible_bounded, rewind_round_limit, validate_fork_order};
use crate::config::ForkConfig;
use crate::domain::{BlockHeight, ForkSchedule, ForkScheduleError, Rules, Upgrade};
use crate::networks::NetworkTable;
use crate::ports::{RuleQuery, ScheduleStore};

/// What `initialize` did with the candidate schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Nothing was stored; the candidate was accepted as is.
    Fresh,
    /// The stored schedule equals the candidate.
    Unchanged,
    /// The candidate differs only above the head and replaced the stored one.
    Upgraded,
}

/// Fork Schedule Service - owns the schedule a node runs with.
pub struct ForkScheduleService<S: ScheduleStore> {
    /// Configuration.
    config: ForkConfig,
    /// Where the accepted schedule is persisted.
    store: S,
    /// Installed schedule, shared with readers.
    active: Arc<ForkSchedule>,
    /// Set once a schedule has been accepted.
    initialized: bool,
}

impl<S: ScheduleStore> ForkScheduleService<S> {
    /// Create a service. Nothing is active until [`Self::initialize`] succeeds.
    pub fn new(config: ForkConfig, store: S) -> Self {
        Self {
            config,
            store,
            active: Arc::new(ForkSchedule::unscheduled()),
            initialized: false,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ForkConfig {
        &self.config
    }

    /// Whether a schedule has been accepted.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Installed schedule. Cheap to clone and hand to worker threads.
    pub fn schedule(&self) -> Arc<ForkSchedule> {
        Arc::clone(&self.active)
    }

    /// Vet `candidate` against the stored schedule at `head` and install it.
    ///
    /// Never rewinds anything itself: a [`ForkScheduleError::Compat`] tells
    /// the caller how far back local history must go before retrying.
    pub fn initialize(
        &mut self,
        candidate: ForkSchedule,
        head: BlockHeight,
    ) -> Result<SetupOutcome, ForkScheduleError> {
        if self.config.enforce_fork_ordering {
            if let Err(err) = validate_fork_order(&candidate) {
                warn!(upgrade = %err.offending(), error = %err, "Rejected misordered fork schedule");
                return Err(err.into());
            }
        }

        let outcome = match self.store.load()? {
            None => SetupOutcome::Fresh,
            Some(stored) => {
                let natural = rewind_round_limit(&stored, &candidate);
                let rounds = self.config.max_rewind_rounds.map_or(natural, |cap| cap.min(natural));

                if let Err(err) = check_compatible_bounded(&stored, &candidate, head, rounds) {
                    warn!(
                        height = head,
                        what = err.what,
                        rewind_to = err.rewind_to,
                        "Fork schedule incompatible with stored chain"
                    );
                    return Err(err.into());
                }

                if stored == candidate {
                    SetupOutcome::Unchanged
                } else {
                    SetupOutcome::Upgraded
                }
            }
        };

        if outcome != SetupOutcome::Unchanged {
            self.store.store(&candidate)?;
        }

        info!(
            chain_id = ?candidate.chain_id(),
            height = head,
            outcome = ?outcome,
            engine = %candidate.engine(),
            "Fork schedule accepted"
        );

        self.active = Arc::new(candidate);
        self.initialized = true;
        Ok(outcome)
    }

    /// Resolve the candidate from configuration, then [`Self::initialize`].
    pub fn initialize_from_config(
        &mut self,
        table: &NetworkTable,
        genesis: &H256,
        head: BlockHeight,
    ) -> Result<SetupOutcome, ForkScheduleError> {
        let candidate = self
            .config
            .resolve_schedule(table, genesis)
            .map_err(|e| ForkScheduleError::Unconfigured(e.to_string()))?;
        self.initialize(candidate, head)
    }
}

impl<S: ScheduleStore> RuleQuery for ForkScheduleService<S> {
    fn is_active(&self, upgrade: Upgrade, height: BlockHeight) -> bool {
        self.active.is_active(upgrade, height)
    }

    fn rules(&self, height: BlockHeight) -> Rules {
        self.active.rules(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CompatError;
    use crate::networks::{test_chain_config, Network};
    use crate::ports::InMemoryScheduleStore;

    fn service(store: InMemoryScheduleStore) -> ForkScheduleService<InMemoryScheduleStore> {
        ForkScheduleService::new(ForkConfig::for_testing(), store)
    }

    #[test]
    fn test_nothing_active_before_initialize() {
        let service = service(InMemoryScheduleStore::new());
        assert!(!service.is_initialized());
        assert!(!service.is_homestead(u64::MAX));
    }

    #[test]
    fn test_fresh_database() {
        let mut service = service(InMemoryScheduleStore::new());
        let outcome = service.initialize(Network::Mainnet.schedule(), 0).unwrap();
        assert_eq!(outcome, SetupOutcome::Fresh);
        assert!(service.is_initialized());
        assert!(service.is_byzantium(800_000));
        assert_eq!(service.store.load().unwrap(), Some(Network::Mainnet.schedule()));
    }

    #[test]
    fn test_restart_with_same_schedule() {
        let store = InMemoryScheduleStore::with_schedule(Network::Mainnet.schedule());
        let mut service = service(store);
        let outcome = service.initialize(Network::Mainnet.schedule(), 5_000_000).unwrap();
        assert_eq!(outcome, SetupOutcome::Unchanged);
    }

    #[test]
    fn test_future_upgrade_accepted() {
        let store = InMemoryScheduleStore::with_schedule(Network::Mainnet.schedule());
        let mut service = service(store);
        let candidate = Network::Mainnet
            .schedule()
            .with_activation(Upgrade::Phoenix, Some(13_000_000));
        let outcome = service.initialize(candidate.clone(), 12_500_000).unwrap();
        assert_eq!(outcome, SetupOutcome::Upgraded);
        assert_eq!(*service.schedule(), candidate);
        assert_eq!(service.store.load().unwrap(), Some(candidate));
    }

    #[test]
    fn test_incompatible_candidate_rejected() {
        let store = InMemoryScheduleStore::with_schedule(Network::Mainnet.schedule());
        let mut service = service(store);
        let candidate = Network::Mainnet
            .schedule()
            .with_activation(Upgrade::Byzantium, Some(900_000));
        let err = service.initialize(candidate, 850_000).unwrap_err();
        match err {
            ForkScheduleError::Compat(CompatError { rewind_to, .. }) => {
                assert_eq!(rewind_to, 799_999)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!service.is_initialized());
        assert_eq!(
            service.store.load().unwrap(),
            Some(Network::Mainnet.schedule())
        );
    }

    #[test]
    fn test_misordered_candidate_rejected() {
        let mut service = service(InMemoryScheduleStore::new());
        let candidate = test_chain_config().with_activation(Upgrade::Homestead, Some(10));
        let err = service.initialize(candidate, 0).unwrap_err();
        assert!(matches!(err, ForkScheduleError::Ordering(_)));
    }

    #[test]
    fn test_ordering_check_can_be_disabled() {
        let config = ForkConfig {
            enforce_fork_ordering: false,
            ..ForkConfig::for_testing()
        };
        let mut service = ForkScheduleService::new(config, InMemoryScheduleStore::new());
        let candidate = test_chain_config().with_activation(Upgrade::Homestead, Some(10));
        assert!(service.initialize(candidate, 0).is_ok());
    }

    #[test]
    fn test_store_failure_propagates() {
        let mut service = service(InMemoryScheduleStore::failing());
        let err = service.initialize(test_chain_config(), 0).unwrap_err();
        assert!(matches!(err, ForkScheduleError::Store(_)));
    }

    #[test]
    fn test_initialize_from_config() {
        let mut service = service(InMemoryScheduleStore::new());
        let outcome = service
            .initialize_from_config(&NetworkTable::builtin(), &H256::zero(), 0)
            .unwrap();
        assert_eq!(outcome, SetupOutcome::Fresh);
        assert_eq!(*service.schedule(), test_chain_config());
    }

    #[test]
    fn test_initialize_from_config_unknown_genesis() {
        let mut service =
            ForkScheduleService::new(ForkConfig::default(), InMemoryScheduleStore::new());
        let err = service
            .initialize_from_config(&NetworkTable::builtin(), &H256::zero(), 0)
            .unwrap_err();
        assert!(matches!(err, ForkScheduleError::Unconfigured(_)));
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let mut service = service(InMemoryScheduleStore::new());
        service.initialize(Network::Mainnet.schedule(), 0).unwrap();
        let reader = service.schedule();
        let upgraded = Network::Mainnet
            .schedule()
            .with_activation(Upgrade::Phoenix, Some(20_000_000));
        service.initialize(upgraded.clone(), 100).unwrap();
        assert_eq!(*reader, Network::Mainnet.schedule());
        assert_eq!(*service.schedule(), upgraded);
    }
}
