//! # Fork Configuration
//!
//! Where a node's fork schedule comes from: a built-in network, a schedule
//! file supplied by the operator, or the genesis hash of the local database.

use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{ForkSchedule, TrustedCheckpoint};
use crate::networks::{test_chain_config, Network, NetworkTable, UnknownNetwork};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("Failed to read {path:?}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid JSON for its type.
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Network name did not match a built-in network.
    #[error(transparent)]
    UnknownNetwork(#[from] UnknownNetwork),

    /// Nothing configured and the genesis hash is not a known network.
    #[error("No fork schedule known for genesis {0:?}")]
    UnknownGenesis(H256),
}

/// Fork schedule configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForkConfig {
    /// Built-in network to run.
    pub network: Option<Network>,

    /// Operator-supplied schedule; replaces the built-in one.
    pub schedule_override: Option<ForkSchedule>,

    /// Operator-supplied light-client checkpoint.
    pub checkpoint_override: Option<TrustedCheckpoint>,

    /// Reject misordered schedules at startup.
    pub enforce_fork_ordering: bool,

    /// Tighter cap on compatibility rounds. The schedule-derived cap always applies.
    pub max_rewind_rounds: Option<usize>,
}

impl Default for ForkConfig {
    fn default() -> Self {
        Self {
            network: None,
            schedule_override: None,
            checkpoint_override: None,
            enforce_fork_ordering: true,
            max_rewind_rounds: None,
        }
    }
}

impl ForkConfig {
    /// Create a config for testing (fixed dev schedule).
    pub fn for_testing() -> Self {
        Self {
            schedule_override: Some(test_chain_config()),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// - `FORK_NETWORK`: built-in network name
    /// - `FORK_SCHEDULE_FILE`: path to a JSON schedule
    /// - `FORK_ENFORCE_ORDERING`: `false`/`0` disables ordering checks
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`ForkConfig::from_env`] over an arbitrary variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let network = lookup("FORK_NETWORK")
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.parse::<Network>())
            .transpose()?;

        let schedule_override = lookup("FORK_SCHEDULE_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(|path| load_schedule(Path::new(&path)))
            .transpose()?;

        let enforce_fork_ordering = lookup("FORK_ENFORCE_ORDERING")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            network,
            schedule_override,
            enforce_fork_ordering,
            ..Self::default()
        })
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// The schedule this node should run.
    ///
    /// Override first, then the configured network, then whatever network
    /// the genesis hash belongs to.
    pub fn resolve_schedule(
        &self,
        table: &NetworkTable,
        genesis: &H256,
    ) -> Result<ForkSchedule, ConfigError> {
        if let Some(schedule) = &self.schedule_override {
            return Ok(schedule.clone());
        }
        if let Some(network) = self.network {
            return Ok(network.schedule());
        }
        table
            .schedule(genesis)
            .ok_or(ConfigError::UnknownGenesis(*genesis))
    }

    /// The light-client checkpoint, resolved in the same order as the schedule.
    pub fn resolve_checkpoint(&self, table: &NetworkTable, genesis: &H256) -> Option<TrustedCheckpoint> {
        if let Some(checkpoint) = self.checkpoint_override {
            return Some(checkpoint);
        }
        match self.network {
            Some(network) => network.checkpoint(),
            None => table.checkpoint(genesis),
        }
    }
}

/// Read a JSON fork schedule from disk.
pub fn load_schedule(path: &Path) -> Result<ForkSchedule, ConfigError> {
    Ok(serde_json::from_str(&read(path)?)?)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
