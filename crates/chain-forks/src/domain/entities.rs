//! # Domain Entities
//!
//! The fork schedule of one chain and its building blocks.
//!
//! A `ForkSchedule` is built once (from a built-in table or a user override)
//! and never edited afterwards. Replacing it means producing a new value.

use primitive_types::{H256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::errors::BlockHeight;
use super::invariants::{is_forked, same_activation};
use super::upgrades::Upgrade;

/// Activation height of a single upgrade.
///
/// `height = None` means the upgrade is not scheduled on this chain; it is
/// never the same thing as height 0 (active from genesis).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActivationPoint {
    /// Which upgrade.
    pub upgrade: Upgrade,
    /// Activation height, if scheduled.
    pub height: Option<BlockHeight>,
}

impl ActivationPoint {
    /// Upgrade name as used in configuration.
    pub fn name(&self) -> &'static str {
        self.upgrade.config_key()
    }

    /// Whether later upgrades may be scheduled while this one is not.
    pub fn optional_gap_allowed(&self) -> bool {
        self.upgrade.is_optional()
    }

    /// Whether the upgrade is scheduled at all.
    pub fn is_scheduled(&self) -> bool {
        self.height.is_some()
    }

    /// Whether the upgrade's own height has been reached at `head`.
    pub fn is_active_at(&self, head: BlockHeight) -> bool {
        is_forked(self.height, head)
    }

    /// Whether both points schedule the upgrade at exactly the same height.
    pub fn same_height(&self, other: &ActivationPoint) -> bool {
        same_activation(self.height, other.height)
    }
}

/// Proof-of-authority (clique) parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqueConfig {
    /// Number of seconds between blocks to enforce.
    pub period: u64,
    /// Epoch length to reset votes and checkpoint.
    pub epoch: u64,
}

/// Consensus engine sealing the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConsensusEngine {
    /// Proof-of-work, ethash.
    Ethash,
    /// Proof-of-work, frkhash.
    Frkhash,
    /// Proof-of-authority.
    Clique(CliqueConfig),
    /// No engine configured.
    #[default]
    None,
}

impl fmt::Display for ConsensusEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusEngine::Ethash => f.write_str("ethash"),
            ConsensusEngine::Frkhash => f.write_str("frkhash"),
            ConsensusEngine::Clique(_) => f.write_str("clique"),
            ConsensusEngine::None => f.write_str("unknown"),
        }
    }
}

/// The ordered upgrade history of one chain.
///
/// Safe to share between threads; every query takes `&self`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForkSchedule {
    chain_id: Option<U256>,
    activations: [Option<BlockHeight>; Upgrade::COUNT],
    dao_fork_support: bool,
    eip150_hash: Option<H256>,
    engine: ConsensusEngine,
}

impl ForkSchedule {
    /// Start building a schedule for the given chain.
    pub fn builder(chain_id: impl Into<U256>) -> ForkScheduleBuilder {
        ForkScheduleBuilder {
            inner: ForkSchedule {
                chain_id: Some(chain_id.into()),
                ..ForkSchedule::unscheduled()
            },
        }
    }

    /// A schedule with nothing activated and no chain id.
    pub fn unscheduled() -> Self {
        Self {
            chain_id: None,
            activations: [None; Upgrade::COUNT],
            dao_fork_support: false,
            eip150_hash: None,
            engine: ConsensusEngine::None,
        }
    }

    /// Chain identifier, if configured.
    pub fn chain_id(&self) -> Option<U256> {
        self.chain_id
    }

    /// Activation height of `upgrade`.
    pub fn activation(&self, upgrade: Upgrade) -> Option<BlockHeight> {
        self.activations[upgrade.index()]
    }

    /// Activation point of `upgrade`.
    pub fn point(&self, upgrade: Upgrade) -> ActivationPoint {
        ActivationPoint {
            upgrade,
            height: self.activation(upgrade),
        }
    }

    /// All activation points, in protocol order.
    pub fn points(&self) -> impl Iterator<Item = ActivationPoint> + '_ {
        Upgrade::ALL.into_iter().map(move |upgrade| self.point(upgrade))
    }

    /// Whether the node sides with the DAO hard fork.
    pub fn dao_fork_support(&self) -> bool {
        self.dao_fork_support
    }

    /// EIP150 header anchor for header-only clients.
    pub fn eip150_hash(&self) -> Option<H256> {
        self.eip150_hash
    }

    /// Consensus engine.
    pub fn engine(&self) -> ConsensusEngine {
        self.engine
    }

    /// Distinct configured heights across the schedule.
    pub fn distinct_heights(&self) -> usize {
        let mut heights: Vec<BlockHeight> = self.activations.iter().flatten().copied().collect();
        heights.sort_unstable();
        heights.dedup();
        heights.len()
    }

    /// A copy of this schedule with one upgrade rescheduled.
    pub fn with_activation(&self, upgrade: Upgrade, height: Option<BlockHeight>) -> Self {
        let mut next = self.clone();
        next.activations[upgrade.index()] = height;
        next
    }

    /// A copy of this schedule with a different chain id.
    pub fn with_chain_id(&self, chain_id: Option<U256>) -> Self {
        Self {
            chain_id,
            ..self.clone()
        }
    }

    /// A copy of this schedule with a different DAO support flag.
    pub fn with_dao_fork_support(&self, support: bool) -> Self {
        Self {
            dao_fork_support: support,
            ..self.clone()
        }
    }
}

impl Default for ForkSchedule {
    fn default() -> Self {
        Self::unscheduled()
    }
}

impl fmt::Display for ForkSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ChainID: ")?;
        match self.chain_id {
            Some(id) => write!(f, "{}", id)?,
            None => f.write_str("nil")?,
        }
        for point in self.points() {
            write!(f, " {}: ", point.upgrade)?;
            match point.height {
                Some(height) => write!(f, "{}", height)?,
                None => f.write_str("nil")?,
            }
            if point.upgrade == Upgrade::DaoFork {
                write!(f, " DAOSupport: {}", self.dao_fork_support)?;
            }
        }
        write!(f, " Engine: {}}}", self.engine)
    }
}

/// Builder for [`ForkSchedule`].
#[derive(Clone, Debug)]
pub struct ForkScheduleBuilder {
    inner: ForkSchedule,
}

impl ForkScheduleBuilder {
    /// Schedule `upgrade` at `height`.
    pub fn activate(mut self, upgrade: Upgrade, height: BlockHeight) -> Self {
        self.inner.activations[upgrade.index()] = Some(height);
        self
    }

    /// Schedule every upgrade in `upgrades` at `height`.
    pub fn activate_all(mut self, upgrades: &[Upgrade], height: BlockHeight) -> Self {
        for upgrade in upgrades {
            self.inner.activations[upgrade.index()] = Some(height);
        }
        self
    }

    /// Set the DAO hard-fork support flag.
    pub fn dao_fork_support(mut self, support: bool) -> Self {
        self.inner.dao_fork_support = support;
        self
    }

    /// Set the EIP150 anchor hash.
    pub fn eip150_hash(mut self, hash: H256) -> Self {
        self.inner.eip150_hash = Some(hash);
        self
    }

    /// Set the consensus engine.
    pub fn engine(mut self, engine: ConsensusEngine) -> Self {
        self.inner.engine = engine;
        self
    }

    /// Finish the schedule.
    pub fn build(self) -> ForkSchedule {
        self.inner
    }
}

// =============================================================================
// JSON representation
// =============================================================================

/// Empty engine marker object (`"ethash": {}`).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct EngineMarker {}

/// Chain config as it appears on disk.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRepr {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "chain_id_serde")]
    chain_id: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    homestead_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dao_fork_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    dao_fork_support: bool,
    #[serde(default, rename = "eip150Block", skip_serializing_if = "Option::is_none")]
    eip150_block: Option<BlockHeight>,
    #[serde(default, rename = "eip150Hash", skip_serializing_if = "Option::is_none")]
    eip150_hash: Option<H256>,
    #[serde(default, rename = "eip155Block", skip_serializing_if = "Option::is_none")]
    eip155_block: Option<BlockHeight>,
    #[serde(default, rename = "eip158Block", skip_serializing_if = "Option::is_none")]
    eip158_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    byzantium_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    constantinople_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    petersburg_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    istanbul_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    muir_glacier_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    berlin_block: Option<BlockHeight>,
    #[serde(default, rename = "yoloV3Block", skip_serializing_if = "Option::is_none")]
    yolo_v3_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ewasm_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    catalyst_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phoenix_block: Option<BlockHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ethash: Option<EngineMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frkhash: Option<EngineMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    clique: Option<CliqueConfig>,
}

impl ScheduleRepr {
    fn slot(&mut self, upgrade: Upgrade) -> &mut Option<BlockHeight> {
        match upgrade {
            Upgrade::Homestead => &mut self.homestead_block,
            Upgrade::DaoFork => &mut self.dao_fork_block,
            Upgrade::Eip150 => &mut self.eip150_block,
            Upgrade::Eip155 => &mut self.eip155_block,
            Upgrade::Eip158 => &mut self.eip158_block,
            Upgrade::Byzantium => &mut self.byzantium_block,
            Upgrade::Constantinople => &mut self.constantinople_block,
            Upgrade::Petersburg => &mut self.petersburg_block,
            Upgrade::Istanbul => &mut self.istanbul_block,
            Upgrade::MuirGlacier => &mut self.muir_glacier_block,
            Upgrade::Berlin => &mut self.berlin_block,
            Upgrade::Phoenix => &mut self.phoenix_block,
            Upgrade::YoloV3 => &mut self.yolo_v3_block,
            Upgrade::Ewasm => &mut self.ewasm_block,
            Upgrade::Catalyst => &mut self.catalyst_block,
        }
    }
}

impl From<ScheduleRepr> for ForkSchedule {
    fn from(mut repr: ScheduleRepr) -> Self {
        let mut activations = [None; Upgrade::COUNT];
        for upgrade in Upgrade::ALL {
            activations[upgrade.index()] = *repr.slot(upgrade);
        }
        // First engine wins, same precedence the summary line uses.
        let engine = if repr.ethash.is_some() {
            ConsensusEngine::Ethash
        } else if repr.frkhash.is_some() {
            ConsensusEngine::Frkhash
        } else if let Some(clique) = repr.clique {
            ConsensusEngine::Clique(clique)
        } else {
            ConsensusEngine::None
        };
        Self {
            chain_id: repr.chain_id,
            activations,
            dao_fork_support: repr.dao_fork_support,
            eip150_hash: repr.eip150_hash,
            engine,
        }
    }
}

impl From<&ForkSchedule> for ScheduleRepr {
    fn from(schedule: &ForkSchedule) -> Self {
        let mut repr = ScheduleRepr {
            chain_id: schedule.chain_id,
            dao_fork_support: schedule.dao_fork_support,
            eip150_hash: schedule.eip150_hash,
            ..Default::default()
        };
        for point in schedule.points() {
            *repr.slot(point.upgrade) = point.height;
        }
        match schedule.engine {
            ConsensusEngine::Ethash => repr.ethash = Some(EngineMarker {}),
            ConsensusEngine::Frkhash => repr.frkhash = Some(EngineMarker {}),
            ConsensusEngine::Clique(clique) => repr.clique = Some(clique),
            ConsensusEngine::None => {}
        }
        repr
    }
}

impl Serialize for ForkSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ScheduleRepr::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ForkSchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ScheduleRepr::deserialize(deserializer).map(ForkSchedule::from)
    }
}

/// Chain ids are arbitrary precision: accept a JSON number of any size, a
/// decimal string or a `0x` hex string; write a number whenever it fits in u64.
mod chain_id_serde {
    use primitive_types::U256;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) if id.bits() <= 64 => serializer.serialize_u64(id.low_u64()),
            Some(id) => serializer.serialize_str(&format!("{:#x}", id)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        // Numbers keep their digits: serde_json is built with `arbitrary_precision`.
        let text = match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "invalid chain id {}: expected number or string",
                    other
                )))
            }
        };
        parse(text.trim())
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid chain id {:?}: {}", text, e)))
    }

    fn parse(text: &str) -> Result<U256, String> {
        if text.is_empty() {
            return Err("empty".into());
        }
        match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("{:?}", e)),
            None => U256::from_dec_str(text).map_err(|e| format!("{:?}", e)),
        }
    }
}
