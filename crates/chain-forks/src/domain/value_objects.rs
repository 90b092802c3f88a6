//! # Domain Value Objects
//!
//! Immutable values derived from, or kept next to, a fork schedule.

use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use super::errors::BlockHeight;

/// Which upgrades are in force at one height.
///
/// One-time value, not `Clone`: derive a fresh snapshot for every block
/// instead of carrying one across a height transition.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    /// Height the snapshot was derived for.
    pub height: BlockHeight,
    /// Chain identifier, zero when unset.
    pub chain_id: U256,
    /// Homestead active.
    pub is_homestead: bool,
    /// DAO fork active.
    pub is_dao_fork: bool,
    /// EIP150 active.
    pub is_eip150: bool,
    /// EIP155 active.
    pub is_eip155: bool,
    /// EIP158 active.
    pub is_eip158: bool,
    /// Byzantium active.
    pub is_byzantium: bool,
    /// Constantinople active.
    pub is_constantinople: bool,
    /// Also true while unset once Constantinople is active.
    pub is_petersburg: bool,
    /// Istanbul active.
    pub is_istanbul: bool,
    /// Muir Glacier active.
    pub is_muir_glacier: bool,
    /// Also true once YOLOv3 is active.
    pub is_berlin: bool,
    /// Phoenix active.
    pub is_phoenix: bool,
    /// YOLOv3 active.
    pub is_yolo_v3: bool,
    /// EWASM active.
    pub is_ewasm: bool,
    /// Catalyst active.
    pub is_catalyst: bool,
}

/// Post-processed trie roots (CHT and BloomTrie) for one section.
///
/// Lets a light client start syncing from this point instead of
/// downloading the whole header chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedCheckpoint {
    /// Section index.
    pub section_index: u64,
    /// Head hash of the section.
    pub section_head: H256,
    /// Canonical hash trie root.
    pub cht_root: H256,
    /// Bloom trie root.
    pub bloom_root: H256,
}

impl TrustedCheckpoint {
    /// Keccak256 over index (8 bytes, big endian), head, CHT root, bloom root.
    pub fn hash(&self) -> H256 {
        let mut hasher = Keccak256::new();
        hasher.update(self.section_index.to_be_bytes());
        hasher.update(self.section_head.as_bytes());
        hasher.update(self.cht_root.as_bytes());
        hasher.update(self.bloom_root.as_bytes());
        H256::from_slice(&hasher.finalize())
    }

    /// Empty if any of the three roots is unset.
    pub fn is_empty(&self) -> bool {
        self.section_head.is_zero() || self.cht_root.is_zero() || self.bloom_root.is_zero()
    }

    /// Compare against a checkpoint hash; an empty checkpoint only matches zero.
    pub fn hash_equal(&self, hash: &H256) -> bool {
        if self.is_empty() {
            return hash.is_zero();
        }
        self.hash() == *hash
    }
}

/// Checkpoint oracle contract used for light client checkpoint syncing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointOracleConfig {
    /// Oracle contract address.
    pub address: H160,
    /// Addresses allowed to sign checkpoints.
    pub signers: Vec<H160>,
    /// Signatures required to accept a checkpoint.
    pub threshold: u64,
}

impl CheckpointOracleConfig {
    /// Whether the threshold can be met by the configured signers.
    pub fn is_satisfiable(&self) -> bool {
        self.threshold > 0 && self.threshold as usize <= self.signers.len()
    }
}
