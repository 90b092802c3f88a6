//! # Built-in Networks
//!
//! Fork schedules, genesis hashes and light-client checkpoints of the known
//! networks, plus developer presets.
//!
//! Every table is built on demand as a plain value. Nothing here is global
//! or mutable; callers pass a [`NetworkTable`] to whoever needs lookups.

use hex_literal::hex;
use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{
    CheckpointOracleConfig, CliqueConfig, ConsensusEngine, ForkSchedule, TrustedCheckpoint,
    Upgrade,
};

/// Upgrades up to and including Petersburg, always activated together by presets.
const THROUGH_PETERSBURG: [Upgrade; 7] = [
    Upgrade::Homestead,
    Upgrade::Eip150,
    Upgrade::Eip155,
    Upgrade::Eip158,
    Upgrade::Byzantium,
    Upgrade::Constantinople,
    Upgrade::Petersburg,
];

/// Named network is not one of the built-ins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

/// A network with a built-in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Main network.
    Mainnet,
    /// Main network relaunched on frkhash.
    Rebirth,
    /// Proof-of-work test network.
    Ropsten,
    /// Clique test network.
    Rinkeby,
    /// Cross-client clique test network.
    Goerli,
    /// YOLOv3 ephemeral test network.
    YoloV3,
}

impl Network {
    /// Every built-in network.
    pub const ALL: [Network; 6] = [
        Network::Mainnet,
        Network::Rebirth,
        Network::Ropsten,
        Network::Rinkeby,
        Network::Goerli,
        Network::YoloV3,
    ];

    /// Lowercase name used on the command line and in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Rebirth => "rebirth",
            Network::Ropsten => "ropsten",
            Network::Rinkeby => "rinkeby",
            Network::Goerli => "goerli",
            Network::YoloV3 => "yolov3",
        }
    }

    /// Hash of the network's genesis block.
    pub fn genesis_hash(&self) -> H256 {
        H256(match self {
            Network::Mainnet => {
                hex!("2fe75cf9ba10cb1105e1750d872911e75365ba24fdd5db7f099445c901fea895")
            }
            Network::Rebirth => {
                hex!("18304eb73883a903b4878370d9326515dd976ac27d45febc7db539184ab898fc")
            }
            Network::Ropsten => {
                hex!("41941023680923e0fe4d74a34bdac8141f2540e3ae90623718e47d66d1ca4a2d")
            }
            Network::Rinkeby => {
                hex!("6341fd3daf94b748c72ced5a5b26028f2474f5f00d824504e4fa37a75767e177")
            }
            Network::Goerli => {
                hex!("bf7e331f7f7c1dd2e05159666b3bf8bc7a8a3a9eb1d518969eab529dd9b88c1a")
            }
            Network::YoloV3 => {
                hex!("f1f2876e8500c77afcc03228757b39477eceffccf645b734967fe3c7e16967b7")
            }
        })
    }

    /// The network's fork schedule.
    pub fn schedule(&self) -> ForkSchedule {
        match self {
            Network::Mainnet => mainnet_schedule(),
            Network::Rebirth => rebirth_schedule(),
            Network::Ropsten => ropsten_schedule(),
            Network::Rinkeby => rinkeby_schedule(),
            Network::Goerli => goerli_schedule(),
            Network::YoloV3 => yolo_v3_schedule(),
        }
    }

    /// Light-client checkpoint, if the network publishes one.
    pub fn checkpoint(&self) -> Option<TrustedCheckpoint> {
        let checkpoint = match self {
            Network::Mainnet | Network::Rebirth => TrustedCheckpoint {
                section_index: 147,
                section_head: H256(hex!(
                    "63bf17b66ec581f4a048a62596c099e0c58040a6861e565a4fb54585c3c8c3de"
                )),
                cht_root: H256(hex!(
                    "10981e2a6949282381d7c91163aab801ca0411ddb3257726b990e68b75b70523"
                )),
                bloom_root: H256(hex!(
                    "2a608d377cd4b57b5c74a7c7a6a20a4062c86a807e2792b34ce4e597d1f53fac"
                )),
            },
            Network::Ropsten => TrustedCheckpoint {
                section_index: 279,
                section_head: H256(hex!(
                    "4a4912848d4c06090097073357c10015d11c6f4544a0f93cbdd584701c3b7d58"
                )),
                cht_root: H256(hex!(
                    "9053b7867ae921e80a4e2f5a4b15212e4af3d691ca712fb33dc150e9c6ea221c"
                )),
                bloom_root: H256(hex!(
                    "3dc04cb1be7ddc271f3f83469b47b76184a79d7209ef51d85b1539ea6d25a645"
                )),
            },
            Network::Rinkeby => TrustedCheckpoint {
                section_index: 254,
                section_head: H256(hex!(
                    "0cba01dd71baa22ac8fa0b105bc908e94f9ecfbc79b4eb97427fe07b5851dd10"
                )),
                cht_root: H256(hex!(
                    "5673d8fc49c9c7d8729068640e4b392d46952a5a38798973bac1cf1d0d27ad7d"
                )),
                bloom_root: H256(hex!(
                    "70e01232b66df9a7778ae3291c9217afb9a2d9f799f32d7b912bd37e7bce83a8"
                )),
            },
            Network::Goerli => TrustedCheckpoint {
                section_index: 138,
                section_head: H256(hex!(
                    "b7ea0566abd7d0def5b3c9afa3431debb7bb30b65af35f106ca93a59e6c859a7"
                )),
                cht_root: H256(hex!(
                    "378c7ea9081242beb982e2e39567ba12f2ed3e59e5aba3f9db1d595646d7c9f4"
                )),
                bloom_root: H256(hex!(
                    "523c169286cfca52e8a6579d8c35dc8bf093412d8a7478163bfa81ae91c2492d"
                )),
            },
            Network::YoloV3 => return None,
        };
        Some(checkpoint)
    }

    /// Checkpoint oracle contract, if the network runs one.
    pub fn oracle(&self) -> Option<CheckpointOracleConfig> {
        let (address, signers, threshold): (H160, Vec<H160>, u64) = match self {
            Network::Mainnet | Network::Rebirth => (
                H160(hex!("9a9070028361F7AAbeB3f2F2Dc07F82C4a98A02a")),
                vec![H160(hex!("bb94f0ceb32257275b2a7a9c094c13e469b4563e"))],
                1,
            ),
            Network::Ropsten => (
                H160(hex!("EF79475013f154E6A65b54cB2742867791bf0B84")),
                vec![
                    H160(hex!("32162F3581E88a5f62e8A61892B42C46E2c18f7b")),
                    H160(hex!("78d1aD571A1A09D60D9BBf25894b44e4C8859595")),
                    H160(hex!("286834935f4A8Cfb4FF4C77D5770C2775aE2b0E7")),
                    H160(hex!("b86e2B0Ab5A4B1373e40c51A7C712c70Ba2f9f8E")),
                    H160(hex!("0DF8fa387C602AE62559cC4aFa4972A7045d6707")),
                ],
                2,
            ),
            Network::Rinkeby => (
                H160(hex!("ebe8eFA441B9302A0d7eaECc277c09d20D684540")),
                vec![
                    H160(hex!("d9c9cd5f6779558b6e0ed4e6acf6b1947e7fa1f3")),
                    H160(hex!("78d1aD571A1A09D60D9BBf25894b44e4C8859595")),
                    H160(hex!("286834935f4A8Cfb4FF4C77D5770C2775aE2b0E7")),
                    H160(hex!("b86e2B0Ab5A4B1373e40c51A7C712c70Ba2f9f8E")),
                ],
                2,
            ),
            Network::Goerli => (
                H160(hex!("18CA0E045F0D772a851BC7e48357Bcaab0a0795D")),
                vec![
                    H160(hex!("4769bcaD07e3b938B7f43EB7D278Bc7Cb9efFb38")),
                    H160(hex!("78d1aD571A1A09D60D9BBf25894b44e4C8859595")),
                    H160(hex!("286834935f4A8Cfb4FF4C77D5770C2775aE2b0E7")),
                    H160(hex!("b86e2B0Ab5A4B1373e40c51A7C712c70Ba2f9f8E")),
                    H160(hex!("0DF8fa387C602AE62559cC4aFa4972A7045d6707")),
                ],
                2,
            ),
            Network::YoloV3 => return None,
        };
        Some(CheckpointOracleConfig {
            address,
            signers,
            threshold,
        })
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Network::ALL
            .into_iter()
            .find(|network| network.name() == wanted)
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}

// =============================================================================
// Schedules
// =============================================================================

fn mainnet_schedule() -> ForkSchedule {
    ForkSchedule::builder(2u64)
        .activate(Upgrade::Homestead, 200_000)
        .dao_fork_support(false)
        .activate_all(&[Upgrade::Eip150, Upgrade::Eip155, Upgrade::Eip158], 600_000)
        .eip150_hash(H256(hex!(
            "a08955de94391af647125c10858b7b352c83bf7708e66e3db05d59a763aae965"
        )))
        .activate(Upgrade::Byzantium, 800_000)
        .activate_all(&[Upgrade::Constantinople, Upgrade::Petersburg], 1_860_000)
        .activate(Upgrade::Istanbul, 3_050_000)
        .activate(Upgrade::Berlin, 12_244_000)
        .engine(ConsensusEngine::Ethash)
        .build()
}

fn rebirth_schedule() -> ForkSchedule {
    ForkSchedule::builder(2u64)
        .activate_all(&THROUGH_PETERSBURG, 0)
        .activate_all(&[Upgrade::Istanbul, Upgrade::Berlin, Upgrade::Phoenix], 0)
        .engine(ConsensusEngine::Frkhash)
        .build()
}

fn ropsten_schedule() -> ForkSchedule {
    ForkSchedule::builder(3u64)
        .activate(Upgrade::Homestead, 0)
        .dao_fork_support(true)
        .activate(Upgrade::Eip150, 0)
        .eip150_hash(H256(hex!(
            "41941023680923e0fe4d74a34bdac8141f2540e3ae90623718e47d66d1ca4a2d"
        )))
        .activate_all(&[Upgrade::Eip155, Upgrade::Eip158], 10)
        .activate(Upgrade::Byzantium, 1_700_000)
        .activate(Upgrade::Constantinople, 4_230_000)
        .activate(Upgrade::Petersburg, 4_939_394)
        .activate(Upgrade::Istanbul, 6_485_846)
        .activate(Upgrade::MuirGlacier, 7_117_117)
        .activate(Upgrade::Berlin, 9_812_189)
        .engine(ConsensusEngine::Ethash)
        .build()
}

fn rinkeby_schedule() -> ForkSchedule {
    ForkSchedule::builder(4u64)
        .activate(Upgrade::Homestead, 1)
        .dao_fork_support(true)
        .activate(Upgrade::Eip150, 2)
        .eip150_hash(H256(hex!(
            "9b095b36c15eaf13044373aef8ee0bd3a382a5abb92e402afa44b8249c3a90e9"
        )))
        .activate_all(&[Upgrade::Eip155, Upgrade::Eip158], 3)
        .activate(Upgrade::Byzantium, 1_035_301)
        .activate(Upgrade::Constantinople, 3_660_663)
        .activate(Upgrade::Petersburg, 4_321_234)
        .activate(Upgrade::Istanbul, 5_435_345)
        .activate(Upgrade::Berlin, 8_290_928)
        .engine(ConsensusEngine::Clique(CliqueConfig {
            period: 15,
            epoch: 30_000,
        }))
        .build()
}

fn goerli_schedule() -> ForkSchedule {
    ForkSchedule::builder(5u64)
        .activate_all(&THROUGH_PETERSBURG, 0)
        .dao_fork_support(true)
        .activate(Upgrade::Istanbul, 1_561_651)
        .activate(Upgrade::Berlin, 4_460_644)
        .engine(ConsensusEngine::Clique(CliqueConfig {
            period: 15,
            epoch: 30_000,
        }))
        .build()
}

fn yolo_v3_schedule() -> ForkSchedule {
    ForkSchedule::builder(U256::from_big_endian(b"yolov3x"))
        .activate_all(&THROUGH_PETERSBURG, 0)
        .dao_fork_support(true)
        .activate_all(&[Upgrade::Istanbul, Upgrade::YoloV3], 0)
        .engine(ConsensusEngine::Clique(CliqueConfig {
            period: 15,
            epoch: 30_000,
        }))
        .build()
}

fn all_protocol_changes(chain_id: u64, engine: ConsensusEngine) -> ForkSchedule {
    ForkSchedule::builder(chain_id)
        .activate_all(&THROUGH_PETERSBURG, 0)
        .activate_all(
            &[
                Upgrade::Istanbul,
                Upgrade::MuirGlacier,
                Upgrade::Berlin,
                Upgrade::Phoenix,
            ],
            0,
        )
        .engine(engine)
        .build()
}

/// Every ordered upgrade at genesis, sealed by ethash. Development chain 1337.
pub fn all_ethash_protocol_changes() -> ForkSchedule {
    all_protocol_changes(1337, ConsensusEngine::Ethash)
}

/// Every ordered upgrade at genesis, sealed by frkhash. Development chain 1337.
pub fn all_frkhash_protocol_changes() -> ForkSchedule {
    all_protocol_changes(1337, ConsensusEngine::Frkhash)
}

/// Every ordered upgrade at genesis, sealed by clique with instant blocks.
pub fn all_clique_protocol_changes() -> ForkSchedule {
    all_protocol_changes(
        1337,
        ConsensusEngine::Clique(CliqueConfig {
            period: 0,
            epoch: 30_000,
        }),
    )
}

/// Schedule used by unit tests across the workspace. Chain 1, ethash.
pub fn test_chain_config() -> ForkSchedule {
    all_protocol_changes(1, ConsensusEngine::Ethash)
}

// =============================================================================
// Lookup by genesis
// =============================================================================

/// Built-in networks keyed by genesis hash.
#[derive(Clone, Debug)]
pub struct NetworkTable {
    by_genesis: HashMap<H256, Network>,
}

impl NetworkTable {
    /// Table of every built-in network.
    pub fn builtin() -> Self {
        Self::with_networks(Network::ALL)
    }

    /// Table restricted to the given networks.
    pub fn with_networks(networks: impl IntoIterator<Item = Network>) -> Self {
        Self {
            by_genesis: networks
                .into_iter()
                .map(|network| (network.genesis_hash(), network))
                .collect(),
        }
    }

    /// Network whose genesis block hashes to `genesis`.
    pub fn network(&self, genesis: &H256) -> Option<Network> {
        self.by_genesis.get(genesis).copied()
    }

    /// Fork schedule for a genesis hash.
    pub fn schedule(&self, genesis: &H256) -> Option<ForkSchedule> {
        self.network(genesis).map(|network| network.schedule())
    }

    /// Trusted checkpoint for a genesis hash.
    pub fn checkpoint(&self, genesis: &H256) -> Option<TrustedCheckpoint> {
        self.network(genesis).and_then(|network| network.checkpoint())
    }

    /// Checkpoint oracle for a genesis hash.
    pub fn oracle(&self, genesis: &H256) -> Option<CheckpointOracleConfig> {
        self.network(genesis).and_then(|network| network.oracle())
    }

    /// Number of networks in the table.
    pub fn len(&self) -> usize {
        self.by_genesis.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_genesis.is_empty()
    }
}

impl Default for NetworkTable {
    fn default() -> Self {
        Self::builtin()
    }
}
