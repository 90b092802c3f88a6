//! # Upgrade Catalogue
//!
//! The closed set of protocol upgrades a schedule can activate, in the fixed
//! order the protocol defines them. Everything the algorithms need to know
//! about an upgrade (config key, error label, ordering role, derivation rule)
//! is answered from this table.

use serde::Serialize;
use std::fmt;

/// A named, height-gated protocol upgrade.
///
/// Declaration order is the protocol order and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Upgrade {
    /// Homestead switch.
    Homestead,
    /// TheDAO hard-fork switch.
    DaoFork,
    /// EIP150 gas repricing.
    Eip150,
    /// EIP155 replay protection.
    Eip155,
    /// EIP158 state clearing.
    Eip158,
    /// Byzantium switch.
    Byzantium,
    /// Constantinople switch.
    Constantinople,
    /// Petersburg switch (Constantinople without EIP1283).
    Petersburg,
    /// Istanbul switch.
    Istanbul,
    /// EIP2384 difficulty bomb delay.
    MuirGlacier,
    /// Berlin switch.
    Berlin,
    /// Phoenix switch (XIP5).
    Phoenix,
    /// YOLOv3 gas repricings (Berlin test network).
    YoloV3,
    /// EWASM switch.
    Ewasm,
    /// Catalyst switch.
    Catalyst,
}

/// How an upgrade's "is active" predicate is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derivation {
    /// Active iff its own height is reached.
    Direct,
    /// Also active whenever the given later upgrade is active.
    ImpliedBy(Upgrade),
    /// When its own height is unset, inherits the given earlier upgrade's state.
    DefaultsTo(Upgrade),
}

impl Upgrade {
    /// Number of known upgrades.
    pub const COUNT: usize = 15;

    /// Every upgrade in protocol order.
    pub const ALL: [Upgrade; Upgrade::COUNT] = [
        Upgrade::Homestead,
        Upgrade::DaoFork,
        Upgrade::Eip150,
        Upgrade::Eip155,
        Upgrade::Eip158,
        Upgrade::Byzantium,
        Upgrade::Constantinople,
        Upgrade::Petersburg,
        Upgrade::Istanbul,
        Upgrade::MuirGlacier,
        Upgrade::Berlin,
        Upgrade::Phoenix,
        Upgrade::YoloV3,
        Upgrade::Ewasm,
        Upgrade::Catalyst,
    ];

    /// Position in the fixed protocol order.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Configuration key, as found in JSON chain configs.
    pub const fn config_key(self) -> &'static str {
        match self {
            Upgrade::Homestead => "homesteadBlock",
            Upgrade::DaoFork => "daoForkBlock",
            Upgrade::Eip150 => "eip150Block",
            Upgrade::Eip155 => "eip155Block",
            Upgrade::Eip158 => "eip158Block",
            Upgrade::Byzantium => "byzantiumBlock",
            Upgrade::Constantinople => "constantinopleBlock",
            Upgrade::Petersburg => "petersburgBlock",
            Upgrade::Istanbul => "istanbulBlock",
            Upgrade::MuirGlacier => "muirGlacierBlock",
            Upgrade::Berlin => "berlinBlock",
            Upgrade::Phoenix => "phoenixBlock",
            Upgrade::YoloV3 => "yoloV3Block",
            Upgrade::Ewasm => "ewasmBlock",
            Upgrade::Catalyst => "catalystBlock",
        }
    }

    /// Label used when reporting a database mismatch.
    pub const fn label(self) -> &'static str {
        match self {
            Upgrade::Homestead => "Homestead fork block",
            Upgrade::DaoFork => "DAO fork block",
            Upgrade::Eip150 => "EIP150 fork block",
            Upgrade::Eip155 => "EIP155 fork block",
            Upgrade::Eip158 => "EIP158 fork block",
            Upgrade::Byzantium => "Byzantium fork block",
            Upgrade::Constantinople => "Constantinople fork block",
            Upgrade::Petersburg => "Petersburg fork block",
            Upgrade::Istanbul => "Istanbul fork block",
            Upgrade::MuirGlacier => "Muir Glacier fork block",
            Upgrade::Berlin => "Berlin fork block",
            Upgrade::Phoenix => "Phoenix fork block",
            Upgrade::YoloV3 => "YOLOv3 fork block",
            Upgrade::Ewasm => "ewasm fork block",
            Upgrade::Catalyst => "Catalyst fork block",
        }
    }

    /// Short human name.
    pub const fn name(self) -> &'static str {
        match self {
            Upgrade::Homestead => "Homestead",
            Upgrade::DaoFork => "DAO",
            Upgrade::Eip150 => "EIP150",
            Upgrade::Eip155 => "EIP155",
            Upgrade::Eip158 => "EIP158",
            Upgrade::Byzantium => "Byzantium",
            Upgrade::Constantinople => "Constantinople",
            Upgrade::Petersburg => "Petersburg",
            Upgrade::Istanbul => "Istanbul",
            Upgrade::MuirGlacier => "Muir Glacier",
            Upgrade::Berlin => "Berlin",
            Upgrade::Phoenix => "Phoenix",
            Upgrade::YoloV3 => "YOLO v3",
            Upgrade::Ewasm => "EWASM",
            Upgrade::Catalyst => "Catalyst",
        }
    }

    /// Optional upgrades may stay unscheduled without blocking later ones.
    pub const fn is_optional(self) -> bool {
        matches!(self, Upgrade::DaoFork | Upgrade::MuirGlacier)
    }

    /// Whether the upgrade takes part in fork ordering validation.
    ///
    /// Experimental upgrades are scheduled independently of the mainline.
    pub const fn is_ordered(self) -> bool {
        !matches!(self, Upgrade::YoloV3 | Upgrade::Ewasm | Upgrade::Catalyst)
    }

    /// Derivation rule used for rule snapshots and compatibility fallback.
    pub const fn derivation(self) -> Derivation {
        match self {
            Upgrade::Petersburg => Derivation::DefaultsTo(Upgrade::Constantinople),
            Upgrade::Berlin => Derivation::ImpliedBy(Upgrade::YoloV3),
            _ => Derivation::Direct,
        }
    }

    /// Upgrades checked by the ordering validator, in protocol order.
    pub fn ordered() -> impl Iterator<Item = Upgrade> {
        Self::ALL.into_iter().filter(|upgrade| upgrade.is_ordered())
    }
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
