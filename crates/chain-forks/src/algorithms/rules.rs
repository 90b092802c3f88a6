//! # Rule Derivation
//!
//! Answers "is upgrade X active at height H" and builds per-block [`Rules`].
//!
//! Most upgrades are active exactly when their own height is reached. The
//! exceptions live in [`Upgrade::derivation`] and are resolved here by a
//! bounded walk over that table.

use primitive_types::U256;

use crate::domain::{is_forked, BlockHeight, Derivation, ForkSchedule, Rules, Upgrade};

/// Whether `upgrade` is in force at `height` under `schedule`.
pub fn is_active(schedule: &ForkSchedule, upgrade: Upgrade, height: BlockHeight) -> bool {
    resolve(schedule, upgrade, height, Upgrade::COUNT)
}

fn resolve(schedule: &ForkSchedule, upgrade: Upgrade, height: BlockHeight, depth: usize) -> bool {
    let own = schedule.activation(upgrade);
    if is_forked(own, height) {
        return true;
    }
    if depth == 0 {
        return false;
    }
    match upgrade.derivation() {
        Derivation::Direct => false,
        Derivation::ImpliedBy(other) => resolve(schedule, other, height, depth - 1),
        Derivation::DefaultsTo(base) => own.is_none() && resolve(schedule, base, height, depth - 1),
    }
}

/// Snapshot of every activation flag at `height`.
///
/// A missing chain id is reported as zero.
pub fn derive_rules(schedule: &ForkSchedule, height: BlockHeight) -> Rules {
    let active = |upgrade| is_active(schedule, upgrade, height);
    Rules {
        height,
        chain_id: schedule.chain_id().unwrap_or_else(U256::zero),
        is_homestead: active(Upgrade::Homestead),
        is_dao_fork: active(Upgrade::DaoFork),
        is_eip150: active(Upgrade::Eip150),
        is_eip155: active(Upgrade::Eip155),
        is_eip158: active(Upgrade::Eip158),
        is_byzantium: active(Upgrade::Byzantium),
        is_constantinople: active(Upgrade::Constantinople),
        is_petersburg: active(Upgrade::Petersburg),
        is_istanbul: active(Upgrade::Istanbul),
        is_muir_glacier: active(Upgrade::MuirGlacier),
        is_berlin: active(Upgrade::Berlin),
        is_phoenix: active(Upgrade::Phoenix),
        is_yolo_v3: active(Upgrade::YoloV3),
        is_ewasm: active(Upgrade::Ewasm),
        is_catalyst: active(Upgrade::Catalyst),
    }
}
