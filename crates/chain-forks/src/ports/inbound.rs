//! # Inbound Ports
//!
//! What callers ask of a fork schedule at a given height.

use crate::algorithms;
use crate::domain::{BlockHeight, ForkSchedule, Rules, Upgrade};

/// Activation queries - inbound port.
///
/// Block validation, transaction processing and peer handshakes all go
/// through this trait instead of reading activation heights directly.
pub trait RuleQuery: Send + Sync {
    /// Whether `upgrade` is in force at `height`.
    fn is_active(&self, upgrade: Upgrade, height: BlockHeight) -> bool;

    /// Full activation snapshot for one block.
    fn rules(&self, height: BlockHeight) -> Rules;

    /// Homestead active.
    fn is_homestead(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Homestead, height)
    }

    /// DAO fork active.
    fn is_dao_fork(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::DaoFork, height)
    }

    /// EIP150 active.
    fn is_eip150(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Eip150, height)
    }

    /// EIP155 active.
    fn is_eip155(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Eip155, height)
    }

    /// EIP158 active.
    fn is_eip158(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Eip158, height)
    }

    /// Byzantium active.
    fn is_byzantium(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Byzantium, height)
    }

    /// Constantinople active.
    fn is_constantinople(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Constantinople, height)
    }

    /// Petersburg active, falling back to Constantinople when unset.
    fn is_petersburg(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Petersburg, height)
    }

    /// Istanbul active.
    fn is_istanbul(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Istanbul, height)
    }

    /// Muir Glacier active.
    fn is_muir_glacier(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::MuirGlacier, height)
    }

    /// Berlin active, or implied by YOLOv3.
    fn is_berlin(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Berlin, height)
    }

    /// Phoenix active.
    fn is_phoenix(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Phoenix, height)
    }

    /// YOLOv3 active.
    fn is_yolo_v3(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::YoloV3, height)
    }

    /// EWASM active.
    fn is_ewasm(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Ewasm, height)
    }

    /// Catalyst active.
    fn is_catalyst(&self, height: BlockHeight) -> bool {
        self.is_active(Upgrade::Catalyst, height)
    }
}

impl RuleQuery for ForkSchedule {
    fn is_active(&self, upgrade: Upgrade, height: BlockHeight) -> bool {
        algorithms::is_active(self, upgrade, height)
    }

    fn rules(&self, height: BlockHeight) -> Rules {
        algorithms::derive_rules(self, height)
    }
}
