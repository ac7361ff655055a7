//! Administrator capability boundary
//!
//! Market creation and resolution are privileged. This check is separate
//! from the per-order `maker == caller` ownership check on cancel.

use types::errors::EngineError;
use types::ids::ParticipantId;

/// Capability check for market creation and resolution
pub trait AdminAuthority {
    /// Fail with `Unauthorized` unless `caller` holds the admin capability
    fn require_admin(&self, caller: ParticipantId) -> Result<(), EngineError>;
}

/// Single fixed administrator account
#[derive(Debug, Clone, Copy)]
pub struct SingleAdmin {
    admin: ParticipantId,
}

impl SingleAdmin {
    pub fn new(admin: ParticipantId) -> Self {
        Self { admin }
    }

    pub fn admin(&self) -> ParticipantId {
        self.admin
    }
}

impl AdminAuthority for SingleAdmin {
    fn require_admin(&self, caller: ParticipantId) -> Result<(), EngineError> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(EngineError::Unauthorized)
        }
    }
}
