//! Application state management
//!
//! Contains shared state accessible across all handlers. There is no
//! process-wide registry: the instance built here is passed to every handler.

use crate::config::{ConfigError, GovernanceConfig};
use crate::governance::{Clock, GovernanceRegistry};
use crate::token::VotingPowerLedger;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Proposal lifecycle, tally and audit trail (has internal per-proposal locking)
    pub registry: GovernanceRegistry,

    /// Voting power and delegation
    pub ledger: Arc<VotingPowerLedger>,
}

impl AppState {
    /// Build the registry and ledger described by the governance config
    pub fn new(governance: &GovernanceConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let membership = governance.membership()?;
        let ledger = Arc::new(governance.ledger(&membership)?.with_clock(clock.clone()));
        let registry = GovernanceRegistry::new(membership, ledger.clone(), clock);

        Ok(Self { registry, ledger })
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
