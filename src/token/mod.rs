//! Governance token module
//!
//! Balances are fixed at startup from configuration; the only mutation is
//! delegation of voting power.

mod ledger;

pub use ledger::{Delegation, DelegationError, VotingPowerLedger, WeightMode};
