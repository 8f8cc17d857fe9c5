//! Voting weight collaborator
//!
//! The registry asks for a member's weight at vote time and never caches it.

use crate::governance::models::MemberId;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of an external collaborator (weight source, clock, storage)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("voting weight source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies a member's voting power.
///
/// Lookups must be side-effect free; the registry evaluates them before it
/// commits any change to proposal state.
pub trait VotingWeightProvider: Send + Sync {
    /// Power `member` held strictly before `at`. Every vote on one proposal
    /// reads the same timepoint, so the tally never exceeds the supply.
    fn weight_at(&self, member: &MemberId, at: DateTime<Utc>) -> Result<u64, CollaboratorError>;
}
