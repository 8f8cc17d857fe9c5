//! Governance error kinds
//!
//! Every business outcome the registry can refuse is a distinct variant so
//! callers can branch on it without string matching.

use crate::governance::models::{MemberId, ProposalId};
use crate::governance::weight::CollaboratorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("Voting on proposal {0} is closed")]
    VotingClosed(ProposalId),

    #[error("Proposal {0} has already been executed")]
    AlreadyExecuted(ProposalId),

    #[error("{member} has already voted on proposal {proposal_id}")]
    AlreadyVoted {
        proposal_id: ProposalId,
        member: MemberId,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is not a registered member")]
    NotAMember(MemberId),

    #[error("{0} is not allowed to execute proposals")]
    Unauthorized(MemberId),

    /// Execution attempted before the deadline
    #[error("Voting on proposal {0} is still open")]
    VotingOpen(ProposalId),

    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(#[from] CollaboratorError),
}

impl GovernanceError {
    /// Stable machine-readable code, used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            GovernanceError::ProposalNotFound(_) => "PROPOSAL_NOT_FOUND",
            GovernanceError::VotingClosed(_) => "VOTING_CLOSED",
            GovernanceError::AlreadyExecuted(_) => "ALREADY_EXECUTED",
            GovernanceError::AlreadyVoted { .. } => "ALREADY_VOTED",
            GovernanceError::InvalidInput(_) => "INVALID_INPUT",
            GovernanceError::NotAMember(_) => "NOT_A_MEMBER",
            GovernanceError::Unauthorized(_) => "UNAUTHORIZED",
            GovernanceError::VotingOpen(_) => "VOTING_OPEN",
            GovernanceError::CollaboratorFailure(_) => "COLLABORATOR_FAILURE",
        }
    }
}

/// Helper function to create an invalid input error
pub fn invalid_input(msg: impl Into<String>) -> GovernanceError {
    GovernanceError::InvalidInput(msg.into())
}
