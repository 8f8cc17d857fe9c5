//! Proposal-related models and DTOs

use crate::governance::{ExecutionOutcome, MemberId, ProposalCategory, ProposalId, ProposalView, WinningProposal};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a proposal
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,
    /// Voting window in seconds
    pub duration: i64,
    #[serde(default)]
    pub category: ProposalCategory,
}

/// Request to finalize a proposal
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteProposalRequest {
    /// Signed so a negative value reaches us and is refused explicitly
    pub quorum_threshold: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProposalResponse {
    pub proposal_id: ProposalId,
    pub proposal: ProposalView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub proposal: ProposalView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListResponse {
    pub proposal_count: u64,
    pub proposals: Vec<ProposalView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingTimeResponse {
    pub proposal_id: ProposalId,
    pub remaining_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedResponse {
    pub proposal_id: ProposalId,
    pub member: MemberId,
    pub has_voted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub proposal_id: ProposalId,
    pub vote_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub outcome: ExecutionOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerResponse {
    pub winner: Option<WinningProposal>,
}
