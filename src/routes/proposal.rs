//! Proposal route handlers
//!
//! Create, list, vote on and execute proposals.

use crate::auth::Caller;
use crate::error::{validation_error, ApiResult};
use crate::extract::{AppJson, AppPath};
use crate::governance::{invalid_input, MemberId, ProposalId};
use crate::models::*;
use crate::state::SharedState;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use validator::Validate;

/// Create a new proposal
pub async fn create_proposal(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    AppJson(req): AppJson<CreateProposalRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<CreatedProposalResponse>>)> {
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    let duration = Duration::try_seconds(req.duration)
        .ok_or_else(|| invalid_input("Duration is out of range"))?;

    let proposal_id = state
        .registry
        .create_proposal(&req.description, duration, req.category, &caller)
        .await?;
    let proposal = state.registry.get_proposal(proposal_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Proposal created",
            CreatedProposalResponse { proposal_id, proposal },
        )),
    ))
}

/// List all proposals in id order
pub async fn list_proposals(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<ProposalListResponse>>> {
    let proposals = state.registry.all_proposals().await;

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} proposals", proposals.len()),
        ProposalListResponse {
            proposal_count: proposals.len() as u64,
            proposals,
        },
    )))
}

/// Get a proposal by ID
pub async fn get_proposal(
    State(state): State<SharedState>,
    AppPath(id): AppPath<ProposalId>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let proposal = state.registry.get_proposal(id).await?;
    Ok(Json(SuccessResponse::with_data("Proposal retrieved", ProposalResponse { proposal })))
}

/// Seconds left in the voting window
pub async fn remaining_time(
    State(state): State<SharedState>,
    AppPath(id): AppPath<ProposalId>,
) -> ApiResult<Json<SuccessResponse<RemainingTimeResponse>>> {
    let remaining_seconds = state.registry.remaining_time(id).await?;
    Ok(Json(SuccessResponse::with_data(
        if remaining_seconds == 0 { "Voting closed" } else { "Voting open" },
        RemainingTimeResponse {
            proposal_id: id,
            remaining_seconds,
        },
    )))
}

/// Whether a member has voted on a proposal
pub async fn has_voted(
    State(state): State<SharedState>,
    AppPath((id, member)): AppPath<(ProposalId, String)>,
) -> ApiResult<Json<SuccessResponse<HasVotedResponse>>> {
    let member = MemberId::parse(&member)?;
    let has_voted = state.registry.has_voted(id, &member).await?;

    Ok(Json(SuccessResponse::with_data(
        "Vote status retrieved",
        HasVotedResponse {
            proposal_id: id,
            member,
            has_voted,
        },
    )))
}

/// Cast the caller's vote
pub async fn vote(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    AppPath(id): AppPath<ProposalId>,
) -> ApiResult<Json<SuccessResponse<VoteResponse>>> {
    let vote_count = state.registry.vote(id, &caller).await?;

    Ok(Json(SuccessResponse::with_data(
        "Voted successfully",
        VoteResponse {
            proposal_id: id,
            vote_count,
        },
    )))
}

/// Finalize a proposal against the supplied quorum threshold
pub async fn execute_proposal(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    AppPath(id): AppPath<ProposalId>,
    AppJson(req): AppJson<ExecuteProposalRequest>,
) -> ApiResult<Json<SuccessResponse<ExecutionResponse>>> {
    let quorum_threshold = u64::try_from(req.quorum_threshold)
        .map_err(|_| invalid_input("Quorum threshold must not be negative"))?;

    let outcome = state
        .registry
        .execute_proposal(id, quorum_threshold, &caller)
        .await?;

    Ok(Json(SuccessResponse::with_data(
        if outcome.approved { "Proposal approved" } else { "Proposal rejected" },
        ExecutionResponse { outcome },
    )))
}

/// Proposal with the most votes
pub async fn winning_proposal(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<WinnerResponse>>> {
    let winner = state.registry.winning_proposal().await;
    Ok(Json(SuccessResponse::with_data(
        if winner.is_some() { "Winning proposal found" } else { "No proposals yet" },
        WinnerResponse { winner },
    )))
}
