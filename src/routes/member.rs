//! Member, token and audit route handlers

use crate::auth::Caller;
use crate::error::{validation_error, ApiResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::governance::{AuditAction, AuditEntry, MemberId};
use crate::models::*;
use crate::state::SharedState;
use axum::{extract::State, Json};
use validator::Validate;

const DEFAULT_AUDIT_LIMIT: usize = 100;

/// DAO overview: token, owner, roster
pub async fn dao_info(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<DaoInfoResponse>>> {
    let membership = state.registry.membership();

    Ok(Json(SuccessResponse::with_data(
        "DAO info retrieved",
        DaoInfoResponse {
            token_name: state.ledger.name().to_string(),
            token_symbol: state.ledger.symbol().to_string(),
            total_supply: state.ledger.total_supply(),
            weight_mode: state.ledger.mode(),
            owner: membership.owner().clone(),
            members: membership.members().cloned().collect(),
            proposal_count: state.registry.proposal_count().await,
        },
    )))
}

/// Delegate the caller's voting power
pub async fn delegate(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    AppJson(req): AppJson<DelegateRequest>,
) -> ApiResult<Json<SuccessResponse<DelegationResponse>>> {
    req.validate().map_err(|e| validation_error(e.to_string()))?;
    let to = MemberId::parse(&req.to)?;

    let delegation = state.ledger.delegate(&caller, &to)?;
    let delegate_voting_weight = state.ledger.current_weight(&to)?;

    state
        .registry
        .audit()
        .record(
            AuditEntry::new(caller.clone(), AuditAction::VotingPowerDelegated, delegation.effective_at)
                .with_details(serde_json::json!({
                    "previous_delegate": delegation.previous,
                    "to": to,
                })),
        )
        .await;

    Ok(Json(SuccessResponse::with_data(
        "Delegated!",
        DelegationResponse {
            from: caller,
            to,
            previous_delegate: delegation.previous,
            delegate_voting_weight,
        },
    )))
}

/// Balance, delegate and voting weight of one member
pub async fn member_info(
    State(state): State<SharedState>,
    AppPath(member): AppPath<String>,
) -> ApiResult<Json<SuccessResponse<MemberResponse>>> {
    let member = MemberId::parse(&member)?;
    let delegate = state.ledger.delegate_of(&member)?;
    let voting_weight = state.ledger.current_weight(&member)?;

    Ok(Json(SuccessResponse::with_data(
        "Member retrieved",
        MemberResponse {
            is_member: state.registry.membership().is_member(&member),
            balance: state.ledger.balance_of(&member),
            delegate,
            voting_weight,
            member,
        },
    )))
}

/// Governance audit trail, newest first
pub async fn audit_log(
    State(state): State<SharedState>,
    AppQuery(query): AppQuery<AuditQuery>,
) -> ApiResult<Json<SuccessResponse<AuditLogResponse>>> {
    let entries = state
        .registry
        .audit()
        .entries(query.proposal_id, query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT))
        .await;

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} audit entries", entries.len()),
        AuditLogResponse { entries },
    )))
}
