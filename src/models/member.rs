//! Member, token and audit models and DTOs

use crate::governance::{AuditEntry, MemberId, ProposalId};
use crate::token::WeightMode;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to delegate the caller's voting power
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DelegateRequest {
    #[validate(length(min = 1, max = 128, message = "Delegate address must be between 1 and 128 characters"))]
    pub to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationResponse {
    pub from: MemberId,
    pub to: MemberId,
    pub previous_delegate: MemberId,
    pub delegate_voting_weight: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub member: MemberId,
    pub is_member: bool,
    pub balance: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate: Option<MemberId>,
    pub voting_weight: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoInfoResponse {
    pub token_name: String,
    pub token_symbol: String,
    pub total_supply: u64,
    pub weight_mode: WeightMode,
    pub owner: MemberId,
    pub members: Vec<MemberId>,
    pub proposal_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub proposal_id: Option<ProposalId>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub entries: Vec<AuditEntry>,
}
