//! Error handling module
//!
//! Maps governance outcomes onto HTTP responses with stable error codes.

use crate::governance::{CollaboratorError, GovernanceError};
use crate::token::DelegationError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Delegation(#[from] DelegationError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malformed request: {message}")]
    Malformed { status: StatusCode, message: String },
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<CollaboratorError> for AppError {
    fn from(err: CollaboratorError) -> Self {
        AppError::Governance(GovernanceError::CollaboratorFailure(err))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

fn governance_status(err: &GovernanceError) -> StatusCode {
    match err {
        GovernanceError::ProposalNotFound(_) => StatusCode::NOT_FOUND,
        GovernanceError::VotingClosed(_)
        | GovernanceError::AlreadyExecuted(_)
        | GovernanceError::AlreadyVoted { .. }
        | GovernanceError::VotingOpen(_) => StatusCode::CONFLICT,
        GovernanceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        GovernanceError::NotAMember(_) | GovernanceError::Unauthorized(_) => StatusCode::FORBIDDEN,
        GovernanceError::CollaboratorFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::Governance(GovernanceError::CollaboratorFailure(e)) => {
                error!("Collaborator failure: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "COLLABORATOR_FAILURE",
                    "Voting power is temporarily unavailable".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Governance(e) => (governance_status(e), e.code(), e.to_string(), None),
            AppError::Delegation(DelegationError::NoAccount(member)) => (
                StatusCode::FORBIDDEN,
                "NO_VOTING_ACCOUNT",
                format!("{} holds no voting account", member),
                None,
            ),
            AppError::Delegation(DelegationError::Collaborator(e)) => {
                error!("Collaborator failure during delegation: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "COLLABORATOR_FAILURE",
                    "Voting power is temporarily unavailable".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Malformed { status, message } => {
                warn!("Malformed request: {}", message);
                (*status, "MALFORMED_REQUEST", message.clone(), None)
            }
            AppError::Unauthorized(msg) => {
                warn!("Rejected request: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    "MISSING_CALLER",
                    msg.clone(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}
