//! Caller extractor
//!
//! Reads the member address from request headers for handlers to use.

use crate::error::AppError;
use crate::governance::MemberId;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the caller's member address
pub const MEMBER_HEADER: &str = "x-member-address";

/// The member on whose behalf a request is made
#[derive(Debug, Clone)]
pub struct Caller(pub MemberId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(MEMBER_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", MEMBER_HEADER)))?;

        let member = MemberId::parse(raw)
            .map_err(|_| AppError::Unauthorized("Empty member address".to_string()))?;

        Ok(Caller(member))
    }
}
