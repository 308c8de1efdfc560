//! Caller identity
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! user id in the `x-user-id` header and this service trusts it.

use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use taskboard_core::core_board::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The user making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub UserId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Caller(UserId::new(value)))
            .ok_or(ApiError::MissingCaller)
    }
}
