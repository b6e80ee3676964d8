//! Authenticated-user extraction.
//!
//! Registration, passwords, and token issuance live in the fronting
//! gateway; by the time a request reaches this service the gateway has
//! verified the caller and stamped the numeric user id onto the request.
//! Handlers take [`AuthUser`] to receive it.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crag_models::UserId;

use crate::error::ApiError;

/// Header carrying the gateway-verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user, extracted from the gateway identity header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing identity header"))?;

        let user_id: i64 = header
            .to_str()
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ApiError::unauthorized("Malformed identity header"))?;

        Ok(AuthUser(UserId::new(user_id)))
    }
}
