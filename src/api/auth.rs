use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::{ApiError, UnauthenticatedSnafu};
use crate::model::UserId;

/// Header carrying the caller identity, filled in by the gateway in front of this service.
pub const USER_HEADER: &str = "x-user-id";

/// The authenticated caller. Requests without a non-empty [USER_HEADER] are rejected with `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match user {
            Some(user) => Ok(CurrentUser(UserId::new(user.to_string()))),
            None => UnauthenticatedSnafu.fail(),
        }
    }
}
