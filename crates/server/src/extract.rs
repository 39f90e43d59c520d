//! Request extractors for authentication
//!
//! Session-to-identity resolution happens here, once per request, at
//! the extractor boundary. Handlers receive a typed `Identity` (or its
//! absence) rather than reaching into session state themselves.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use inkwell_common::{
    auth::{extract_bearer, Identity},
    errors::{AppError, Result},
};

use crate::AppState;

/// Optional identity: anonymous requests resolve to `None`, a present
/// but invalid token is rejected.
pub struct MaybeUser(pub Option<Identity>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer);

        Ok(MaybeUser(state.sessions.resolve(bearer)?))
    }
}

/// Required identity for authenticated routes
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let MaybeUser(identity) = MaybeUser::from_request_parts(parts, state).await?;

        identity.map(CurrentUser).ok_or(AppError::Unauthorized {
            message: "Login required".to_string(),
        })
    }
}
