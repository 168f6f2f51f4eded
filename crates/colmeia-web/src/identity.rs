//! Request identity.
//!
//! Authentication happens upstream. The authenticated user id arrives in the
//! `x-colmeia-user` header and is resolved to an [`Actor`] here.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use colmeia_core::identity::Actor;

use crate::error::WebError;
use crate::state::AppState;

pub const USER_HEADER: &str = "x-colmeia-user";

/// A staff member with an account, resolved from [`USER_HEADER`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(WebError::Unauthorized)?;

        let Some(actor) = state.service.load_actor(user_id).await? else {
            tracing::debug!(user_id, "unknown user on request");
            return Err(WebError::Unauthorized);
        };
        if !actor.is_staff {
            return Err(WebError::Forbidden(
                "Acesso restrito a membros da equipe.".to_string(),
            ));
        }
        Ok(Self(actor))
    }
}

/// Anonymous requests extract as `None`; unknown or non-staff users still fail.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(USER_HEADER) {
            return Ok(None);
        }
        <Self as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
