use crate::services::Caller;
use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use service_core::error::AppError;

/// Extractor for endpoints that need a bearer credential.
///
/// A missing, malformed or rejected `Authorization` header yields 403 before
/// the request body is looked at.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| not_authenticated())?;

        let caller = state
            .token_verifier
            .verify(bearer.token())
            .await
            .ok_or_else(not_authenticated)?;

        Ok(Authenticated(caller))
    }
}

fn not_authenticated() -> AppError {
    AppError::Forbidden(anyhow::anyhow!("Not authenticated"))
}
