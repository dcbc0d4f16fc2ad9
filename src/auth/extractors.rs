use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{cookie::session_token, dto::Session, jwt::SessionKeys, services::read_session};
use crate::errors::AppError;

/// Extracts and validates the session token (cookie or Bearer header).
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let session = read_session(&keys, &token).ok_or(AppError::Unauthorized)?;
        Ok(CurrentSession(session))
    }
}
