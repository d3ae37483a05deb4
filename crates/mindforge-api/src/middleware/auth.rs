//! Bearer-token authentication.
//!
//! Every path outside [`PUBLIC_PATHS`] needs `Authorization: Bearer <jwt>`.
//! The verified user id is stored in the request extensions as [`AuthUser`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{ApiError, AppState};

/// Paths served without a token (exact match).
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/health",
    "/api/auth",
    "/api/auth/login",
    "/api/auth/register",
    "/public",
    "/favicon.ico",
    "/manifest.json",
    "/logo.svg",
    "/logo192.png",
    "/logo512.png",
    "/robots.txt",
];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Id of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

impl AuthUser {
    pub fn id(self) -> i64 {
        self.0
    }
}

/// Pull the token out of an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Result<&str, ApiError> {
    match header_value.split_once(' ') {
        Some((_, token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::Unauthorized("invalid token format".to_string())),
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing token".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid token format".to_string()))?;
    let token = bearer_token(header_value)?;

    let user_id = state.jwt.verify(token).map_err(|e| {
        debug!(subsystem = "auth", error = %e, "Token rejected");
        ApiError::Unauthorized("token expired or invalid".to_string())
    })?;

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("missing token".to_string()))
    }
}
