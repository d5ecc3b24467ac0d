//! Extract the caller's identity from the headers set by the gateway (X-User-Id, X-User-Role).

use crate::access::Role;
use crate::error::AppError;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Authenticated caller. Rejects with 401 when either header is missing or malformed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// Caller identity when present; anonymous requests pass through as `None`.
#[derive(Clone, Copy, Debug)]
pub struct MaybeUser(pub Option<AuthUser>);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn identity(parts: &Parts) -> Result<Option<AuthUser>, AppError> {
    let (id, role) = match (header(parts, USER_ID_HEADER), header(parts, USER_ROLE_HEADER)) {
        (None, None) => return Ok(None),
        (Some(id), Some(role)) => (id, role),
        _ => return Err(AppError::Unauthorized("You are not authorized".into())),
    };
    let id = Uuid::parse_str(id).map_err(|_| AppError::Unauthorized("Invalid user id".into()))?;
    let role = role.parse::<Role>()?;
    Ok(Some(AuthUser { id, role }))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity(parts)?.ok_or_else(|| AppError::Unauthorized("You are not authorized".into()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(identity(parts)?))
    }
}
