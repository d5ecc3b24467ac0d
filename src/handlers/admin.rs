//! Admin moderation lists. Every handler requires the ADMIN role.

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::query::RawParams;
use crate::response::success_page;
use crate::service::AdminService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

pub async fn users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = AdminService::users(&state.source(), user.role, params).await?;
    Ok(success_page("Users retrieved successfully", "users", page))
}

pub async fn listings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = AdminService::listings(&state.source(), user.role, params).await?;
    Ok(success_page("Listings retrieved successfully", "listings", page))
}

pub async fn bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = AdminService::bookings(&state.source(), user.role, params).await?;
    Ok(success_page("Bookings retrieved successfully", "bookings", page))
}
