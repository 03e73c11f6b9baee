//! Account management handlers. Listing, mutation, and history are
//! admin-only; reading a single account needs any authenticated caller.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::{ApiError, ApiResponse, AppState, auth::AuthContext, types::*};
use crate::domain::Role;
use crate::services::{RegisterAccount, UpdateAccount};

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    auth.require(Role::Admin)?;

    let role = match query.role.as_deref() {
        Some(tag) => Some(tag.parse::<Role>().map_err(|()| {
            ApiError::ValidationError(format!(
                "unknown role '{tag}': expected one of admin, player, viewer"
            ))
        })?),
        None => None,
    };

    let accounts = state.accounts.list(role).await?;
    Ok(Json(ApiResponse::success(
        accounts.into_iter().map(Into::into).collect(),
    )))
}

/// Same pipeline as self-registration, but admin-initiated.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountDto>>), ApiError> {
    auth.require(Role::Admin)?;

    let account = state
        .accounts
        .register(RegisterAccount {
            username: payload.username,
            password: payload.password,
            nickname: payload.nickname,
            roles: payload.roles,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(account.into())),
    ))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthContext>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let account = state.accounts.get(&username).await?;
    Ok(Json(ApiResponse::success(account.into())))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(username): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    auth.require(Role::Admin)?;

    let account = state
        .accounts
        .update(
            &username,
            UpdateAccount {
                username: payload.username,
                password: payload.password,
                nickname: payload.nickname,
                roles: payload.roles,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(account.into())))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require(Role::Admin)?;

    state.accounts.delete(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    auth.require(Role::Admin)?;

    let versions = state.accounts.history(&username).await?;
    Ok(Json(ApiResponse::success(
        versions.into_iter().map(Into::into).collect(),
    )))
}
