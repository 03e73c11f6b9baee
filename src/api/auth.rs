//! Login, registration, and the bearer-token gate for protected routes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::{
    ApiError, ApiResponse, AppState, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use crate::domain::Role;
use crate::services::RegisterAccount;

/// Identity attached to the request once the token checks out. Handlers read
/// it through `Extension`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub username: String,
    pub nickname: String,
    pub roles: Vec<Role>,
}

impl AuthContext {
    /// Gate for role-restricted handlers.
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.roles.contains(&role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("insufficient permissions".to_string()))
        }
    }
}

/// Verifies the `Authorization: Bearer` header and injects an `AuthContext`.
/// Runs in front of every protected route.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing or invalid token".to_string()))?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::Unauthorized("invalid token".to_string()))?;

    request.extensions_mut().insert(AuthContext {
        username: claims.sub,
        nickname: claims.name,
        roles: claims.roles,
    });

    Ok(next.run(request).await)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoginResponse>>), ApiError> {
    let outcome = state
        .accounts
        .authenticate(&payload.username, &payload.password)
        .await?;

    // a login mints a token, hence Created
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(outcome.into())),
    ))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
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
        Json(ApiResponse::success(RegisterResponse {
            user_id: account.id,
            username: account.username,
        })),
    ))
}
