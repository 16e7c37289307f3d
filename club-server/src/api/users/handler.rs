//! User API Handlers

use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{PasswordUpdate, User, UserCreate, UserCreated};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::{json_body, validate_password};
use crate::utils::{ApiResponse, AppResult};

/// GET /api/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

/// POST /api/users - 未提供密码时响应中带 `temporaryPassword`
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserCreated>)> {
    let created = state.users.create(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/users/me
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<Json<User>> {
    Ok(Json(state.users.get(&current.id).await?))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get(&id).await?))
}

/// PATCH /api/users/{id}/password - 管理员重置密码，不校验旧密码
pub async fn update_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<PasswordUpdate>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let body = json_body(payload)?;
    validate_password(&body.password)?;

    state.users.update_password(&id, &body.password).await?;
    tracing::info!(user_id = %id, by = %current.username, "Password reset by admin");
    Ok(Json(ApiResponse::ok_with_message("Password updated")))
}
