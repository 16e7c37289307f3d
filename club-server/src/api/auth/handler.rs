//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use shared::models::{LoginRequest, LoginResponse, User};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::validation::{json_body, missing_fields};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Login handler
///
/// Unknown users and wrong passwords get the same answer after the same
/// fixed delay.
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let req = json_body(payload)?;
    let mut missing = Vec::new();
    if req.username.is_none() {
        missing.push("username");
    }
    if req.password.is_none() {
        missing.push("password");
    }
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(missing_fields(ErrorCode::RequiredField, &missing));
    };

    let result = state.users.authenticate(&username, &password).await;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(state.config.login_delay_ms)).await;

    let user = match result {
        Ok(user) => user,
        Err(e) if e.code == ErrorCode::InvalidCredentials => {
            tracing::warn!(username = %username, "Login failed - invalid credentials");
            security_log!("WARN", "login_failed", username = username.clone());
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let token = state
        .get_jwt_service()
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse { token, user }))
}

/// Current user record
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<Json<User>> {
    let user = state.users.get(&current.id).await?;
    Ok(Json(user))
}
