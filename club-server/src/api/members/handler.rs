//! Member API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{Member, MemberCreate, MemberQuery, MemberUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::{json_body, query_params};
use crate::utils::{ApiResponse, AppResult};

/// GET /api/members?q= - 列表 / 搜索
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<MemberQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Member>>> {
    let query = query_params(query)?;
    let members = state.members.list(query.q.as_deref()).await?;
    Ok(Json(members))
}

/// GET /api/members/me - 当前用户关联的会员
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Member>> {
    let member = state.members.me(current.member_id.as_deref()).await?;
    Ok(Json(member))
}

/// GET /api/members/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Member>> {
    let member = state.members.get(&id).await?;
    Ok(Json(member))
}

/// POST /api/members
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<MemberCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.members.create(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// PATCH / PUT /api/members/{id} - 部分更新
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<MemberUpdate>, JsonRejection>,
) -> AppResult<Json<Member>> {
    let member = state.members.update(&id, json_body(payload)?).await?;
    Ok(Json(member))
}

/// DELETE /api/members/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.members.delete(&id).await?;
    Ok(Json(ApiResponse::ok_with_message("Member deleted")))
}
