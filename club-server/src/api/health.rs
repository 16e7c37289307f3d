//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 健康检查 | 无 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::{ServerState, StoreBackend};

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok)
    status: &'static str,
    version: &'static str,
    /// 存储后端 (memory | postgres)
    store: &'static str,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let store = match state.config.store_backend {
        StoreBackend::Memory => "memory",
        StoreBackend::Postgres => "postgres",
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store,
    })
}
