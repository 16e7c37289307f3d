//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、当前用户
//! - [`members`] - 会员登记
//! - [`users`] - 登录账户
//! - [`subscriptions`] - 会费方案、摊派、应缴、缴费

pub mod auth;
pub mod health;
pub mod members;
pub mod subscriptions;
pub mod users;

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::middleware::logging_middleware;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public
        .merge(health::router())
        // Login public, /me any signed-in user
        .merge(auth::router())
        // Admin, plus /me routes for any signed-in user
        .merge(members::router())
        .merge(users::router())
        // Admin only
        .merge(subscriptions::router())
}

/// Requests running longer than `timeout_ms` are answered with 408
fn timeout_layer(timeout_ms: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_millis(timeout_ms))
}

/// Build the application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // Timeout - innermost so it bounds handler time only
        .layer(timeout_layer(state.config.request_timeout_ms))
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // Request logging (sees CurrentUser injected by require_auth)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        .layer(SetRequestIdLayer::new(request_id.clone(), XRequestId))
        .layer(PropagateRequestIdLayer::new(request_id))
        // JWT authentication - injects CurrentUser before routes run
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
}
