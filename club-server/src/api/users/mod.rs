//! User API 模块
//!
//! | 路径 | 方法 | 角色 |
//! |------|------|------|
//! | /api/users | GET / POST | ADMIN |
//! | /api/users/me | GET | 已登录 |
//! | /api/users/{id} | GET | ADMIN |
//! | /api/users/{id}/password | PATCH | ADMIN |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    let self_routes = Router::new().route("/me", get(handler::me));

    let admin_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/password", patch(handler::update_password))
        .layer(middleware::from_fn(require_admin));

    self_routes.merge(admin_routes)
}
