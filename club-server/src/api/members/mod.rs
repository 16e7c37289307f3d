//! Member API 模块
//!
//! | 路径 | 方法 | 角色 |
//! |------|------|------|
//! | /api/members | GET (`?q=`) / POST | ADMIN |
//! | /api/members/me | GET | 已登录 |
//! | /api/members/{id} | GET / PATCH / PUT / DELETE | ADMIN |

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    // 本人记录：任何已登录用户
    let self_routes = Router::new().route("/me", get(handler::me));

    let admin_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_admin));

    self_routes.merge(admin_routes)
}
