//! Subscription API 模块 (全部需要 ADMIN)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/subscriptions/plans | GET / POST | 会费方案 |
//! | /api/subscriptions/assessments | GET / POST | 摊派 (创建时物化) |
//! | /api/subscriptions/member-subscriptions | GET / PATCH | 会员应缴 / 批量改状态 |
//! | /api/subscriptions/payments | GET / POST | 缴费 |

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/subscriptions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/plans",
            get(handler::list_plans).post(handler::create_plan),
        )
        .route(
            "/assessments",
            get(handler::list_assessments).post(handler::create_assessment),
        )
        .route(
            "/member-subscriptions",
            get(handler::list_subscriptions).patch(handler::bulk_set_status),
        )
        .route(
            "/payments",
            get(handler::list_payments).post(handler::record_payment),
        )
        .layer(middleware::from_fn(require_admin))
}
