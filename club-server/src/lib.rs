//! Club Server - 会员俱乐部管理服务
//!
//! # 架构概述
//!
//! - **会员登记** (`services::member_registry`): 会员档案的增删改查与搜索
//! - **会费引擎** (`services::subscription_engine`): 方案、摊派物化、缴费匹配
//! - **账户目录** (`services::user_directory`): 登录账户与 argon2 密码
//! - **认证** (`auth`): JWT + 角色检查
//! - **存储** (`db`): `Repository` trait，内存 / PostgreSQL 两种实现
//!
//! # 模块结构
//!
//! ```text
//! club-server/src/
//! ├── core/          # 配置、状态、错误、HTTP 服务
//! ├── auth/          # JWT、密码、中间件
//! ├── db/            # 存储层
//! ├── services/      # 业务逻辑
//! ├── api/           # HTTP 路由和处理器
//! ├── middleware/    # 请求日志
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod middleware;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::Stores;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::init_logger;

// Security logging macro - 认证失败等安全事件写入 `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
