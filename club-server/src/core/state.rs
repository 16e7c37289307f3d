use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result, StoreBackend};
use crate::db::{self, Stores};
use crate::services::{MemberRegistry, SubscriptionEngine, UserDirectory};

/// Postgres 连接池大小
const PG_MAX_CONNECTIONS: u32 = 10;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是 `Arc` 或内部持有 `Arc`，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | stores | Stores | 注入的存储 (memory / postgres) |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | members | MemberRegistry | 会员登记 |
/// | subscriptions | SubscriptionEngine | 会费引擎 |
/// | users | UserDirectory | 登录账户 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 存储集合
    pub stores: Stores,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    pub members: MemberRegistry,
    pub subscriptions: SubscriptionEngine,
    pub users: UserDirectory,
}

impl ServerState {
    /// 基于已有存储构造状态 (测试直接传入 `Stores::memory()`)
    pub fn new(config: Config, stores: Stores) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let members = MemberRegistry::new(stores.members.clone(), config.member_schema);
        let subscriptions = SubscriptionEngine::new(&stores);
        let users = UserDirectory::new(stores.users.clone(), stores.members.clone());

        Self {
            config,
            stores,
            jwt_service,
            members,
            subscriptions,
            users,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 存储后端 (postgres 时连接并执行迁移)
    /// 2. 各服务
    /// 3. 首个管理员 (配置了 `BOOTSTRAP_ADMIN_*` 且用户表为空时)
    pub async fn initialize(config: &Config) -> Result<Self> {
        let stores = match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store, data is lost on restart");
                Stores::memory()
            }
            StoreBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    crate::core::ServerError::Config("DATABASE_URL is not set".into())
                })?;
                let pool = db::pg::connect(url, PG_MAX_CONNECTIONS).await?;
                Stores::postgres(pool)
            }
        };

        let state = Self::new(config.clone(), stores);

        if let Some(admin) = &config.bootstrap_admin {
            state
                .users
                .ensure_bootstrap_admin(&admin.username, &admin.password)
                .await?;
        }

        tracing::info!(
            backend = ?config.store_backend,
            member_schema = ?config.member_schema,
            "Server state initialized"
        );
        Ok(state)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
