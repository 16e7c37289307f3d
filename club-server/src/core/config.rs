use std::str::FromStr;

use crate::auth::JwtConfig;
use crate::auth::jwt::{check_secret, generate_printable_secret};
use crate::core::ServerError;
use crate::services::MemberSchema;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// 进程内存储，重启即丢失
    #[default]
    Memory,
    /// PostgreSQL (需要 `DATABASE_URL`)
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// 首个管理员账户
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | STORE_BACKEND | memory | `memory` 或 `postgres` |
/// | DATABASE_URL | - | postgres 后端必填 |
/// | MEMBER_SCHEMA | extended | 会员必填字段策略 `basic` / `extended` |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | LOGIN_DELAY_MS | 500 | 登录固定延迟(毫秒) |
/// | JWT_SECRET | 开发环境自动生成 | 至少 32 字符，非开发环境必填 |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌有效期 |
/// | JWT_ISSUER | club-server | 令牌签发者 |
/// | JWT_AUDIENCE | club-clients | 令牌受众 |
/// | BOOTSTRAP_ADMIN_USERNAME | - | 用户表为空时创建的管理员 |
/// | BOOTSTRAP_ADMIN_PASSWORD | - | 同上 |
/// | LOG_LEVEL | info | `RUST_LOG` 未设置时的日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | - | 按天滚动的日志目录 |
///
/// # 示例
///
/// ```ignore
/// STORE_BACKEND=postgres DATABASE_URL=postgres://localhost/club HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub member_schema: MemberSchema,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 登录固定延迟 (毫秒)，防止时序攻击
    pub login_delay_ms: u64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// `JWT_SECRET` 未设置，使用了临时生成的密钥
    pub jwt_secret_generated: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            environment: "development".into(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            member_schema: MemberSchema::default(),
            request_timeout_ms: 30000,
            login_delay_ms: 500,
            jwt: JwtConfig::default(),
            jwt_secret_generated: true,
            bootstrap_admin: None,
            log_level: None,
            log_json: false,
            log_dir: None,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值。非开发环境缺少 `JWT_SECRET`，
    /// 或 postgres 后端缺少 `DATABASE_URL` 时返回错误。
    pub fn from_env() -> Result<Self, ServerError> {
        let defaults = Self::default();
        let environment = env_opt("ENVIRONMENT").unwrap_or(defaults.environment);

        let store_backend = match env_opt("STORE_BACKEND") {
            Some(raw) => raw.parse().map_err(ServerError::Config)?,
            None => StoreBackend::Memory,
        };
        let database_url = env_opt("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ServerError::Config(
                "DATABASE_URL is required when STORE_BACKEND=postgres".into(),
            ));
        }

        let member_schema = match env_opt("MEMBER_SCHEMA") {
            Some(raw) => raw.parse().map_err(ServerError::Config)?,
            None => MemberSchema::default(),
        };

        let (secret, jwt_secret_generated) = match env_opt("JWT_SECRET") {
            Some(secret) => {
                check_secret(&secret).map_err(|e| ServerError::Config(e.to_string()))?;
                (secret, false)
            }
            None if environment == "development" => (generate_printable_secret(), true),
            None => {
                return Err(ServerError::Config(format!(
                    "JWT_SECRET must be set when ENVIRONMENT={}",
                    environment
                )));
            }
        };
        let jwt = JwtConfig {
            secret,
            expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", defaults.jwt.expiration_minutes),
            issuer: env_opt("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
            audience: env_opt("JWT_AUDIENCE").unwrap_or(defaults.jwt.audience),
        };

        let bootstrap_admin = match (
            env_opt("BOOTSTRAP_ADMIN_USERNAME"),
            env_opt("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            _ => {
                return Err(ServerError::Config(
                    "BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .into(),
                ));
            }
        };

        Ok(Self {
            http_port: env_parse("HTTP_PORT", defaults.http_port),
            environment,
            store_backend,
            database_url,
            member_schema,
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            login_delay_ms: env_parse("LOGIN_DELAY_MS", defaults.login_delay_ms),
            jwt,
            jwt_secret_generated,
            bootstrap_admin,
            log_level: env_opt("LOG_LEVEL"),
            log_json: env_parse("LOG_JSON", false),
            log_dir: env_opt("LOG_DIR"),
        })
    }

    /// 加载配置时发现的问题，日志初始化后由 `main` 输出
    pub fn startup_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.jwt_secret_generated {
            warnings.push(
                "JWT_SECRET not set, using a temporary key; tokens will not survive a restart",
            );
        }
        warnings
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
