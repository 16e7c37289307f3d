use thiserror::Error;

/// 启动和运行阶段的服务器错误
///
/// 请求级别的错误使用 [`AppError`](crate::utils::AppError)，这里只覆盖
/// 配置、数据库连接、迁移和监听端口等进程级失败。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储初始化失败: {0}")]
    Store(#[from] crate::db::RepoError),

    #[error("业务初始化失败: {0}")]
    Bootstrap(#[from] crate::utils::AppError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 服务器启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
