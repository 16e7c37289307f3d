use club_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境 (.env) 与配置
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;

    // 2. 日志
    init_logger(
        config.log_level.as_deref(),
        config.log_json,
        config.log_dir.as_deref(),
    );
    tracing::info!("Club server starting (env: {})", config.environment);
    for warning in config.startup_warnings() {
        tracing::warn!("{}", warning);
    }

    // 3. 服务器状态 (存储、服务、首个管理员)
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP 服务
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
