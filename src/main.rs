//! Grabber - 社交媒体下载网关
//!
//! 提交 URL，返回媒体直链，或提取 mp3 后返回一次性下载链接

use std::sync::Arc;
use std::time::Duration;

use grabber::config::{load_config, print_config, LogConfig};
use grabber::infrastructure::http::{AppState, HttpServer, RateLimiter, ServerConfig};
use grabber::infrastructure::{
    FsTempFileStore, Janitor, JanitorConfig, YtDlpExtractor, YtDlpExtractorConfig,
};
use tokio_util::sync::CancellationToken;

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},grabber={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Grabber - media download gateway");
    print_config(&config);

    // 临时文件存储（目录不存在时创建）
    let temp_store = Arc::new(
        FsTempFileStore::new(&config.storage.temp_dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to prepare temp dir: {}", e))?,
    );

    // yt-dlp 提取器
    let extractor = Arc::new(YtDlpExtractor::new(YtDlpExtractorConfig {
        binary: config.extractor.binary.clone(),
        ffmpeg_location: config.extractor.ffmpeg_location.clone(),
        timeout_secs: config.extractor.timeout_secs,
    }));

    // 启动 Janitor
    let shutdown = CancellationToken::new();
    let janitor_handle = if config.janitor.enabled {
        let janitor = Janitor::new(
            JanitorConfig {
                interval: Duration::from_secs(config.janitor.interval_secs),
                max_age: Duration::from_secs(config.janitor.max_age_secs),
            },
            temp_store.clone(),
        );
        Some(tokio::spawn(janitor.run(shutdown.clone())))
    } else {
        None
    };

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(extractor, temp_store);
    let rate_limiter = RateLimiter::from_config(&config.rate_limit);
    let server = HttpServer::new(server_config, state, rate_limiter);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = janitor_handle {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}
