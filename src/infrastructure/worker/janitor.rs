//! Janitor - 临时文件兜底清理
//!
//! 定时扫描临时目录，删除超过最大存活时间、始终未被领取的音频文件。
//! 与请求处理并发运行，删除竞争由文件系统保证（已删除的文件再删为 no-op）

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{SweepReport, TempFileStorePort};

/// Janitor 配置
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// 扫描间隔
    pub interval: Duration,
    /// 文件最大存活时间
    pub max_age: Duration,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10 * 60),
            max_age: Duration::from_secs(30 * 60),
        }
    }
}

/// Janitor
pub struct Janitor {
    config: JanitorConfig,
    store: Arc<dyn TempFileStorePort>,
}

impl Janitor {
    pub fn new(config: JanitorConfig, store: Arc<dyn TempFileStorePort>) -> Self {
        Self { config, store }
    }

    /// 执行一次清理
    pub async fn sweep_once(&self) -> SweepReport {
        let report = self.store.sweep(self.config.max_age).await;

        if report.removed > 0 {
            tracing::info!(
                scanned = report.scanned,
                removed = report.removed,
                "Janitor removed stale temp files"
            );
        } else {
            tracing::debug!(scanned = report.scanned, "Janitor sweep finished");
        }

        report
    }

    /// 启动 Janitor，直到 `shutdown` 被取消
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            max_age_secs = self.config.max_age.as_secs(),
            "Janitor started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }

        tracing::info!("Janitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::FsTempFileStore;
    use std::time::SystemTime;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sweep_once_uses_max_age() {
        let temp_dir = tempdir().unwrap();
        let store = Arc::new(FsTempFileStore::new(temp_dir.path()).await.unwrap());

        let stale = temp_dir.path().join("stale.mp3");
        std::fs::write(&stale, b"x").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();
        let fresh = temp_dir.path().join("fresh.mp3");
        std::fs::write(&fresh, b"x").unwrap();

        let janitor = Janitor::new(JanitorConfig::default(), store);
        let report = janitor.sweep_once().await;

        assert_eq!(report.removed, 1);
        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_run_sweeps_on_tick_and_stops() {
        let temp_dir = tempdir().unwrap();
        let store = Arc::new(FsTempFileStore::new(temp_dir.path()).await.unwrap());
        let stale = temp_dir.path().join("stale.mp3");
        std::fs::write(&stale, b"x").unwrap();

        let janitor = Janitor::new(
            JanitorConfig {
                interval: Duration::from_millis(20),
                max_age: Duration::ZERO,
            },
            store,
        );
        let token = CancellationToken::new();
        let handle = tokio::spawn(janitor.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!stale.exists());

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
