//! yt-dlp Extractor - 调用外部 yt-dlp 进程
//!
//! 实现 MediaExtractorPort trait
//!
//! 直链模式: yt-dlp -f best -g --no-warnings --no-playlist <url>
//! 音频模式: yt-dlp -f bestaudio/best -x --audio-format mp3 ... -o <file> <url>
//! （转码由 yt-dlp 内部调用 ffmpeg 完成）

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::application::ports::{
    first_http_url, format_selector, ExtractionError, MediaExtractorPort,
};

/// yt-dlp 提取器配置
#[derive(Debug, Clone)]
pub struct YtDlpExtractorConfig {
    /// 可执行文件路径或名称
    pub binary: PathBuf,
    /// ffmpeg 所在位置（未设置时由 yt-dlp 自行查找）
    pub ffmpeg_location: Option<PathBuf>,
    /// 单次调用最长执行时间（秒），0 表示不限制
    pub timeout_secs: u64,
}

impl Default for YtDlpExtractorConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            ffmpeg_location: None,
            timeout_secs: 600,
        }
    }
}

/// yt-dlp 提取器
pub struct YtDlpExtractor {
    config: YtDlpExtractorConfig,
}

impl YtDlpExtractor {
    pub fn new(config: YtDlpExtractorConfig) -> Self {
        Self { config }
    }

    /// 直链模式参数
    fn resolve_args(url: &str, quality: &str) -> Vec<OsString> {
        vec![
            "-f".into(),
            format_selector(quality).into(),
            "-g".into(),
            "--no-warnings".into(),
            "--no-playlist".into(),
            url.into(),
        ]
    }

    /// 音频模式参数
    fn audio_args(&self, url: &str, out_file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            "bestaudio/best".into(),
            "-x".into(),
            "--audio-format".into(),
            "mp3".into(),
            "--audio-quality".into(),
            "0".into(),
            "--no-playlist".into(),
            "--restrict-filenames".into(),
            "--no-warnings".into(),
            // 默认会把 mtime 设为上传日期，Janitor 按 mtime 判定年龄
            "--no-mtime".into(),
            "-o".into(),
            out_file.as_os_str().to_owned(),
        ];
        if let Some(ffmpeg) = &self.config.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.as_os_str().to_owned());
        }
        args.push(url.into());
        args
    }

    /// 运行 yt-dlp，非零退出视为失败
    async fn run(&self, args: Vec<OsString>) -> Result<Output, ExtractionError> {
        let mut command = Command::new(&self.config.binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = if self.config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_secs),
                command.output(),
            )
            .await
            .map_err(|_| ExtractionError::Timeout(self.config.timeout_secs))?
        } else {
            command.output().await
        };
        let output = result.map_err(|e| ExtractionError::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("Extractor exited with {}", output.status)
            } else {
                stderr
            };
            tracing::warn!(status = %output.status, error = %message, "yt-dlp failed");
            return Err(ExtractionError::ProcessFailed(message));
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaExtractorPort for YtDlpExtractor {
    async fn resolve_direct_url(
        &self,
        url: &str,
        quality: &str,
    ) -> Result<String, ExtractionError> {
        tracing::debug!(url = %url, quality = %quality, "Resolving direct media URL");

        let output = self.run(Self::resolve_args(url, quality)).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        first_http_url(&stdout).ok_or(ExtractionError::NoMediaUrl)
    }

    async fn extract_audio(&self, url: &str, out_file: &Path) -> Result<(), ExtractionError> {
        tracing::debug!(url = %url, out_file = %out_file.display(), "Extracting audio");

        self.run(self.audio_args(url, out_file)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_resolve_args() {
        let args = strings(&YtDlpExtractor::resolve_args("https://youtu.be/abc", "highest"));
        assert_eq!(
            args,
            ["-f", "best", "-g", "--no-warnings", "--no-playlist", "https://youtu.be/abc"]
        );
    }

    #[test]
    fn test_audio_args() {
        let extractor = YtDlpExtractor::new(YtDlpExtractorConfig {
            ffmpeg_location: Some(PathBuf::from("/opt/ffmpeg")),
            ..Default::default()
        });
        let args = strings(&extractor.audio_args("https://youtu.be/abc", Path::new("/tmp/x.mp3")));

        assert!(args.windows(2).any(|w| w == ["--audio-format", "mp3"]));
        assert!(args.windows(2).any(|w| w == ["-o", "/tmp/x.mp3"]));
        assert!(args.windows(2).any(|w| w == ["--ffmpeg-location", "/opt/ffmpeg"]));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--restrict-filenames".to_string()));
        assert!(args.contains(&"--no-mtime".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let extractor = YtDlpExtractor::new(YtDlpExtractorConfig {
            binary: PathBuf::from("/nonexistent/yt-dlp-binary"),
            ..Default::default()
        });

        let err = extractor
            .resolve_direct_url("https://youtu.be/abc", "best")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Spawn(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_reports_stderr() {
        // `false` 忽略所有参数并以 1 退出
        let extractor = YtDlpExtractor::new(YtDlpExtractorConfig {
            binary: PathBuf::from("false"),
            ..Default::default()
        });

        let err = extractor
            .resolve_direct_url("https://youtu.be/abc", "best")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ProcessFailed(_)));
    }
}
