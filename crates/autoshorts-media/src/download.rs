//! Video download using yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::cookies::writable_cookies_path;
use crate::error::{MediaError, MediaResult};

/// Fetches the media file of a single video.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download `video_id` at no more than `resolution` (e.g. "480p") to
    /// `output_path`.
    async fn download(&self, video_id: &str, resolution: &str, output_path: &Path)
        -> MediaResult<()>;
}

/// Height in pixels from a resolution label such as "480p" or "1080".
pub fn parse_resolution(resolution: &str) -> MediaResult<u32> {
    let trimmed = resolution.trim();
    let digits = trimmed
        .strip_suffix('p')
        .or_else(|| trimmed.strip_suffix('P'))
        .unwrap_or(trimmed);
    match digits.parse::<u32>() {
        Ok(height) if height > 0 => Ok(height),
        _ => Err(MediaError::InvalidResolution(resolution.to_string())),
    }
}

/// yt-dlp format selector preferring mp4 streams capped at `height`.
pub fn format_selector(height: u32) -> String {
    format!(
        "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best[height<={h}]",
        h = height
    )
}

/// yt-dlp process wrapper.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    config: MediaConfig,
}

impl YtDlpDownloader {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(MediaConfig::from_env())
    }

    fn watch_url(&self, video_id: &str) -> String {
        format!(
            "{}/watch?v={}",
            self.config.watch_url.trim_end_matches('/'),
            video_id
        )
    }

    /// Command line arguments for one download.
    pub fn build_args(
        &self,
        video_id: &str,
        height: u32,
        output_path: &Path,
        cookies: Option<&Path>,
    ) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "--concurrent-fragments".to_string(),
            "1".to_string(),
            "-f".to_string(),
            format_selector(height),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "-o".to_string(),
            output_path.to_string_lossy().into_owned(),
        ];

        if let Some(rate) = &self.config.rate_limit {
            args.push("--limit-rate".to_string());
            args.push(rate.clone());
        }
        if let Some(cookies) = cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        args.push(self.watch_url(video_id));
        args
    }

    fn resolve_binary(&self) -> MediaResult<PathBuf> {
        which::which(&self.config.ytdlp_binary)
            .map_err(|e| MediaError::YtDlpNotFound(format!("{}: {}", self.config.ytdlp_binary, e)))
    }

    async fn run(&self, video_id: &str, height: u32, output_path: &Path) -> MediaResult<()> {
        let binary = self.resolve_binary()?;

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let cookies = match &self.config.cookies_path {
            Some(source) => writable_cookies_path(source).await,
            None => None,
        };
        let args = self.build_args(video_id, height, output_path, cookies.as_deref());

        info!(
            video_id = %video_id,
            height,
            output = %output_path.display(),
            "Downloading video"
        );

        let child = Command::new(binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.config.timeout, child)
            .await
            .map_err(|_| MediaError::Timeout(self.config.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            let error_msg = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("Unknown error");
            let err = MediaError::download_failed(format!("yt-dlp failed: {}", error_msg));
            if err.is_rate_limited() {
                warn!(video_id = %video_id, "YouTube rate limit detected");
            }
            return Err(err);
        }

        if !output_path.exists() {
            return Err(MediaError::FileNotFound(output_path.to_path_buf()));
        }

        let file_size = tokio::fs::metadata(output_path).await?.len();
        info!(
            video_id = %video_id,
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );
        Ok(())
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    async fn download(
        &self,
        video_id: &str,
        resolution: &str,
        output_path: &Path,
    ) -> MediaResult<()> {
        let height = parse_resolution(resolution)?;
        let start = Instant::now();

        let result = self.run(video_id, height, output_path).await;

        let status = if result.is_ok() { "success" } else { "error" };
        counter!("media_downloads_total", "status" => status).increment(1);
        histogram!("media_download_duration_seconds").record(start.elapsed().as_secs_f64());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("480p").unwrap(), 480);
        assert_eq!(parse_resolution("1080").unwrap(), 1080);
        assert_eq!(parse_resolution(" 720P ").unwrap(), 720);
        assert!(matches!(
            parse_resolution("hd"),
            Err(MediaError::InvalidResolution(_))
        ));
        assert!(parse_resolution("0p").is_err());
    }

    #[test]
    fn test_format_selector_caps_height() {
        let selector = format_selector(480);
        assert!(selector.starts_with("bestvideo[height<=480][ext=mp4]"));
        assert!(selector.ends_with("/best[height<=480]"));
    }

    #[test]
    fn test_build_args() {
        let downloader = YtDlpDownloader::new(MediaConfig {
            rate_limit: Some("2M".to_string()),
            ..MediaConfig::default()
        });
        let args = downloader.build_args(
            "dQw4w9WgXcQ",
            480,
            Path::new("/tmp/out/video.mp4"),
            Some(Path::new("/tmp/cookies.txt")),
        );

        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-o") + 1], "/tmp/out/video.mp4");
        assert_eq!(args[pos("--merge-output-format") + 1], "mp4");
        assert_eq!(args[pos("--limit-rate") + 1], "2M");
        assert_eq!(args[pos("--cookies") + 1], "/tmp/cookies.txt");
        assert_eq!(args[pos("-f") + 1], format_selector(480));
    }

    #[test]
    fn test_build_args_without_optional_flags() {
        let downloader = YtDlpDownloader::new(MediaConfig::default());
        let args = downloader.build_args("abc", 360, Path::new("v.mp4"), None);
        assert!(!args.iter().any(|a| a == "--cookies"));
        assert!(!args.iter().any(|a| a == "--limit-rate"));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = YtDlpDownloader::new(MediaConfig {
            ytdlp_binary: dir.path().join("no-such-yt-dlp").to_string_lossy().into_owned(),
            ..MediaConfig::default()
        });

        let err = downloader
            .download("abc", "480p", &dir.path().join("video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::YtDlpNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_resolution_fails_before_spawning() {
        let downloader = YtDlpDownloader::new(MediaConfig::default());
        let err = downloader
            .download("abc", "best", Path::new("video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidResolution(_)));
    }
}
