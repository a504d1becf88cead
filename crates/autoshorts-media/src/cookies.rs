//! Netscape cookies file handling for yt-dlp.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A real Netscape cookies file is at least ~50 bytes.
const MIN_COOKIES_FILE_SIZE: u64 = 50;

/// Guards concurrent copies of the cookies file.
static COOKIES_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Validate that a cookies file appears to be in Netscape format.
///
/// Netscape cookies files either start with "# Netscape HTTP Cookie File"
/// or contain tab-separated lines with domain entries.
pub fn is_valid_netscape_cookies(content: &str) -> bool {
    if content.starts_with("# Netscape HTTP Cookie File")
        || content.starts_with("# HTTP Cookie File")
    {
        return true;
    }

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .any(|line| line.split('\t').count() >= 6)
}

/// Copy `source` next to the system temp dir so yt-dlp can write back to it.
///
/// Returns `None` when the file is missing, too small, or not in Netscape
/// format. A bad cookies file only degrades the download, so problems are
/// logged rather than returned.
pub async fn writable_cookies_path(source: &Path) -> Option<PathBuf> {
    let metadata = match tokio::fs::metadata(source).await {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("Cookies file {} unavailable: {}", source.display(), e);
            return None;
        }
    };

    if metadata.len() < MIN_COOKIES_FILE_SIZE {
        debug!(
            "Cookies file {} is too small ({} bytes), skipping",
            source.display(),
            metadata.len()
        );
        return None;
    }

    match tokio::fs::read_to_string(source).await {
        Ok(content) if is_valid_netscape_cookies(&content) => {}
        Ok(_) => {
            debug!(
                "Cookies file {} is not in valid Netscape format, skipping",
                source.display()
            );
            return None;
        }
        Err(e) => {
            warn!("Failed to read cookies file: {}", e);
            return None;
        }
    }

    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cookies.txt".to_string());
    let target = std::env::temp_dir().join(format!("autoshorts-{file_name}"));

    let _guard = COOKIES_LOCK.get_or_init(|| Mutex::new(())).lock().await;
    if !target.exists() {
        if let Err(e) = tokio::fs::copy(source, &target).await {
            warn!("Failed to copy cookies file to temp: {}", e);
            return None;
        }
        debug!("Copied cookies file to {}", target.display());
    }

    info!("Using cookies file for YouTube authentication");
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Netscape HTTP Cookie File\n\
        .youtube.com\tTRUE\t/\tTRUE\t1767225600\tPREF\tf6=40000000&hl=en\n";

    #[test]
    fn test_netscape_header_is_valid() {
        assert!(is_valid_netscape_cookies(SAMPLE));
        assert!(is_valid_netscape_cookies("# HTTP Cookie File\n"));
    }

    #[test]
    fn test_headerless_tab_separated_lines_are_valid() {
        let content = "# comment\n\n.youtube.com\tTRUE\t/\tFALSE\t0\tSID\tabc\n";
        assert!(is_valid_netscape_cookies(content));
    }

    #[test]
    fn test_json_cookies_are_rejected() {
        assert!(!is_valid_netscape_cookies(r#"[{"name": "SID", "value": "abc"}]"#));
        assert!(!is_valid_netscape_cookies(""));
    }

    #[tokio::test]
    async fn test_missing_or_small_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(writable_cookies_path(&dir.path().join("absent.txt")).await.is_none());

        let small = dir.path().join("small.txt");
        std::fs::write(&small, "# Netscape").unwrap();
        assert!(writable_cookies_path(&small).await.is_none());
    }

    #[tokio::test]
    async fn test_valid_file_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("media-test-cookies.txt");
        std::fs::write(&source, SAMPLE).unwrap();

        let copy = writable_cookies_path(&source).await.unwrap();
        assert_ne!(copy, source);
        assert!(copy.exists());
    }
}
