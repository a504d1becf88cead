//! Media file downloads.
//!
//! This crate provides:
//! - The [`MediaDownloader`] seam used by the download orchestrator
//! - A yt-dlp backed implementation with resolution-capped format selection
//! - Cookie file handling for authenticated YouTube downloads

pub mod config;
pub mod cookies;
pub mod download;
pub mod error;

pub use config::MediaConfig;
pub use cookies::{is_valid_netscape_cookies, writable_cookies_path};
pub use download::{format_selector, parse_resolution, MediaDownloader, YtDlpDownloader};
pub use error::{MediaError, MediaResult};
