//! Adapter configuration
//!
//! Settings can be loaded from the environment (and a `.env` file) or built
//! programmatically with the `with_*` setters.

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_VIDEO_POLL_ATTEMPTS: usize = 1;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub access_token: Option<String>,
    pub cookie: Option<String>,
    pub base_uri: Option<String>,
    pub advertiser_id: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    /// Delay between the video upload acknowledgement and the info lookup.
    pub video_poll_interval: Duration,
    /// Number of info lookups before a video upload is reported as failed.
    pub video_poll_attempts: usize,
    pub batch_concurrency: usize,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            cookie: None,
            base_uri: None,
            advertiser_id: None,
            app_id: None,
            app_secret: None,
            video_poll_interval: DEFAULT_VIDEO_POLL_INTERVAL,
            video_poll_attempts: DEFAULT_VIDEO_POLL_ATTEMPTS,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            cache_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let video_poll_interval = match env_opt("TIKTOK_VIDEO_POLL_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(parse_number("TIKTOK_VIDEO_POLL_INTERVAL_MS", &raw)?),
            None => DEFAULT_VIDEO_POLL_INTERVAL,
        };
        let video_poll_attempts = match env_opt("TIKTOK_VIDEO_POLL_ATTEMPTS") {
            Some(raw) => parse_number("TIKTOK_VIDEO_POLL_ATTEMPTS", &raw)? as usize,
            None => DEFAULT_VIDEO_POLL_ATTEMPTS,
        };
        let batch_concurrency = match env_opt("TIKTOK_BATCH_CONCURRENCY") {
            Some(raw) => parse_number("TIKTOK_BATCH_CONCURRENCY", &raw)? as usize,
            None => DEFAULT_BATCH_CONCURRENCY,
        };

        Ok(Self {
            access_token: env_opt("TIKTOK_ACCESS_TOKEN"),
            cookie: env_opt("TIKTOK_COOKIE"),
            base_uri: env_opt("TIKTOK_BASE_URI"),
            advertiser_id: env_opt("TIKTOK_ADVERTISER_ID"),
            app_id: env_opt("TIKTOK_APP_ID"),
            app_secret: env_opt("TIKTOK_APP_SECRET"),
            video_poll_interval,
            video_poll_attempts,
            batch_concurrency,
            cache_dir: env_opt("TIKTOK_CACHE_DIR").map(PathBuf::from),
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_advertiser_id(mut self, advertiser_id: impl Into<String>) -> Self {
        self.advertiser_id = Some(advertiser_id.into());
        self
    }

    pub fn with_app_credentials(
        mut self,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        self.app_id = Some(app_id.into());
        self.app_secret = Some(app_secret.into());
        self
    }

    pub fn with_video_poll(mut self, interval: Duration, attempts: usize) -> Self {
        self.video_poll_interval = interval;
        self.video_poll_attempts = attempts;
        self
    }

    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Configured advertiser id, ignoring empty values.
    pub fn advertiser_id(&self) -> Option<&str> {
        usable(&self.advertiser_id)
    }
}

/// Treat empty strings the same as an unset value.
pub(crate) fn usable(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{} must be a non-negative integer", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.video_poll_interval, Duration::from_secs(1));
        assert_eq!(config.video_poll_attempts, 1);
        assert_eq!(config.batch_concurrency, 5);
        assert!(config.access_token.is_none());
        assert!(config.cookie.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let config = Config::default()
            .with_access_token("token")
            .with_app_credentials("app", "secret")
            .with_advertiser_id("42")
            .with_batch_concurrency(2);

        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(config.app_id.as_deref(), Some("app"));
        assert_eq!(config.app_secret.as_deref(), Some("secret"));
        assert_eq!(config.advertiser_id(), Some("42"));
        assert_eq!(config.batch_concurrency, 2);
    }

    #[test]
    fn test_empty_advertiser_id_is_unset() {
        let config = Config::default().with_advertiser_id("  ");
        assert_eq!(config.advertiser_id(), None);
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        let err = parse_number("TIKTOK_BATCH_CONCURRENCY", "five").unwrap_err();
        assert!(err.to_string().contains("TIKTOK_BATCH_CONCURRENCY"));
        assert_eq!(parse_number("X", " 250 ").unwrap(), 250);
    }
}
