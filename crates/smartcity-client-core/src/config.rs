use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_API_BASE_URL: &str = "SMARTCITY_API_BASE_URL";
pub const ENV_STATS_POLL_MS: &str = "SMARTCITY_STATS_POLL_MS";
pub const PREFERENCES_STORAGE_KEY: &str = "smartCityPrefs";
pub const DEFAULT_STATS_POLL_INTERVAL: Duration = Duration::from_millis(30_000);
pub const DEFAULT_TOAST_DISPLAY: Duration = Duration::from_millis(3_000);
pub const DEFAULT_TOAST_EXIT_ANIMATION: Duration = Duration::from_millis(300);
pub const DEFAULT_ROUTINE_RELOAD_DELAY: Duration = Duration::from_millis(1_000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin. Empty means same-origin relative paths.
    pub base_url: String,
    pub stats_poll_interval: Duration,
    pub toast_display: Duration,
    pub toast_exit_animation: Duration,
    pub routine_reload_delay: Duration,
    pub request_timeout: Duration,
    pub preferences_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            stats_poll_interval: DEFAULT_STATS_POLL_INTERVAL,
            toast_display: DEFAULT_TOAST_DISPLAY,
            toast_exit_animation: DEFAULT_TOAST_EXIT_ANIMATION,
            routine_reload_delay: DEFAULT_ROUTINE_RELOAD_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            preferences_key: PREFERENCES_STORAGE_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Resolves the config from `SMARTCITY_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = env_non_empty(ENV_API_BASE_URL) {
            config.base_url = normalize_base_url(&base_url)?;
        }
        if let Some(raw) = env_non_empty(ENV_STATS_POLL_MS) {
            config.stats_poll_interval = parse_poll_interval(&raw)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let trimmed = path.trim();
        if trimmed.starts_with('/') {
            format!("{}{trimmed}", self.base_url)
        } else {
            format!("{}/{trimmed}", self.base_url)
        }
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidBaseUrl);
    };
    if !matches!(scheme, "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl);
    }
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ConfigError::InvalidBaseUrl);
    }
    Ok(trimmed.to_string())
}

fn parse_poll_interval(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Duration::from_millis(millis)),
        _ => Err(ConfigError::InvalidPollInterval {
            raw: raw.to_string(),
        }),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
