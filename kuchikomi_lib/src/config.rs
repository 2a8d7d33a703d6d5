//! Extractor settings, with environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use kuchikomi_http::{ClientConfig, UserAgent};

pub const DEFAULT_PAGE_DELAY_MS: u64 = 2000;
pub const DEFAULT_DETAIL_DELAY_MS: u64 = 250;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Knobs for one [`Extractor`](crate::Extractor).
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Pause between successive listing pages.
    pub page_delay: Duration,
    /// Pause between successive detail-page fetches within a page.
    pub detail_delay: Duration,
    pub timeout: Duration,
    pub user_agent: UserAgent,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            detail_delay: Duration::from_millis(DEFAULT_DETAIL_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: UserAgent::default(),
        }
    }
}

impl ExtractorConfig {
    /// Reads `KUCHIKOMI_PAGE_DELAY_MS`, `KUCHIKOMI_DETAIL_DELAY_MS`,
    /// `KUCHIKOMI_TIMEOUT_SECS` and `KUCHIKOMI_USER_AGENT`, falling back to
    /// the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            page_delay: Duration::from_millis(env_u64(
                "KUCHIKOMI_PAGE_DELAY_MS",
                DEFAULT_PAGE_DELAY_MS,
            )),
            detail_delay: Duration::from_millis(env_u64(
                "KUCHIKOMI_DETAIL_DELAY_MS",
                DEFAULT_DETAIL_DELAY_MS,
            )),
            timeout: Duration::from_secs(env_u64("KUCHIKOMI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            user_agent: std::env::var("KUCHIKOMI_USER_AGENT")
                .map(|v| UserAgent::from_setting(&v))
                .unwrap_or_default(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
        }
    }
}

/// Path of an extra adapter file from `KUCHIKOMI_ADAPTERS`.
pub fn adapters_path_from_env() -> Option<PathBuf> {
    env_string("KUCHIKOMI_ADAPTERS").map(PathBuf::from)
}

/// Base URL override from `KUCHIKOMI_BASE_URL`.
pub fn base_url_from_env() -> Option<String> {
    env_string("KUCHIKOMI_BASE_URL")
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test touches distinct variables so they can run in parallel.

    #[test]
    fn env_u64_fallbacks() {
        std::env::remove_var("KUCHIKOMI_TEST_MISSING");
        assert_eq!(env_u64("KUCHIKOMI_TEST_MISSING", 7), 7);

        std::env::set_var("KUCHIKOMI_TEST_GARBAGE", "soon");
        assert_eq!(env_u64("KUCHIKOMI_TEST_GARBAGE", 7), 7);

        std::env::set_var("KUCHIKOMI_TEST_SET", " 1500 ");
        assert_eq!(env_u64("KUCHIKOMI_TEST_SET", 7), 1500);
    }

    #[test]
    fn blank_strings_are_unset() {
        std::env::set_var("KUCHIKOMI_TEST_BLANK", "   ");
        assert_eq!(env_string("KUCHIKOMI_TEST_BLANK"), None);
    }

    #[test]
    fn defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.page_delay, Duration::from_secs(2));
        assert_eq!(config.detail_delay, Duration::from_millis(250));
        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, UserAgent::Rotating);
    }
}
