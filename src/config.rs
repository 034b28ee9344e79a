use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3002";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration for the remote side. The base URL comes from the
/// environment (`ROLLBOOKD_API_URL`) and can be overridden per session via
/// `workspace.select`.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("ROLLBOOKD_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let http_timeout = std::env::var("ROLLBOOKD_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        Self {
            api_base_url,
            http_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}
