use std::time::Duration;

use serde::Deserialize;

use crate::models::RESULT_CAP;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// WebDriver server (chromedriver) endpoint
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Video platform base URL
    #[serde(default = "default_video_platform_url")]
    pub video_platform_url: String,

    /// Film database base URL
    #[serde(default = "default_film_database_url")]
    pub film_database_url: String,

    /// Upper bound for every element wait
    #[serde(default = "default_element_wait_timeout_secs")]
    pub element_wait_timeout_secs: u64,

    /// Maximum number of URLs returned per query (kept within 1..=RESULT_CAP)
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    #[serde(default = "default_max_scroll_attempts")]
    pub max_scroll_attempts: u32,

    #[serde(default = "default_scroll_poll_interval_ms")]
    pub scroll_poll_interval_ms: u64,

    #[serde(default = "default_scroll_step_px")]
    pub scroll_step_px: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_video_platform_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_film_database_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_element_wait_timeout_secs() -> u64 {
    10
}

fn default_result_limit() -> usize {
    RESULT_CAP
}

fn default_max_scroll_attempts() -> u32 {
    200
}

fn default_scroll_poll_interval_ms() -> u64 {
    250
}

fn default_scroll_step_px() -> i64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            video_platform_url: default_video_platform_url(),
            film_database_url: default_film_database_url(),
            element_wait_timeout_secs: default_element_wait_timeout_secs(),
            result_limit: default_result_limit(),
            max_scroll_attempts: default_max_scroll_attempts(),
            scroll_poll_interval_ms: default_scroll_poll_interval_ms(),
            scroll_step_px: default_scroll_step_px(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn element_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.element_wait_timeout_secs)
    }

    pub fn scroll_poll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_poll_interval_ms)
    }

    /// Configured result limit, clamped to `1..=RESULT_CAP`.
    /// A limit of 0 would make every query end in `NoResultsFound`.
    pub fn effective_result_limit(&self) -> usize {
        self.result_limit.clamp(1, RESULT_CAP)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
