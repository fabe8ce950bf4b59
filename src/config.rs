use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Browser-automation backends a deployment can choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Chrome/Firefox through a WebDriver server
    #[default]
    WebDriver,
}

/// Configuration for the crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Automation backend used to render pages
    #[serde(default)]
    pub backend: Backend,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent override passed to the browser
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-page navigation bound in seconds
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Wait after document-ready for deferred rendering, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Resolve the seed domain before launching the browser
    #[serde(default = "default_dns_precheck")]
    pub dns_precheck: bool,

    /// Bound for the seed DNS lookup in seconds
    #[serde(default = "default_dns_timeout_secs")]
    pub dns_timeout_secs: u64,

    /// Page budget used when the caller does not give one
    #[serde(default = "default_max_pages")]
    pub default_max_pages: usize,

    /// Regex patterns a discovered URL must match to be queued
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns that keep a discovered URL out of the queue
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Length of the content preview in JSON output
    #[serde(default = "default_content_preview_chars")]
    pub content_preview_chars: usize,

    /// Content length after which the text output truncates
    #[serde(default = "default_text_content_limit")]
    pub text_content_limit: usize,
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_page_timeout_secs() -> u64 {
    15
}

fn default_settle_delay_ms() -> u64 {
    1500
}

fn default_dns_precheck() -> bool {
    true
}

fn default_dns_timeout_secs() -> u64 {
    5
}

fn default_max_pages() -> usize {
    3
}

fn default_content_preview_chars() -> usize {
    500
}

fn default_text_content_limit() -> usize {
    5000
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            user_agent: None,
            page_timeout_secs: default_page_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            dns_precheck: default_dns_precheck(),
            dns_timeout_secs: default_dns_timeout_secs(),
            default_max_pages: default_max_pages(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            content_preview_chars: default_content_preview_chars(),
            text_content_limit: default_text_content_limit(),
        }
    }
}

impl CrawlerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment
    /// variable if it is set
    pub fn with_env_overrides(self) -> Self {
        self.with_webdriver_override(std::env::var("WEBDRIVER_URL").ok())
    }

    fn with_webdriver_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.filter(|u| !u.trim().is_empty()) {
            self.webdriver_url = url;
        }
        self
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}
