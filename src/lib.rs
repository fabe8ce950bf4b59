pub mod classify;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod fingerprint;
pub mod output;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::CrawlerConfig;
pub use error::{ErrorKind, PageError};
pub use output::{OutputFormat, OutputOptions, format_json, format_markdown, format_text};
pub use results::{ImageInfo, LinkInfo, PageMetadata, PageResult};

use crawlers::fetcher::BrowserBackend;
use crawlers::worker::{CrawlJob, dispatch};
use fingerprint::SignatureTable;
use std::sync::Arc;

/// Entry point for crawling a site and collecting page results.
///
/// The signature table is compiled once here and shared by every crawl
/// started from this value.
pub struct SiteScope {
    config: Arc<CrawlerConfig>,
    signatures: Arc<SignatureTable>,
    backend: Arc<dyn BrowserBackend>,
}

impl SiteScope {
    /// Builds a crawler with the process-wide built-in signature table and
    /// the backend selected by `config`
    pub fn new(config: CrawlerConfig) -> Result<Self, regex::Error> {
        let signatures = SignatureTable::shared()?;
        let backend = crawlers::backend_for(&config);
        Ok(Self {
            config: Arc::new(config),
            signatures,
            backend,
        })
    }

    /// Replace the browser backend
    pub fn with_backend(mut self, backend: Arc<dyn BrowserBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the technology signature table
    pub fn with_signatures(mut self, signatures: SignatureTable) -> Self {
        self.signatures = Arc::new(signatures);
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Output limits taken from the configuration
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions::from(self.config.as_ref())
    }

    /// Crawls up to `max_pages` pages of the site at `seed`.
    ///
    /// Never fails: every problem is reported as an error result, and an
    /// unusable seed yields a single-element list.
    pub async fn crawl(&self, seed: &str, max_pages: usize) -> Vec<PageResult> {
        dispatch(CrawlJob {
            seed: seed.to_string(),
            max_pages,
            backend: Arc::clone(&self.backend),
            signatures: Arc::clone(&self.signatures),
            config: Arc::clone(&self.config),
        })
        .await
    }
}

/// Crawls `seed` with the default configuration (plus `WEBDRIVER_URL`)
pub async fn crawl(seed: &str, max_pages: usize) -> Vec<PageResult> {
    match SiteScope::new(CrawlerConfig::default().with_env_overrides()) {
        Ok(scope) => scope.crawl(seed, max_pages).await,
        Err(e) => vec![classify::classify(
            seed.trim(),
            &error::FetchError::Other(format!("technology signatures failed to compile: {}", e)),
        )],
    }
}
