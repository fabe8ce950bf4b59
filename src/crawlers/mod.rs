pub mod crawler;
pub mod fetcher;
pub mod web;
pub mod worker;


use crate::config::{Backend, CrawlerConfig};
use fetcher::BrowserBackend;
use std::sync::Arc;

/// Instantiates the backend a deployment is configured for
pub fn backend_for(config: &CrawlerConfig) -> Arc<dyn BrowserBackend> {
    match config.backend {
        Backend::WebDriver => Arc::new(web::WebDriverBackend::from_config(config)),
    }
}
