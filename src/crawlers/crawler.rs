use crate::classify::classify;
use crate::config::CrawlerConfig;
use crate::crawlers::fetcher::{BrowserBackend, PageFetcher, check_status, dns_precheck};
use crate::error::FetchError;
use crate::filter::{UrlFilter, frontier_key, normalize_url};
use crate::fingerprint::SignatureTable;
use crate::parsers;
use crate::results::{PageResult, ResultAggregator};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use url::Url;

/// Lifecycle of one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Running,
    Done,
}

/// Breadth-first queue of discovered URLs plus the set already fetched.
///
/// A URL is never in the queue and the visited set at the same time, and
/// `queued + visited` never grows past the page budget.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<Url>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    max_pages: usize,
}

impl Frontier {
    pub fn new(seed: Url, max_pages: usize) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            max_pages,
        };
        frontier.queued.insert(frontier_key(&seed));
        frontier.queue.push_back(seed);
        frontier
    }

    /// Next URL to fetch, already moved into the visited set. None once the
    /// queue is empty or the budget is spent.
    pub fn pop_next(&mut self) -> Option<Url> {
        while self.visited.len() < self.max_pages {
            let url = self.queue.pop_front()?;
            let key = frontier_key(&url);
            self.queued.remove(&key);
            if !self.visited.insert(key) {
                ::log::trace!("Skipping already visited: {}", url);
                continue;
            }
            return Some(url);
        }
        None
    }

    /// Queues `url` unless it is known or the budget has no room left.
    /// Returns true when the URL was queued.
    pub fn offer(&mut self, url: Url) -> bool {
        if self.queue.len() + self.visited.len() >= self.max_pages {
            return false;
        }
        let key = frontier_key(&url);
        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }
        self.queued.insert(key);
        self.queue.push_back(url);
        true
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }
}

/// Sequential breadth-first crawler over one site
pub struct Crawler {
    backend: Arc<dyn BrowserBackend>,
    signatures: Arc<SignatureTable>,
    config: Arc<CrawlerConfig>,
    phase: CrawlPhase,
}

impl Crawler {
    pub fn new(
        backend: Arc<dyn BrowserBackend>,
        signatures: Arc<SignatureTable>,
        config: Arc<CrawlerConfig>,
    ) -> Self {
        Self {
            backend,
            signatures,
            config,
            phase: CrawlPhase::Idle,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn transition(&mut self, phase: CrawlPhase) {
        ::log::debug!("Crawl phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Crawls up to `max_pages` pages starting at `seed`.
    ///
    /// Always returns at least one result: precondition failures (bad seed,
    /// unresolvable domain, browser unavailable) yield a single error result.
    pub async fn run(&mut self, seed: &str, max_pages: usize) -> Vec<PageResult> {
        let max_pages = max_pages.max(1);
        self.transition(CrawlPhase::Running);
        let results = self.crawl(seed, max_pages).await;
        self.transition(CrawlPhase::Done);
        ::log::info!("Crawl of {} finished with {} results", seed.trim(), results.len());
        results
    }

    async fn crawl(&self, seed: &str, max_pages: usize) -> Vec<PageResult> {
        let seed_url = match normalize_url(seed) {
            Ok(url) => url,
            Err(e) => return vec![classify(seed.trim(), &e)],
        };
        ::log::info!("Starting crawl of {} (max {} pages)", seed_url, max_pages);

        if self.config.dns_precheck {
            if let Err(e) = dns_precheck(&seed_url, self.config.dns_timeout()).await {
                return vec![classify(seed_url.as_str(), &e)];
            }
        }

        let filter = match UrlFilter::new(&self.config.include_patterns, &self.config.exclude_patterns) {
            Ok(filter) => filter,
            Err(e) => return vec![classify(seed_url.as_str(), &FetchError::Other(e.to_string()))],
        };

        let mut session = match self.backend.open_session().await {
            Ok(session) => Some(session),
            Err(e) => return vec![classify(seed_url.as_str(), &e)],
        };
        ::log::debug!("Opened {} session", self.backend.name());

        let mut frontier = Frontier::new(seed_url, max_pages);
        let mut results = ResultAggregator::new();

        while let Some(url) = frontier.pop_next() {
            let Some(active) = session.as_mut() else {
                break;
            };
            ::log::info!("Fetching {} ({}/{})", url, frontier.visited_count(), max_pages);

            let outcome = active.fetch(&url).await.and_then(|page| check_status(&url, page));
            match outcome {
                Ok(page) => {
                    let result = parsers::analyze(&page, &url, &self.signatures);
                    let queued = self.enqueue_links(&result, &url, &filter, &mut frontier);
                    ::log::debug!("Queued {} new links from {}", queued, url);
                    results.push(result);
                }
                Err(e) => {
                    let lost_session = matches!(e, FetchError::Session(_));
                    results.push(classify(url.as_str(), &e));
                    if lost_session {
                        let Some(dead) = session.take() else {
                            break;
                        };
                        session = self.reopen(dead).await;
                    }
                }
            }
        }

        if frontier.queued_count() > 0 {
            ::log::warn!("Stopped with {} URLs still queued", frontier.queued_count());
        }
        if let Some(session) = session {
            session.close().await;
        }
        results.into_results()
    }

    /// Queues the internal links of a page in discovery order
    fn enqueue_links(&self, result: &PageResult, page_url: &Url, filter: &UrlFilter, frontier: &mut Frontier) -> usize {
        let mut queued = 0;
        for link in result.internal_links() {
            let Ok(mut link_url) = Url::parse(&link.url) else {
                continue;
            };
            if !filter.should_crawl(&link_url, page_url) {
                continue;
            }
            link_url.set_fragment(None);
            if frontier.offer(link_url) {
                queued += 1;
            }
        }
        queued
    }

    /// Replaces a session that died mid-crawl so the remaining pages still
    /// get a browser. The failed page itself is not retried.
    async fn reopen(&self, dead: Box<dyn PageFetcher>) -> Option<Box<dyn PageFetcher>> {
        ::log::warn!("Browser session lost, reconnecting");
        dead.close().await;
        match self.backend.open_session().await {
            Ok(session) => {
                ::log::info!("Reconnected {} session", self.backend.name());
                Some(session)
            }
            Err(e) => {
                ::log::error!("Failed to reconnect browser session: {}", e);
                None
            }
        }
    }
}
