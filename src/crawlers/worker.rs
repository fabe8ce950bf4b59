use crate::classify::classify;
use crate::config::CrawlerConfig;
use crate::crawlers::crawler::Crawler;
use crate::crawlers::fetcher::BrowserBackend;
use crate::error::FetchError;
use crate::fingerprint::SignatureTable;
use crate::results::PageResult;
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

/// A crawl request handed to a worker thread
pub struct CrawlJob {
    pub seed: String,
    pub max_pages: usize,
    pub backend: Arc<dyn BrowserBackend>,
    pub signatures: Arc<SignatureTable>,
    pub config: Arc<CrawlerConfig>,
}

/// Runs `job` on a dedicated thread with its own single-threaded runtime and
/// awaits the results without blocking the caller's executor.
///
/// The browser session, frontier and visited set all live on that thread;
/// only the job goes in and only the result list comes back.
pub async fn dispatch(job: CrawlJob) -> Vec<PageResult> {
    let seed = job.seed.clone();
    let (result_tx, result_rx) = oneshot::channel::<Vec<PageResult>>();

    let spawned = thread::Builder::new()
        .name("crawl-worker".to_string())
        .spawn(move || run_job(job, result_tx));

    if let Err(e) = spawned {
        ::log::error!("Failed to spawn crawl worker: {}", e);
        return worker_failure(&seed, format!("could not start crawl worker: {}", e));
    }

    match result_rx.await {
        Ok(results) => results,
        Err(_) => {
            ::log::error!("Crawl worker for {} exited without a result", seed);
            worker_failure(&seed, "crawl worker stopped unexpectedly".to_string())
        }
    }
}

fn run_job(job: CrawlJob, result_tx: oneshot::Sender<Vec<PageResult>>) {
    ::log::debug!("Crawl worker started for {}", job.seed);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            ::log::error!("Failed to build crawl worker runtime: {}", e);
            let _ = result_tx.send(worker_failure(&job.seed, format!("could not start crawl runtime: {}", e)));
            return;
        }
    };

    let mut crawler = Crawler::new(job.backend, job.signatures, job.config);
    let results = runtime.block_on(crawler.run(&job.seed, job.max_pages));

    if result_tx.send(results).is_err() {
        ::log::warn!("Caller went away before crawl of {} finished", job.seed);
    }
    ::log::debug!("Crawl worker finished for {}", job.seed);
}

fn worker_failure(seed: &str, message: String) -> Vec<PageResult> {
    vec![classify(seed.trim(), &FetchError::Session(message))]
}
