use clap::Parser;
use sitescope::{CrawlerConfig, SiteScope};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match CrawlerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => CrawlerConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(url) = args.webdriver_url {
        config.webdriver_url = url;
    }

    let max_pages = args.max_pages.unwrap_or(config.default_max_pages);
    ::log::info!("Using WebDriver at {}", config.webdriver_url);

    let scope = match SiteScope::new(config) {
        Ok(scope) => scope,
        Err(e) => {
            ::log::error!("Failed to compile technology signatures: {}", e);
            return ExitCode::from(2);
        }
    };

    let start_time = std::time::Instant::now();
    let results = scope.crawl(&args.url, max_pages).await;
    let failed = results.iter().filter(|r| r.is_error()).count();
    ::log::info!(
        "Crawl complete - {} pages ({} failed) in {:.2} seconds",
        results.len(),
        failed,
        start_time.elapsed().as_secs_f64()
    );

    println!("{}", args.format.render(&results, &scope.output_options()));

    if failed == results.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
