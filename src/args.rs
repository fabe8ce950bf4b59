use clap::Parser;
use sitescope::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitescope")]
#[command(about = "Crawls a website and reports its content, links and technology stack")]
#[command(version)]
pub struct Args {
    /// Seed URL or bare domain (e.g. example.com)
    pub url: String,

    /// Maximum number of pages to fetch (defaults to the configured value)
    #[arg(short, long)]
    pub max_pages: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL, overrides the config file and WEBDRIVER_URL
    #[arg(long)]
    pub webdriver_url: Option<String>,
}
