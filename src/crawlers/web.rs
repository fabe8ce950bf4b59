use crate::config::CrawlerConfig;
use crate::crawlers::fetcher::{BrowserBackend, FetchedPage, PageFetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

/// Common WebDriver endpoints tried when the configured one refuses
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444",
];

/// Polling interval while waiting for `document.readyState`
const READY_POLL: Duration = Duration::from_millis(100);

/// Bound for the in-page response probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Extra time the client waits past the server's page-load timeout before
/// giving up on a navigation itself
const NAVIGATION_GRACE: Duration = Duration::from_secs(2);

/// Reads the navigation status from the timing API, then re-requests the
/// document with HEAD for its headers only. The HEAD status is never used:
/// servers often answer HEAD differently from the GET that rendered the page.
const RESPONSE_PROBE: &str = r#"
const done = arguments[arguments.length - 1];
const nav = performance.getEntriesByType('navigation')[0];
const status = nav && nav.responseStatus ? nav.responseStatus : 0;
fetch(window.location.href, { method: 'HEAD', credentials: 'include', cache: 'no-store' })
  .then((r) => {
    const headers = {};
    r.headers.forEach((value, key) => { headers[key] = value; });
    done({ status: status, headers: headers });
  })
  .catch(() => done({ status: status, headers: {} }));
"#;

/// Error text WebDriver servers use when the session itself is gone
const LOST_SESSION_MARKERS: &[&str] = &[
    "unable to find session",
    "invalid session id",
    "no such session",
    "session deleted",
    "chrome not reachable",
    "not connected to devtools",
    "browsing context has been discarded",
];

/// Browser backend driving Chrome or Firefox through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverBackend {
    webdriver_url: String,
    headless: bool,
    user_agent: Option<String>,
    page_timeout: Duration,
    settle_delay: Duration,
}

impl WebDriverBackend {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            page_timeout: config.page_timeout(),
            settle_delay: config.settle_delay(),
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, Value> {
        let mut chrome_args = vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        let mut firefox_args = Vec::new();
        if self.headless {
            chrome_args.push("--headless=new".to_string());
            firefox_args.push("-headless".to_string());
        }
        if let Some(ua) = &self.user_agent {
            chrome_args.push(format!("--user-agent={}", ua));
        }

        let mut caps = serde_json::Map::new();
        caps.insert("pageLoadStrategy".to_string(), json!("normal"));
        caps.insert(
            "timeouts".to_string(),
            json!({
                "pageLoad": self.page_timeout.as_millis() as u64,
                "script": PROBE_TIMEOUT.as_millis() as u64,
            }),
        );
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": firefox_args }));
        caps
    }

    /// Connects to the configured WebDriver URL, then to the common defaults
    async fn connect(&self) -> Result<Client, FetchError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());

        let first_error = match builder.connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", self.webdriver_url, e);
                FetchError::from(e)
            }
        };

        for url in FALLBACK_WEBDRIVER_URLS {
            if *url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = builder.connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!("Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable");
        Err(first_error)
    }
}

#[async_trait]
impl BrowserBackend for WebDriverBackend {
    async fn open_session(&self) -> Result<Box<dyn PageFetcher>, FetchError> {
        let client = self.connect().await?;

        // also applied at runtime for servers that ignore the timeouts capability
        let timeouts = TimeoutConfiguration::new(Some(PROBE_TIMEOUT), Some(self.page_timeout), None);
        if let Err(e) = client.update_timeouts(timeouts).await {
            ::log::warn!("Failed to set WebDriver timeouts: {}", e);
        }

        Ok(Box::new(WebDriverSession {
            client,
            page_timeout: self.page_timeout,
            settle_delay: self.settle_delay,
        }))
    }

    fn name(&self) -> &str {
        "webdriver"
    }
}

/// A live WebDriver session, reused for every page of one crawl
pub struct WebDriverSession {
    client: Client,
    page_timeout: Duration,
    settle_delay: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseProbe {
    #[serde(default)]
    status: u16,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl ResponseProbe {
    /// Assembles the captured page. A zero status means the browser did not
    /// expose one, and the status stays unknown.
    fn into_page(self, final_url: Option<Url>, html: String) -> FetchedPage {
        FetchedPage {
            final_url,
            html,
            status: (self.status != 0).then_some(self.status),
            headers: self
                .headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
        }
    }
}

impl WebDriverSession {
    async fn poll_ready_state(&self, url: &Url) -> Result<(), FetchError> {
        loop {
            let state = self
                .client
                .execute("return document.readyState;", vec![])
                .await
                .map_err(|e| command_error(e, url))?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            tokio::time::sleep(READY_POLL).await;
        }
    }

    /// Waits for `document.readyState` to report `complete` within `bound`
    async fn wait_until_ready(&self, url: &Url, bound: Duration) -> Result<(), FetchError> {
        match timeout(bound, self.poll_ready_state(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                after: self.page_timeout,
            }),
        }
    }

    /// Best effort: a probe failure leaves status and headers unknown
    async fn probe_response(&self, url: &Url) -> ResponseProbe {
        let probe = timeout(PROBE_TIMEOUT, self.client.execute_async(RESPONSE_PROBE, vec![])).await;
        match probe {
            Ok(Ok(value)) => match serde_json::from_value::<ResponseProbe>(value) {
                Ok(probe) => probe,
                Err(e) => {
                    ::log::warn!("Unexpected response probe result for {}: {}", url, e);
                    ResponseProbe::default()
                }
            },
            Ok(Err(e)) => {
                ::log::warn!("Response probe failed for {}: {}", url, e);
                ResponseProbe::default()
            }
            Err(_) => {
                ::log::warn!("Response probe timed out for {}", url);
                ResponseProbe::default()
            }
        }
    }
}

#[async_trait]
impl PageFetcher for WebDriverSession {
    async fn fetch(&mut self, url: &Url) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();
        ::log::debug!("Navigating to {}", url);

        match timeout(self.page_timeout + NAVIGATION_GRACE, self.client.goto(url.as_str())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(command_error(e, url)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: self.page_timeout,
                });
            }
        }

        let remaining = self.page_timeout.saturating_sub(started.elapsed());
        self.wait_until_ready(url, remaining).await?;
        tokio::time::sleep(self.settle_delay).await;

        let html = self.client.source().await.map_err(|e| command_error(e, url))?;
        let final_url = self.client.current_url().await.ok();
        let probe = self.probe_response(url).await;

        ::log::debug!(
            "Rendered {} in {:.2} seconds (status {})",
            url,
            started.elapsed().as_secs_f64(),
            probe.status
        );

        Ok(probe.into_page(final_url, html))
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
    }
}

/// Separates lost sessions from ordinary navigation failures
fn command_error(error: fantoccini::error::CmdError, url: &Url) -> FetchError {
    let message = error.to_string();
    if is_lost_session(&message) {
        ::log::warn!("Lost WebDriver session while loading {}", url);
        FetchError::Session(message)
    } else {
        FetchError::Navigation {
            url: url.to_string(),
            message,
        }
    }
}

fn is_lost_session(message: &str) -> bool {
    let lowered = message.to_lowercase();
    LOST_SESSION_MARKERS.iter().any(|m| lowered.contains(m))
}
