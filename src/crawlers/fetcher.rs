use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// A rendered page as returned by a browser session
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// URL the browser ended up on after redirects, when known
    pub final_url: Option<Url>,
    /// Fully rendered HTML
    pub html: String,
    /// Navigation response status, when the backend can observe it
    pub status: Option<u16>,
    /// Response headers with lowercase names
    pub headers: BTreeMap<String, String>,
}

/// One automation session able to render pages one at a time
#[async_trait]
pub trait PageFetcher: Send {
    /// Navigates to `url`, waits for the page to settle and captures it
    async fn fetch(&mut self, url: &Url) -> Result<FetchedPage, FetchError>;

    /// Ends the session
    async fn close(self: Box<Self>);
}

/// A browser-automation engine. Exactly one backend is selected per
/// deployment; the crawl opens one session from it per crawl.
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn PageFetcher>, FetchError>;

    fn name(&self) -> &str;
}

/// Turns a failing HTTP status into a page-level error
pub fn check_status(url: &Url, page: FetchedPage) -> Result<FetchedPage, FetchError> {
    match page.status {
        Some(status) if status >= 400 => Err(FetchError::HttpStatus {
            url: url.to_string(),
            status,
            headers: page.headers,
        }),
        _ => Ok(page),
    }
}

/// Resolves the host of `url` once, failing fast when the domain does not
/// exist. Used on the seed before any browser work starts.
pub async fn dns_precheck(url: &Url, bound: Duration) -> Result<(), FetchError> {
    let host = url.host_str().ok_or_else(|| FetchError::InvalidUrl {
        input: url.to_string(),
        reason: "missing host".to_string(),
    })?;
    let port = url.port_or_known_default().unwrap_or(443);
    let dns_error = |reason: String| FetchError::Dns {
        host: host.to_string(),
        reason,
    };

    // lookup_host wants brackets around IPv6 literals, which host_str keeps
    let target = format!("{}:{}", host, port);
    let lookup = tokio::time::timeout(bound, tokio::net::lookup_host(target)).await;
    match lookup {
        Ok(Ok(mut addrs)) => {
            if addrs.next().is_some() {
                ::log::debug!("DNS pre-check passed for {}", host);
                Ok(())
            } else {
                Err(dns_error("no addresses returned".to_string()))
            }
        }
        Ok(Err(e)) => Err(dns_error(e.to_string())),
        Err(_) => Err(dns_error(format!("lookup timed out after {}s", bound.as_secs()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_passes_success_and_unknown() {
        let url = Url::parse("https://www.example.com/").unwrap();
        let ok = FetchedPage {
            status: Some(200),
            ..FetchedPage::default()
        };
        assert!(check_status(&url, ok).is_ok());

        let unknown = FetchedPage::default();
        assert!(check_status(&url, unknown).is_ok());

        let redirect = FetchedPage {
            status: Some(304),
            ..FetchedPage::default()
        };
        assert!(check_status(&url, redirect).is_ok());
    }

    #[test]
    fn test_check_status_rejects_errors_with_headers() {
        let url = Url::parse("https://www.example.com/missing").unwrap();
        let mut headers = BTreeMap::new();
        headers.insert("server".to_string(), "nginx".to_string());
        let page = FetchedPage {
            status: Some(404),
            headers,
            ..FetchedPage::default()
        };
        match check_status(&url, page) {
            Err(FetchError::HttpStatus { status, headers, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(headers.get("server").map(String::as_str), Some("nginx"));
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dns_precheck_resolves_ip_literal() {
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        assert!(dns_precheck(&url, Duration::from_secs(2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_dns_precheck_fails_for_reserved_tld() {
        let url = Url::parse("https://www.does-not-exist.invalid/").unwrap();
        match dns_precheck(&url, Duration::from_secs(5)).await {
            Err(FetchError::Dns { host, .. }) => assert_eq!(host, "www.does-not-exist.invalid"),
            other => panic!("expected Dns error, got {:?}", other),
        }
    }
}
