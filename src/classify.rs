use crate::error::{ErrorKind, FetchError, PageError};
use crate::results::PageResult;
use std::collections::BTreeMap;

/// Header fingerprints of CDN and cloud edges, as (platform, header name,
/// optional substring the value must contain)
const HOSTING_PLATFORMS: &[(&str, &str, Option<&str>)] = &[
    ("AWS CloudFront", "x-amz-cf-id", None),
    ("AWS CloudFront", "x-amz-cf-pop", None),
    ("AWS CloudFront", "via", Some("cloudfront")),
    ("AWS CloudFront", "x-cache", Some("cloudfront")),
    ("Cloudflare", "cf-ray", None),
    ("Cloudflare", "server", Some("cloudflare")),
    ("Vercel", "x-vercel-id", None),
    ("Vercel", "server", Some("vercel")),
    ("Netlify", "x-nf-request-id", None),
    ("Netlify", "server", Some("netlify")),
    ("Akamai", "server", Some("akamaighost")),
    ("Akamai", "x-akamai-transformed", None),
    ("Fastly", "x-served-by", Some("cache-")),
    ("Fastly", "x-fastly-request-id", None),
    ("Google Cloud", "x-goog-gfe", None),
    ("Google Cloud", "via", Some("google")),
    ("Azure Front Door", "x-azure-ref", None),
    ("Heroku", "via", Some("vegur")),
];

/// Statuses edges answer with on their own: blocks, rate limits and
/// upstream failures
fn is_edge_status(status: u16) -> bool {
    matches!(status, 403 | 429 | 502 | 503 | 504 | 520..=530)
}

/// Name of the hosting platform whose fingerprint appears in `headers`
pub fn hosting_platform(headers: &BTreeMap<String, String>) -> Option<&'static str> {
    HOSTING_PLATFORMS.iter().find_map(|(platform, name, needle)| {
        let value = headers.get(*name)?.to_ascii_lowercase();
        match needle {
            Some(needle) if !value.contains(needle) => None,
            _ => Some(*platform),
        }
    })
}

/// Maps a raw failure onto the closed error taxonomy
pub fn classify_error(error: &FetchError) -> PageError {
    match error {
        FetchError::InvalidUrl { input, reason } => {
            PageError::new(ErrorKind::InvalidUrl, format!("Invalid URL {:?}: {}", input, reason))
        }
        FetchError::Dns { host, .. } => PageError::new(
            ErrorKind::DomainNotFound,
            format!("The domain {} could not be resolved. Check the address and try again.", host),
        ),
        FetchError::Timeout { after, .. } => PageError::new(
            ErrorKind::Timeout,
            format!("The page did not finish loading within {} seconds.", after.as_secs()),
        ),
        FetchError::Session(message) => {
            PageError::new(ErrorKind::BrowserError, format!("The browser session failed: {}", message))
        }
        FetchError::Navigation { message, .. } => classify_navigation(message),
        FetchError::HttpStatus { status, headers, .. } => classify_status(*status, headers),
        FetchError::Other(message) => PageError::new(ErrorKind::GenericScrapeFailure, message.clone()),
    }
}

/// Browsers report network failures as navigation errors; the net error
/// code in the message tells them apart
fn classify_navigation(message: &str) -> PageError {
    let lowered = message.to_lowercase();
    if lowered.contains("err_name_not_resolved") || lowered.contains("dnsnotfound") {
        PageError::new(
            ErrorKind::DomainNotFound,
            "The page's domain could not be resolved.".to_string(),
        )
    } else if lowered.contains("err_timed_out") || lowered.contains("err_connection_timed_out") || lowered.contains("timeout") {
        PageError::new(ErrorKind::Timeout, format!("Navigation timed out: {}", first_line(message)))
    } else {
        PageError::new(
            ErrorKind::GenericScrapeFailure,
            format!("Failed to load the page: {}", first_line(message)),
        )
    }
}

fn classify_status(status: u16, headers: &BTreeMap<String, String>) -> PageError {
    let reason = reason_phrase(status);
    let error = match hosting_platform(headers).filter(|_| is_edge_status(status)) {
        Some(platform) => PageError::new(
            ErrorKind::HostingPlatformError,
            format!("HTTP {} {} returned by {}; the hosting platform refused or failed the request.", status, reason, platform),
        ),
        None => PageError::new(ErrorKind::GenericScrapeFailure, format!("HTTP {} {}", status, reason)),
    };
    error.with_status(status)
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message).trim()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        410 => "Gone",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Error",
    }
}

/// Builds the error result recorded for `url`
pub fn classify(url: &str, error: &FetchError) -> PageResult {
    let page_error = classify_error(error);
    ::log::warn!("{} failed as {}: {}", url, page_error.kind, error);
    PageResult::failure(url, page_error)
}
