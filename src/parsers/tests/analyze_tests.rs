use crate::crawlers::fetcher::FetchedPage;
use crate::fingerprint::{Category, SignatureTable};
use crate::parsers::analyze;
use std::collections::BTreeMap;
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn fetched(html: &str) -> FetchedPage {
    FetchedPage {
        final_url: None,
        html: html.to_string(),
        status: Some(200),
        headers: BTreeMap::new(),
    }
}

#[test]
fn test_react_app_is_detected() {
    let page = fetched(
        r#"<html><head><title>App</title>
           <script src="https://cdn.example.com/react-dom.production.min.js"></script></head>
           <body><div id="root">Loading</div></body></html>"#,
    );
    let signatures = SignatureTable::builtin().unwrap();
    let result = analyze(&page, &url("https://www.example.com/"), &signatures);

    assert!(result.detected_tech[&Category::Frontend].contains("React"));
    assert_eq!(result.title(), Some("App"));
    assert!(result.error.is_none());
}

#[test]
fn test_status_and_headers_flow_into_result() {
    let mut page = fetched("<html><body><p>Hi</p></body></html>");
    page.status = Some(203);
    page.headers.insert("server".to_string(), "nginx/1.25".to_string());
    let signatures = SignatureTable::builtin().unwrap();

    let result = analyze(&page, &url("https://www.example.com/"), &signatures);
    assert_eq!(result.metadata.status_code, Some(203));
    assert!(result.detected_tech.values().any(|names| names.contains("Nginx")));
}

#[test]
fn test_redirect_on_same_host_sets_link_base() {
    let mut page = fetched(r#"<a href="next">Next</a>"#);
    page.final_url = Some(url("https://www.example.com/docs/start"));
    let signatures = SignatureTable::new(Vec::new());

    let result = analyze(&page, &url("https://www.example.com/docs"), &signatures);
    assert_eq!(result.url, "https://www.example.com/docs");
    assert_eq!(result.links[0].url, "https://www.example.com/docs/next");
    assert!(result.links[0].is_internal);
}

#[test]
fn test_cross_host_redirect_keeps_requested_base() {
    let mut page = fetched(r#"<a href="/pricing">Pricing</a>"#);
    page.final_url = Some(url("https://login.other.org/sso"));
    let signatures = SignatureTable::new(Vec::new());

    let result = analyze(&page, &url("https://www.example.com/account"), &signatures);
    assert_eq!(result.links[0].url, "https://www.example.com/pricing");
    assert!(result.links[0].is_internal);
}

#[test]
fn test_raw_html_retained_content_cleaned() {
    let html = "<html><head><style>p{}</style></head><body><nav>Menu</nav><p>Body  text</p></body></html>";
    let result = analyze(&fetched(html), &url("https://www.example.com/"), &SignatureTable::new(Vec::new()));
    assert_eq!(result.raw_html, html);
    assert_eq!(result.content, "Body text");
    assert!(result.detected_tech.is_empty());
}
