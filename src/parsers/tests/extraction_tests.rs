use crate::parsers::html::{extract_asset_sources, extract_images, extract_links, extract_metadata};
use crate::parsers::text::extract_content_from;
use scraper::Html;
use url::Url;

const STOREFRONT: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title> Acme   Outfitters </title>
  <meta name="description" content="Gear for every trail">
  <meta property="og:description" content="Ignored when a description exists">
  <meta name="keywords" content="hiking, camping">
  <meta name="generator" content="WordPress 6.4">
  <link rel="stylesheet" href="/wp-content/themes/acme/style.css">
  <script src="https://js.stripe.com/v3/"></script>
</head>
<body>
  <header><a href="/"><img src="/img/acme-logo.svg" alt="Acme"></a></header>
  <nav><a href="/shop">Shop</a><a href="/about">About</a></nav>
  <main>
    <h1>New arrivals</h1>
    <p>Lightweight tents and <a href="tents/ultralight">ultralight packs</a>.</p>
    <img src="/img/tent.jpg" alt="A green tent">
    <form><input value="search"><button>Go</button></form>
  </main>
  <footer><a href="https://instagram.com/acme">Instagram</a></footer>
  <script>window.dataLayer = [];</script>
</body>
</html>"#;

fn parsed() -> (Html, Url) {
    (
        Html::parse_document(STOREFRONT),
        Url::parse("https://www.acme.com/collections/").unwrap(),
    )
}

#[test]
fn test_content_skips_chrome_and_scripts() {
    let (doc, _) = parsed();
    assert_eq!(extract_content_from(&doc), "New arrivals Lightweight tents and ultralight packs .");
}

#[test]
fn test_links_resolved_and_classified() {
    let (doc, page) = parsed();
    let links = extract_links(&doc, &page);
    let summary: Vec<(&str, bool)> = links.iter().map(|l| (l.url.as_str(), l.is_internal)).collect();
    assert_eq!(
        summary,
        vec![
            ("https://www.acme.com/", true),
            ("https://www.acme.com/shop", true),
            ("https://www.acme.com/about", true),
            ("https://www.acme.com/collections/tents/ultralight", true),
            ("https://instagram.com/acme", false),
        ]
    );
}

#[test]
fn test_images_with_logo_flag() {
    let (doc, page) = parsed();
    let images = extract_images(&doc, &page);
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].url, "https://www.acme.com/img/acme-logo.svg");
    assert!(images[0].is_logo);
    assert_eq!(images[1].alt, "A green tent");
    assert!(!images[1].is_logo);
}

#[test]
fn test_metadata() {
    let (doc, _) = parsed();
    let metadata = extract_metadata(&doc);
    assert_eq!(metadata.title.as_deref(), Some("Acme Outfitters"));
    assert_eq!(metadata.description.as_deref(), Some("Gear for every trail"));
    assert_eq!(metadata.keywords.as_deref(), Some("hiking, camping"));
    assert_eq!(metadata.status_code, None);
}

#[test]
fn test_asset_sources_for_fingerprinting() {
    let (doc, _) = parsed();
    let sources = extract_asset_sources(&doc);
    assert!(sources.contains(&"https://js.stripe.com/v3/".to_string()));
    assert!(sources.contains(&"/wp-content/themes/acme/style.css".to_string()));
    assert!(sources.contains(&"generator:WordPress 6.4".to_string()));
}
