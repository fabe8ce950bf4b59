use crate::filter::same_netloc;
use crate::parsers::text::normalize_whitespace;
use crate::results::{ImageInfo, LinkInfo, PageMetadata};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta[content]"));
static SCRIPT_SRC: LazyLock<Selector> = LazyLock::new(|| selector("script[src]"));
static LINK_HREF: LazyLock<Selector> = LazyLock::new(|| selector("link[href]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("built-in selector")
}

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:"];

/// Extracts every followable anchor of the page, in document order.
///
/// Relative hrefs are resolved against `page_url`, the URL of the page the
/// anchor was found on.
pub fn extract_links(doc: &Html, page_url: &Url) -> Vec<LinkInfo> {
    let mut links = Vec::new();

    for anchor in doc.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        let lowered = href.to_ascii_lowercase();
        if href.is_empty() || href == "#" || SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            continue;
        }

        let resolved = match page_url.join(href) {
            Ok(url) => url,
            Err(e) => {
                ::log::trace!("Skipping unresolvable href {:?} on {}: {}", href, page_url, e);
                continue;
            }
        };

        links.push(LinkInfo {
            is_internal: same_netloc(&resolved, page_url),
            text: anchor_text(&anchor),
            url: resolved.to_string(),
        });
    }

    ::log::debug!("Found {} links on {}", links.len(), page_url);
    links
}

fn anchor_text(anchor: &ElementRef<'_>) -> String {
    let text = normalize_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
    if !text.is_empty() {
        return text;
    }
    ["aria-label", "title"]
        .iter()
        .find_map(|attr| anchor.value().attr(attr))
        .map(normalize_whitespace)
        .unwrap_or_default()
}

/// Extracts every image with a resolvable `src`, flagging likely logos
pub fn extract_images(doc: &Html, page_url: &Url) -> Vec<ImageInfo> {
    doc.select(&IMAGE)
        .filter_map(|img| {
            let src = img.value().attr("src")?.trim();
            if src.is_empty() {
                return None;
            }
            let url = page_url.join(src).ok()?.to_string();
            let alt = img.value().attr("alt").map(normalize_whitespace).unwrap_or_default();
            let class = img.value().attr("class").unwrap_or_default();
            let is_logo = [url.as_str(), alt.as_str(), class]
                .iter()
                .any(|s| s.to_lowercase().contains("logo"));
            Some(ImageInfo { url, alt, is_logo })
        })
        .collect()
}

/// Reads title, description and keywords. The status code is filled in by
/// the caller, who knows the navigation response.
pub fn extract_metadata(doc: &Html) -> PageMetadata {
    let title = doc
        .select(&TITLE)
        .next()
        .map(|t| normalize_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let description = meta_content(doc, "description").or_else(|| meta_content(doc, "og:description"));
    let keywords = meta_content(doc, "keywords");

    PageMetadata {
        title,
        description,
        keywords,
        status_code: None,
    }
}

fn meta_content(doc: &Html, name: &str) -> Option<String> {
    doc.select(&META)
        .find(|m| {
            let el = m.value();
            el.attr("name")
                .or_else(|| el.attr("property"))
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .and_then(|m| m.value().attr("content"))
        .map(normalize_whitespace)
        .filter(|c| !c.is_empty())
}

/// Collects script and stylesheet sources plus `name:content` meta pairs,
/// the strings the fingerprint engine searches besides the HTML itself
pub fn extract_asset_sources(doc: &Html) -> Vec<String> {
    let scripts = doc.select(&SCRIPT_SRC).filter_map(|s| s.value().attr("src"));
    let links = doc.select(&LINK_HREF).filter_map(|l| l.value().attr("href"));
    let mut sources: Vec<String> = scripts.chain(links).map(str::to_string).collect();

    for meta in doc.select(&META) {
        let el = meta.value();
        if let (Some(name), Some(content)) = (el.attr("name").or_else(|| el.attr("property")), el.attr("content")) {
            sources.push(format!("{}:{}", name, content));
        }
    }

    sources
}
