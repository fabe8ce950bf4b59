pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use crate::crawlers::fetcher::FetchedPage;
use crate::filter::same_netloc;
use crate::fingerprint::SignatureTable;
use crate::results::PageResult;
use scraper::Html;
use url::Url;

/// Runs the content, link/asset and fingerprint extractors over a fetched
/// page and assembles the success result.
///
/// `page_url` is the URL the page was requested under and keys the result.
/// Relative links resolve against the final URL after redirects as long as
/// it stays on the same network location, else against `page_url`.
pub fn analyze(page: &FetchedPage, page_url: &Url, signatures: &SignatureTable) -> PageResult {
    let doc = Html::parse_document(&page.html);
    let base = page
        .final_url
        .as_ref()
        .filter(|final_url| same_netloc(final_url, page_url))
        .unwrap_or(page_url);

    let content = text::extract_content_from(&doc);
    let links = html::extract_links(&doc, base);
    let images = html::extract_images(&doc, base);
    let assets = html::extract_asset_sources(&doc);

    let mut metadata = html::extract_metadata(&doc);
    metadata.status_code = page.status;

    let report = signatures.detect(&page.html, &assets, &page.headers);

    ::log::debug!(
        "Analyzed {}: {} chars of content, {} links, {} images, {} technologies",
        page_url,
        content.len(),
        links.len(),
        images.len(),
        report.technologies.len()
    );

    PageResult {
        url: page_url.to_string(),
        error: None,
        content,
        raw_html: page.html.clone(),
        links,
        images,
        metadata,
        detected_tech: report.by_category,
    }
}
