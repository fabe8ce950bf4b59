use super::{OutputOptions, markdown, preview, tech_names};
use crate::error::PageError;
use crate::fingerprint::Category;
use crate::results::{ImageInfo, LinkInfo, PageResult};
use crate::utils::char_count;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSummary<'a> {
    url: &'a str,
    title: Option<&'a str>,
    description: Option<&'a str>,
    keywords: Option<&'a str>,
    status_code: Option<u16>,
    content_preview: String,
    content_length: usize,
    technologies: BTreeMap<Category, Vec<&'a str>>,
    links: &'a [LinkInfo],
    images: &'a [ImageInfo],
    markdown: String,
}

#[derive(Serialize)]
struct ErrorSummary<'a> {
    url: &'a str,
    error: &'a PageError,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Entry<'a> {
    Page(PageSummary<'a>),
    Error(ErrorSummary<'a>),
}

fn entry<'a>(result: &'a PageResult, options: &OutputOptions) -> Entry<'a> {
    if let Some(error) = &result.error {
        return Entry::Error(ErrorSummary { url: &result.url, error });
    }

    let technologies = Category::ALL
        .into_iter()
        .map(|category| (category, tech_names(result, category)))
        .filter(|(_, names)| !names.is_empty())
        .collect();

    Entry::Page(PageSummary {
        url: &result.url,
        title: result.title(),
        description: result.metadata.description.as_deref(),
        keywords: result.metadata.keywords.as_deref(),
        status_code: result.metadata.status_code,
        content_preview: preview(&result.content, options.preview_chars),
        content_length: char_count(&result.content),
        technologies,
        links: &result.links,
        images: &result.images,
        markdown: markdown::render_page(result),
    })
}

/// Renders the results as a pretty-printed JSON array, one object per page
/// in crawl order
pub fn format_json(results: &[PageResult], options: &OutputOptions) -> String {
    let entries: Vec<Entry<'_>> = results.iter().map(|r| entry(r, options)).collect();
    match serde_json::to_string_pretty(&entries) {
        Ok(json) => json,
        Err(e) => {
            ::log::error!("Failed to serialize {} results: {}", results.len(), e);
            "[]".to_string()
        }
    }
}
