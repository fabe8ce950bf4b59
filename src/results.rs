use crate::error::PageError;
use crate::fingerprint::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A hyperlink discovered on a page, resolved against that page's URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub url: String,
    pub text: String,
    pub is_internal: bool,
}

/// An image discovered on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub url: String,
    pub alt: String,
    pub is_logo: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub status_code: Option<u16>,
}

/// Represents one visited or attempted URL.
///
/// A result either carries an `error` or the extracted page data, never both:
/// error results have empty `content`, `raw_html`, `links`, `images` and
/// `detected_tech`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PageError>,
    pub content: String,
    pub raw_html: String,
    pub links: Vec<LinkInfo>,
    pub images: Vec<ImageInfo>,
    pub metadata: PageMetadata,
    pub detected_tech: BTreeMap<Category, BTreeSet<String>>,
}

impl PageResult {
    /// Builds an error result; the status code of the error is mirrored into
    /// the metadata so callers can read it from one place
    pub fn failure(url: impl Into<String>, error: PageError) -> Self {
        let metadata = PageMetadata {
            status_code: error.status_code,
            ..PageMetadata::default()
        };
        Self {
            url: url.into(),
            error: Some(error),
            content: String::new(),
            raw_html: String::new(),
            links: Vec::new(),
            images: Vec::new(),
            metadata,
            detected_tech: BTreeMap::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }

    pub fn internal_links(&self) -> impl Iterator<Item = &LinkInfo> {
        self.links.iter().filter(|l| l.is_internal)
    }

    pub fn external_links(&self) -> impl Iterator<Item = &LinkInfo> {
        self.links.iter().filter(|l| !l.is_internal)
    }
}

/// Collects page results in visit order, keeping every URL at most once
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Vec<PageResult>,
    seen: HashSet<String>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result. Returns false if a result for the same URL was
    /// already recorded, in which case the new one is dropped.
    pub fn push(&mut self, result: PageResult) -> bool {
        if !self.seen.insert(result.url.clone()) {
            ::log::warn!("Dropping duplicate result for {}", result.url);
            return false;
        }
        self.results.push(result);
        true
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<PageResult> {
        self.results
    }
}
