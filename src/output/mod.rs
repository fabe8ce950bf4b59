//! Renders a finished crawl as JSON, Markdown or plain text.
//!
//! Every formatter is a pure function of the result list: the input is never
//! modified and the same input always renders to the same string.

pub mod json;
pub mod markdown;
pub mod text;

pub use json::format_json;
pub use markdown::format_markdown;
pub use text::format_text;

use crate::config::CrawlerConfig;
use crate::fingerprint::Category;
use crate::results::PageResult;
use crate::utils::truncate_chars;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length limits applied while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Characters of content kept in the JSON `contentPreview`
    pub preview_chars: usize,
    /// Characters of content printed per page in text output
    pub text_limit: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            preview_chars: 500,
            text_limit: 5000,
        }
    }
}

impl From<&CrawlerConfig> for OutputOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            preview_chars: config.content_preview_chars,
            text_limit: config.text_content_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown output format {0:?}, expected json, markdown or text")]
pub struct UnknownFormat(pub String);

impl OutputFormat {
    pub fn render(&self, results: &[PageResult], options: &OutputOptions) -> String {
        match self {
            OutputFormat::Json => format_json(results, options),
            OutputFormat::Markdown => format_markdown(results),
            OutputFormat::Text => format_text(results, options),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Detected technology names of one category, sorted
fn tech_names(result: &PageResult, category: Category) -> Vec<&str> {
    result
        .detected_tech
        .get(&category)
        .map(|names| names.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Content cut to `limit` characters, with `...` appended when cut
fn preview(content: &str, limit: usize) -> String {
    match truncate_chars(content, limit) {
        (head, true) => format!("{}...", head),
        (whole, false) => whole.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!(" Markdown ".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("xml".parse::<OutputFormat>(), Err(UnknownFormat("xml".to_string())));
    }

    #[test]
    fn test_render_dispatches() {
        let results = vec![fixtures::success_page()];
        let options = OutputOptions::default();
        assert_eq!(OutputFormat::Json.render(&results, &options), format_json(&results, &options));
        assert_eq!(OutputFormat::Markdown.render(&results, &options), format_markdown(&results));
        assert_eq!(OutputFormat::Text.render(&results, &options), format_text(&results, &options));
    }

    #[test]
    fn test_options_from_config() {
        let config = CrawlerConfig {
            content_preview_chars: 10,
            text_content_limit: 20,
            ..CrawlerConfig::default()
        };
        let options = OutputOptions::from(&config);
        assert_eq!(options.preview_chars, 10);
        assert_eq!(options.text_limit, 20);
    }

    #[test]
    fn test_preview_marks_truncation() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }
}
