use super::tech_names;
use crate::error::PageError;
use crate::fingerprint::Category;
use crate::results::{LinkInfo, PageResult};

/// Renders every page as a Markdown section, separated by rules
pub fn format_markdown(results: &[PageResult]) -> String {
    results.iter().map(render_page).collect::<Vec<_>>().join("\n")
}

/// Markdown section for a single page. Also embedded in the JSON output.
pub fn render_page(result: &PageResult) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", result.url));

    if let Some(error) = &result.error {
        push_error(&mut md, error);
        md.push_str("---\n");
        return md;
    }

    if let Some(title) = result.title() {
        md.push_str(&format!("**Title:** {}\n\n", title));
    }
    if let Some(description) = &result.metadata.description {
        md.push_str(&format!("**Description:** {}\n\n", description));
    }

    md.push_str("## Content\n\n");
    if result.content.is_empty() {
        md.push_str("_No content extracted._\n\n");
    } else {
        md.push_str(&format!("{}\n\n", result.content));
    }

    md.push_str("## Technology Stack\n\n");
    let mut any_tech = false;
    for category in Category::ALL {
        let names = tech_names(result, category);
        if names.is_empty() {
            continue;
        }
        any_tech = true;
        md.push_str(&format!("### {}\n\n", category.label()));
        for name in names {
            md.push_str(&format!("- {}\n", name));
        }
        md.push('\n');
    }
    if !any_tech {
        md.push_str("_No technologies detected._\n\n");
    }

    push_links(&mut md, "Internal Links", result.internal_links());
    push_links(&mut md, "External Links", result.external_links());

    md.push_str("## Images\n\n");
    if result.images.is_empty() {
        md.push_str("_None_\n\n");
    } else {
        for image in &result.images {
            let logo = if image.is_logo { " (logo)" } else { "" };
            md.push_str(&format!("- ![{}]({}){}\n", escape_brackets(&image.alt), image.url, logo));
        }
        md.push('\n');
    }

    md.push_str("## Metadata\n\n");
    if let Some(status) = result.metadata.status_code {
        md.push_str(&format!("- **Status:** {}\n", status));
    }
    if let Some(keywords) = &result.metadata.keywords {
        md.push_str(&format!("- **Keywords:** {}\n", keywords));
    }
    md.push_str(&format!("- **Links:** {}\n", result.links.len()));
    md.push_str(&format!("- **Images:** {}\n\n", result.images.len()));

    md.push_str("---\n");
    md
}

fn push_error(md: &mut String, error: &PageError) {
    md.push_str("## Error on Page\n\n");
    md.push_str(&format!("- **Type:** {}\n", error.kind));
    md.push_str(&format!("- **Message:** {}\n", error.message));
    if let Some(status) = error.status_code {
        md.push_str(&format!("- **Status:** {}\n", status));
    }
    md.push('\n');
}

fn push_links<'a>(md: &mut String, heading: &str, links: impl Iterator<Item = &'a LinkInfo>) {
    md.push_str(&format!("## {}\n\n", heading));
    let mut empty = true;
    for link in links {
        empty = false;
        let label = if link.text.is_empty() { link.url.as_str() } else { link.text.as_str() };
        md.push_str(&format!("- [{}]({})\n", escape_brackets(label), link.url));
    }
    if empty {
        md.push_str("_None_\n");
    }
    md.push('\n');
}

fn escape_brackets(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
