use super::{OutputOptions, tech_names};
use crate::fingerprint::Category;
use crate::results::{LinkInfo, PageResult};
use crate::utils::{char_count, truncate_chars};
use std::collections::HashSet;

const RULE_WIDTH: usize = 50;

/// Navigation sections and the keywords that place a link in them
const NAVIGATION_KEYWORDS: &[(&str, &[&str])] = &[
    ("About", &["about", "who-we-are", "our-story"]),
    ("Contact", &["contact", "get-in-touch", "reach-us"]),
    ("Services", &["services", "solutions", "what-we-do"]),
    ("Portfolio", &["portfolio", "projects", "case-studies", "our-work"]),
    ("Team", &["team", "people", "leadership"]),
    ("Blog", &["blog", "news", "articles", "insights"]),
    ("Careers", &["careers", "jobs", "join-us", "hiring"]),
];

/// Renders the results as plain text blocks, one per page
pub fn format_text(results: &[PageResult], options: &OutputOptions) -> String {
    results
        .iter()
        .map(|r| render_page(r, options))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_page(result: &PageResult, options: &OutputOptions) -> String {
    let mut lines: Vec<String> = vec![format!("Website: {}", result.url)];

    if let Some(error) = &result.error {
        lines.push(format!("Error: {} - {}", error.kind, error.message));
        if let Some(status) = error.status_code {
            lines.push(format!("Status: {}", status));
        }
        lines.push(String::new());
        lines.push("=".repeat(RULE_WIDTH));
        return lines.join("\n") + "\n";
    }

    lines.push(format!("Title: {}", result.title().unwrap_or("No Title")));
    if let Some(description) = &result.metadata.description {
        lines.push(format!("Description: {}", description));
    }
    if let Some(keywords) = &result.metadata.keywords {
        lines.push(format!("Keywords: {}", keywords));
    }
    if let Some(status) = result.metadata.status_code {
        lines.push(format!("Status: {}", status));
    }

    heading(&mut lines, "Technology Stack:");
    for category in Category::ALL {
        let names = tech_names(result, category);
        let listed = if names.is_empty() { "None detected".to_string() } else { names.join(", ") };
        lines.push(format!("{}: {}", category.label(), listed));
    }

    heading(&mut lines, "Content:");
    if result.content.is_empty() {
        lines.push("No content available.".to_string());
    } else {
        let (head, cut) = truncate_chars(&result.content, options.text_limit);
        lines.push(head.to_string());
        if cut {
            let remaining = char_count(&result.content) - char_count(head);
            lines.push(format!("[... truncated, {} more characters]", remaining));
        }
    }

    let navigation = navigation_links(&result.links);
    if !navigation.is_empty() {
        heading(&mut lines, "Navigation:");
        for (section, link) in navigation {
            lines.push(format!("{}: {}", section, link.url));
        }
    }

    heading(&mut lines, "Links:");
    if result.links.is_empty() {
        lines.push("None".to_string());
    }
    for link in &result.links {
        let scope = if link.is_internal { "internal" } else { "external" };
        if link.text.is_empty() {
            lines.push(format!("- {} ({})", link.url, scope));
        } else {
            lines.push(format!("- {}: {} ({})", link.text, link.url, scope));
        }
    }

    heading(&mut lines, "Images:");
    if result.images.is_empty() {
        lines.push("None".to_string());
    }
    for image in &result.images {
        let mut line = format!("- {}", image.url);
        if !image.alt.is_empty() {
            line.push_str(&format!(" ({})", image.alt));
        }
        if image.is_logo {
            line.push_str(" [logo]");
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push("=".repeat(RULE_WIDTH));
    lines.join("\n") + "\n"
}

fn heading(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(title.to_string());
    lines.push("-".repeat(title.len()));
}

/// Links that look like site navigation, tagged with the section they
/// belong to. Each URL appears once, in the order it was first seen.
fn navigation_links(links: &[LinkInfo]) -> Vec<(&'static str, &LinkInfo)> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for link in links {
        let Some(section) = navigation_section(link) else {
            continue;
        };
        if seen.insert(link.url.as_str()) {
            found.push((section, link));
        }
    }
    found
}

fn navigation_section(link: &LinkInfo) -> Option<&'static str> {
    let url = link.url.to_lowercase();
    let text = link.text.to_lowercase().replace(' ', "-");
    NAVIGATION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| url.contains(k) || text.contains(k)))
        .map(|(section, _)| *section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::{error_page, success_page};

    fn link(url: &str, text: &str) -> LinkInfo {
        LinkInfo {
            url: url.to_string(),
            text: text.to_string(),
            is_internal: true,
        }
    }

    #[test]
    fn test_header_and_tech_stack() {
        let text = format_text(&[success_page()], &OutputOptions::default());
        assert!(text.starts_with("Website: https://www.example.com/\nTitle: Example Home\n"));
        assert!(text.contains("Keywords: example, demo"));
        assert!(text.contains("Technology Stack:\n-----------------\nFrontend: Next.js, React\n"));
        assert!(text.contains("Backend: None detected"));
        assert!(text.contains("Hosting & CDN: Vercel"));
        assert!(text.contains("- https://www.example.com/img/logo.svg (Example) [logo]"));
        assert!(text.trim_end().ends_with(&"=".repeat(RULE_WIDTH)));
    }

    #[test]
    fn test_headings_underlined_to_their_width() {
        let text = format_text(&[success_page()], &OutputOptions::default());
        for title in ["Technology Stack:", "Content:", "Navigation:", "Links:", "Images:"] {
            let underlined = format!("\n{}\n{}\n", title, "-".repeat(title.len()));
            assert!(text.contains(&underlined), "{:?} not underlined in\n{}", title, text);
        }
    }

    #[test]
    fn test_long_content_truncated() {
        let mut page = success_page();
        page.content = "x".repeat(120);
        let options = OutputOptions {
            text_limit: 100,
            ..OutputOptions::default()
        };
        let text = format_text(&[page], &options);
        assert!(text.contains(&format!("{}\n[... truncated, 20 more characters]", "x".repeat(100))));
        assert!(!text.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_navigation_section() {
        let text = format_text(&[success_page()], &OutputOptions::default());
        assert!(text.contains(
            "Navigation:\n-----------\nAbout: https://www.example.com/about\nContact: https://www.example.com/contact\n"
        ));
    }

    #[test]
    fn test_navigation_dedup_preserves_first_seen_order() {
        let links = vec![
            link("https://www.example.com/blog", "Blog"),
            link("https://www.example.com/pricing", "Pricing"),
            link("https://www.example.com/careers", "Join us"),
            link("https://www.example.com/blog", "Latest posts"),
            link("https://www.example.com/company", "About the company"),
        ];
        let found: Vec<(&str, &str)> = navigation_links(&links)
            .into_iter()
            .map(|(section, link)| (section, link.url.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("Blog", "https://www.example.com/blog"),
                ("Careers", "https://www.example.com/careers"),
                ("About", "https://www.example.com/company"),
            ]
        );
    }

    #[test]
    fn test_error_block() {
        let text = format_text(&[error_page()], &OutputOptions::default());
        assert!(text.starts_with("Website: https://www.example.com/missing\nError: GenericScrapeFailure - HTTP 404 Not Found\nStatus: 404\n"));
        assert!(!text.contains("Technology Stack:"));
    }

    #[test]
    fn test_deterministic() {
        let results = vec![success_page(), error_page()];
        let options = OutputOptions::default();
        assert_eq!(format_text(&results, &options), format_text(&results, &options));
    }
}
