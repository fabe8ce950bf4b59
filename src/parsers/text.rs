use scraper::{Html, Node};

/// Element names whose subtrees never contribute readable content
pub const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "nav", "header", "footer", "button", "input",
    "select", "textarea", "option", "template", "svg", "head",
];

/// Extracts the readable text of an HTML document.
///
/// Text nodes under any of [`NON_CONTENT_TAGS`] are skipped, the remaining
/// nodes are joined in document order with single spaces and all whitespace
/// runs are collapsed.
pub fn extract_content(html: &str) -> String {
    let doc = Html::parse_document(html);
    extract_content_from(&doc)
}

/// Same as [`extract_content`] for an already parsed document
pub fn extract_content_from(doc: &Html) -> String {
    let mut pieces: Vec<&str> = Vec::new();

    for node in doc.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let excluded = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if excluded {
            continue;
        }

        let text: &str = text;
        if !text.trim().is_empty() {
            pieces.push(text);
        }
    }

    normalize_whitespace(&pieces.join(" "))
}

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
