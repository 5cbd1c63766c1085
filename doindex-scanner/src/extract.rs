use crate::error::{Result, ScanError};
use scraper::{ElementRef, Html, Selector};

pub const MAX_CONTENT_CHARS: usize = 2000;
pub const MAX_HEADINGS: usize = 20;

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Searchable fields pulled out of a content page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFields {
    pub title: String,
    pub description: Option<String>,
    pub headings: Vec<String>,
    pub content: String,
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::ParseError(format!("selector {}: {}", css, e)))
}

pub fn extract_fields(html: &str, url: &str) -> Result<PageFields> {
    let document = Html::parse_document(html);

    let title = first_text(&document, "title")?
        .or(first_text(&document, "h1")?)
        .unwrap_or_else(|| url.to_string());

    let description_selector = selector("meta[name]")?;
    let description = document
        .select(&description_selector)
        .filter(|e| {
            e.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"))
        })
        .filter_map(|e| e.value().attr("content"))
        .map(collapse_whitespace)
        .find(|d| !d.is_empty());

    let heading_selector = selector("h2, h3")?;
    let headings = document
        .select(&heading_selector)
        .map(visible_text)
        .filter(|h| !h.is_empty())
        .take(MAX_HEADINGS)
        .collect();

    let mut content = String::new();
    for css in ["main", "article", "body"] {
        let container = selector(css)?;
        if let Some(root) = document.select(&container).next() {
            content = visible_text(root);
            break;
        }
    }

    Ok(PageFields {
        title,
        description,
        headings,
        content: truncate_chars(&content, MAX_CONTENT_CHARS),
    })
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .map(visible_text)
        .find(|text| !text.is_empty()))
}

/// Text of an element, skipping script-like subtrees, with whitespace collapsed
fn visible_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in root.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }

    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
