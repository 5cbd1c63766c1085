use crate::error::Result;
use crate::extract::selector;
use crate::page::PageType;
use scraper::Html;
use std::path::Path;
use tracing::{debug, warn};

const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "map", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "ico", "bmp",
    "woff", "woff2", "ttf", "otf", "eot", "json", "xml", "txt", "webmanifest", "pdf", "mp3",
    "mp4", "webm", "ogg", "wasm", "zip", "gz",
];

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

const ERROR_PAGES: &[&str] = &["404.html", "500.html"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether classifying this file requires reading its content
pub fn needs_content(path: &Path) -> bool {
    extension(path).is_some_and(|ext| HTML_EXTENSIONS.contains(&ext.as_str()))
}

/// Classify a file of the build output.
///
/// Rules are checked in a fixed order and the first match wins, so every
/// file maps to exactly one type. `content` is only consulted for HTML files.
pub fn classify(path: &Path, content: Option<&str>) -> Result<PageType> {
    let Some(ext) = extension(path) else {
        warn!("Unrecognised file without extension: {}", path.display());
        return Ok(PageType::Unknown);
    };

    if ASSET_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(PageType::Asset);
    }

    if !HTML_EXTENSIONS.contains(&ext.as_str()) {
        warn!("Unrecognised file type: {}", path.display());
        return Ok(PageType::Unknown);
    }

    let is_error_page = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| ERROR_PAGES.contains(&name.to_ascii_lowercase().as_str()));
    if is_error_page {
        return Ok(PageType::ErrorPage);
    }

    let document = Html::parse_document(content.unwrap_or_default());

    if let Some(target) = redirect_target(&document)? {
        debug!("{} redirects to {}", path.display(), target);
        return Ok(PageType::Redirect);
    }

    if is_noindex(&document)? {
        return Ok(PageType::NoIndex);
    }

    Ok(PageType::Content)
}

/// Target of a `<meta http-equiv="refresh">`, or an empty string when the
/// tag carries no `url=` part.
fn redirect_target(document: &Html) -> Result<Option<String>> {
    let meta = selector("meta[http-equiv]")?;

    for element in document.select(&meta) {
        let is_refresh = element
            .value()
            .attr("http-equiv")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"));
        if !is_refresh {
            continue;
        }

        let content = element.value().attr("content").unwrap_or_default();
        let target = content
            .split(';')
            .skip(1)
            .map(str::trim)
            .find_map(|part| {
                let (key, value) = part.split_once('=')?;
                key.trim()
                    .eq_ignore_ascii_case("url")
                    .then(|| value.trim().trim_matches(|c: char| c == '\'' || c == '"').to_string())
            })
            .unwrap_or_default();
        return Ok(Some(target));
    }

    Ok(None)
}

fn is_noindex(document: &Html) -> Result<bool> {
    let meta = selector("meta[name]")?;

    Ok(document.select(&meta).any(|element| {
        let name = element.value().attr("name").unwrap_or_default();
        let content = element.value().attr("content").unwrap_or_default();
        name.trim().eq_ignore_ascii_case("robots")
            && content.to_ascii_lowercase().contains("noindex")
    }))
}
