use std::fmt;
use std::path::{Path, PathBuf};

/// Classification of a single file in the build output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageType {
    /// Regular HTML page, the only type that gets indexed
    Content,
    /// HTML stub carrying a `<meta http-equiv="refresh">`
    Redirect,
    /// HTML page opting out of indexing via robots meta
    NoIndex,
    /// Error document such as `404.html`
    ErrorPage,
    /// Stylesheets, scripts, images, fonts and other static files
    Asset,
    /// Anything no rule recognised
    Unknown,
}

impl PageType {
    pub const ALL: [PageType; 6] = [
        PageType::Content,
        PageType::Redirect,
        PageType::NoIndex,
        PageType::ErrorPage,
        PageType::Asset,
        PageType::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PageType::Content => "Content",
            PageType::Redirect => "Redirect",
            PageType::NoIndex => "NoIndex",
            PageType::ErrorPage => "ErrorPage",
            PageType::Asset => "Asset",
            PageType::Unknown => "Unknown",
        }
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self, PageType::Content)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub path: PathBuf,
    pub url: String,
    pub page_type: PageType,
    /// Raw HTML, retained only for indexable pages
    pub content: Option<String>,
}

impl Page {
    pub fn new(path: PathBuf, url: String, page_type: PageType) -> Self {
        Self {
            path,
            url,
            page_type,
            content: None,
        }
    }

    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }
}

/// Derive the site URL of a file from its location under the output root.
///
/// `dist/docs/a.html` scanned from `dist` becomes `/docs/a.html`.
pub fn url_for_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut url = String::new();
    for component in relative.components() {
        url.push('/');
        url.push_str(&component.as_os_str().to_string_lossy());
    }
    if url.is_empty() {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_nested_path() {
        let root = Path::new("/site/dist");
        let path = Path::new("/site/dist/docs/guide/intro.html");
        assert_eq!(url_for_path(root, path), "/docs/guide/intro.html");
    }

    #[test]
    fn test_url_for_top_level_file() {
        let root = Path::new("dist");
        assert_eq!(url_for_path(root, Path::new("dist/a.html")), "/a.html");
    }

    #[test]
    fn test_page_type_names_are_unique() {
        let mut names: Vec<_> = PageType::ALL.iter().map(|t| t.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PageType::ALL.len());
    }

    #[test]
    fn test_only_content_is_indexable() {
        for page_type in PageType::ALL {
            assert_eq!(page_type.is_indexable(), page_type == PageType::Content);
        }
    }
}
