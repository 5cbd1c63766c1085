use crate::classifier::{classify, needs_content};
use crate::error::{Result, ScanError};
use crate::page::{Page, PageType, url_for_path};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Lazily walks a build output directory, yielding one classified [`Page`]
/// per regular file.
///
/// Directories are visited in file-name order so repeated runs over the same
/// tree discover files in the same order.
pub struct PageScanner {
    root: PathBuf,
    entries: walkdir::IntoIter,
}

impl PageScanner {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let metadata = fs::metadata(&root).map_err(|source| ScanError::RootUnreadable {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::RootUnreadable {
                path: root,
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let entries = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Ok(Self { root, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_page(&self, path: PathBuf) -> Result<Page> {
        let url = url_for_path(&self.root, &path);

        let content = if needs_content(&path) {
            let bytes = fs::read(&path).map_err(|source| ScanError::ReadError {
                path: path.clone(),
                source,
            })?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            None
        };

        let page_type = classify(&path, content.as_deref())?;
        debug!("Classified {} as {}", url, page_type);

        let page = Page::new(path, url, page_type);
        Ok(match content {
            Some(html) if page_type.is_indexable() => page.with_content(html),
            _ => page,
        })
    }

    /// Symlinks are never descended into. A link to a regular file is
    /// classified through its target; anything else is reported as Unknown.
    fn load_link(&self, path: PathBuf) -> Result<Page> {
        match fs::metadata(&path) {
            Ok(target) if target.is_file() => self.load_page(path),
            _ => {
                warn!("Symlink without a regular file target: {}", path.display());
                let url = url_for_path(&self.root, &path);
                Ok(Page::new(path, url, PageType::Unknown))
            }
        }
    }
}

impl Iterator for PageScanner {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(ScanError::WalkError(e))),
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                return Some(self.load_link(entry.into_path()));
            }
            if !file_type.is_file() {
                continue;
            }

            return Some(self.load_page(entry.into_path()));
        }
    }
}

/// Scan `root`, invoking `on_page` once per discovered file in discovery order.
///
/// Returns every page found. The first error, from the walk or from the
/// callback, aborts the scan.
pub fn scan_pages<F>(root: impl AsRef<Path>, mut on_page: F) -> Result<Vec<Page>>
where
    F: FnMut(PageType, &str) -> std::io::Result<()>,
{
    let scanner = PageScanner::new(root)?;
    info!("Scanning build output in {}", scanner.root().display());

    let mut pages = Vec::new();
    for page in scanner {
        let page = page?;
        on_page(page.page_type, &page.url).map_err(|source| ScanError::Callback {
            url: page.url.clone(),
            source,
        })?;
        pages.push(page);
    }

    info!("Scan complete. Found {} files", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.html", "<html><head><title>A</title></head><body>A body</body></html>");
        write(
            dir.path(),
            "b.html",
            r#"<html><head><meta http-equiv="refresh" content="0; url=/a.html"></head></html>"#,
        );
        write(dir.path(), "c.xyz", "???");
        write(dir.path(), "docs/guide.html", "<html><body><main>Guide</main></body></html>");
        write(dir.path(), "docs/site.css", "body {}");
        write(dir.path(), "404.html", "<p>missing</p>");
        dir
    }

    #[test]
    fn test_scan_classifies_every_file() {
        let dir = sample_tree();
        let pages = scan_pages(dir.path(), |_, _| Ok(())).unwrap();

        let by_url: HashMap<_, _> = pages.iter().map(|p| (p.url.as_str(), p.page_type)).collect();
        assert_eq!(by_url.len(), 6);
        assert_eq!(by_url["/a.html"], PageType::Content);
        assert_eq!(by_url["/b.html"], PageType::Redirect);
        assert_eq!(by_url["/c.xyz"], PageType::Unknown);
        assert_eq!(by_url["/docs/guide.html"], PageType::Content);
        assert_eq!(by_url["/docs/site.css"], PageType::Asset);
        assert_eq!(by_url["/404.html"], PageType::ErrorPage);
    }

    #[test]
    fn test_callback_runs_once_per_file_in_discovery_order() {
        let dir = sample_tree();
        let mut seen = Vec::new();
        let pages = scan_pages(dir.path(), |page_type, url| {
            seen.push((page_type, url.to_string()));
            Ok(())
        })
        .unwrap();

        let discovered: Vec<_> = pages.iter().map(|p| (p.page_type, p.url.clone())).collect();
        assert_eq!(seen, discovered);
    }

    #[test]
    fn test_discovery_order_is_stable() {
        let dir = sample_tree();
        let first: Vec<_> = PageScanner::new(dir.path())
            .unwrap()
            .map(|p| p.unwrap().url)
            .collect();
        let second: Vec<_> = PageScanner::new(dir.path())
            .unwrap()
            .map(|p| p.unwrap().url)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_only_content_pages_keep_html() {
        let dir = sample_tree();
        for page in PageScanner::new(dir.path()).unwrap() {
            let page = page.unwrap();
            assert_eq!(page.content.is_some(), page.page_type == PageType::Content);
        }
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let mut calls = 0;
        let pages = scan_pages(dir.path(), |_, _| {
            calls += 1;
            Ok(())
        })
        .unwrap();
        assert!(pages.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let result = scan_pages(&missing, |_, _| Ok(()));
        assert!(matches!(result, Err(ScanError::RootUnreadable { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_scanned() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.html", "<html><head><title>A</title></head><body>A</body></html>");
        symlink(dir.path().join("a.html"), dir.path().join("alias.html")).unwrap();
        symlink(dir.path().join("gone.html"), dir.path().join("broken.html")).unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        write(dir.path(), "real/inner.css", "body {}");
        symlink(dir.path().join("real"), dir.path().join("linked")).unwrap();

        let mut seen = Vec::new();
        let pages = scan_pages(dir.path(), |page_type, url| {
            seen.push((url.to_string(), page_type));
            Ok(())
        })
        .unwrap();

        let by_url: HashMap<_, _> = pages.iter().map(|p| (p.url.as_str(), p.page_type)).collect();
        assert_eq!(by_url["/a.html"], PageType::Content);
        assert_eq!(by_url["/alias.html"], PageType::Content);
        assert_eq!(by_url["/broken.html"], PageType::Unknown);
        assert_eq!(by_url["/linked"], PageType::Unknown);
        assert_eq!(by_url["/real/inner.css"], PageType::Asset);
        assert!(!by_url.contains_key("/linked/inner.css"));
        assert_eq!(seen.len(), pages.len());
        assert_eq!(pages.len(), 5);

        let alias = pages.iter().find(|p| p.url == "/alias.html").unwrap();
        assert!(alias.content.as_deref().unwrap().contains("<title>A</title>"));
    }

    #[test]
    fn test_callback_error_aborts_scan() {
        let dir = sample_tree();
        let result = scan_pages(dir.path(), |_, _| {
            Err(std::io::Error::other("disk full"))
        });
        assert!(matches!(result, Err(ScanError::Callback { .. })));
    }
}
