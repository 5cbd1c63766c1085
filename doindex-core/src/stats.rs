// Page view counts exported from analytics

use crate::error::{Result, RunError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsMap {
    views: HashMap<String, u64>,
}

impl StatsMap {
    pub fn new(views: HashMap<String, u64>) -> Self {
        Self { views }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RunError::io(path, e))?;
        let stats = Self::from_json(&raw).map_err(|source| RunError::Stats {
            path: path.to_path_buf(),
            source,
        })?;
        if stats.is_empty() {
            warn!("{} holds no view counts, every record gets 0 views", path.display());
        } else {
            info!("Loaded view counts for {} URLs", stats.len());
        }
        Ok(stats)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// View count for a page URL, zero when analytics never saw it.
    ///
    /// Analytics usually records the pretty form of a URL, so after the exact
    /// path `/dir/index.html` also matches `/dir/` and `/dir`, and `/a.html`
    /// matches `/a`.
    pub fn views_for(&self, url: &str) -> u64 {
        std::iter::once(url.to_string())
            .chain(pretty_urls(url))
            .find_map(|candidate| self.views.get(&candidate).copied())
            .unwrap_or(0)
    }
}

fn pretty_urls(url: &str) -> Vec<String> {
    if let Some(dir) = url.strip_suffix("index.html") {
        let mut urls = vec![dir.to_string()];
        let trimmed = dir.trim_end_matches('/');
        if !trimmed.is_empty() {
            urls.push(trimmed.to_string());
        }
        urls
    } else if let Some(stem) = url.strip_suffix(".html") {
        vec![stem.to_string()]
    } else {
        Vec::new()
    }
}
