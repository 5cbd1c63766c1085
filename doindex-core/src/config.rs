use crate::error::{Result, RunError};
use std::path::{Path, PathBuf};

pub const ROOT_DIR_ENV: &str = "DOINDEX_ROOT";
pub const SEARCH_USER_ENV: &str = "WH_SEARCH_USER";
pub const SEARCH_KEY_ENV: &str = "WH_SEARCH_WRITE_KEY";
pub const INDEX_NAME_ENV: &str = "WH_INDEX_NAME";
pub const SEARCH_HOST_ENV: &str = "WH_SEARCH_HOST";

pub const DIST_DIR: &str = "dist";
pub const DATA_DIR: &str = "data";
pub const REPORT_DIR: &str = "search-report";
pub const STATS_FILE: &str = "page_views_map.json";

pub const INDEX_FILE: &str = "index.json";
pub const UNKNOWN_REPORT: &str = "report-files-unknown.txt";
pub const REDIRECT_REPORT: &str = "report-redirects.txt";
pub const TYPES_REPORT: &str = "report-types.txt";

/// Fixed project layout, everything relative to one root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    pub dist_dir: PathBuf,
    pub stats_file: PathBuf,
    pub report_dir: PathBuf,
}

impl Paths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            dist_dir: root.join(DIST_DIR),
            stats_file: root.join(DATA_DIR).join(STATS_FILE),
            report_dir: root.join(REPORT_DIR),
            root,
        }
    }

    pub fn index_file(&self) -> PathBuf {
        self.report_dir.join(INDEX_FILE)
    }

    pub fn unknown_report(&self) -> PathBuf {
        self.report_dir.join(UNKNOWN_REPORT)
    }

    pub fn redirect_report(&self) -> PathBuf {
        self.report_dir.join(REDIRECT_REPORT)
    }

    pub fn types_report(&self) -> PathBuf {
        self.report_dir.join(TYPES_REPORT)
    }
}

/// Credentials and target of the hosted search index
#[derive(Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    pub host: Option<String>,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .field("index_name", &self.index_name)
            .field("host", &self.host)
            .finish()
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source; blank values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(RunError::MissingConfig(key));

        Ok(Self {
            app_id: require(SEARCH_USER_ENV)?,
            api_key: require(SEARCH_KEY_ENV)?,
            index_name: require(INDEX_NAME_ENV)?,
            host: get(SEARCH_HOST_ENV),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    pub search: SearchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let root = match std::env::var(ROOT_DIR_ENV) {
            Ok(root) if !root.trim().is_empty() => expand_root(root.trim())?,
            _ => default_root()?,
        };

        Ok(Self {
            paths: Paths::from_root(root),
            search: SearchConfig::from_env()?,
        })
    }
}

fn expand_root(root: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(root)
        .map_err(|e| RunError::Config(format!("{}: {}", ROOT_DIR_ENV, e)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// The tool lives two levels below the project root
fn default_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| RunError::io(".", e))?;
    Ok(parent_or_self(&parent_or_self(&cwd)))
}

fn parent_or_self(path: &Path) -> PathBuf {
    path.parent().unwrap_or(path).to_path_buf()
}
