pub mod config;
pub mod error;
pub mod pipeline;
pub mod publish;
pub mod record;
pub mod report;
pub mod stats;

pub use config::{Config, Paths, SearchConfig};
pub use error::{PublishError, RunError};
pub use pipeline::{RunOptions, RunProgressCallback, RunSummary, execute_run};
pub use publish::{AlgoliaIndex, IndexPublisher, PublishReceipt};
pub use record::Record;
pub use report::{FileReports, TypeCounts};
pub use stats::StatsMap;

pub use doindex_scanner::{Page, PageType};
