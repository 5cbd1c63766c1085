pub mod classifier;
pub mod error;
pub mod extract;
pub mod page;
pub mod scanner;

pub use classifier::classify;
pub use error::ScanError;
pub use extract::{PageFields, extract_fields};
pub use page::{Page, PageType};
pub use scanner::{PageScanner, scan_pages};
