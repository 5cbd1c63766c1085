// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{exit_code_for, format_summary, handle_run};

// Re-export run functionality from doindex-core
pub use doindex_core::pipeline::{RunOptions, RunSummary, execute_run};
