use anyhow::Context;
use colored::Colorize;
use doindex_core::config::Config;
use doindex_core::error::RunError;
use doindex_core::pipeline::{RunOptions, RunSummary, execute_run};
use doindex_core::publish::AlgoliaIndex;
use std::io::IsTerminal;
use tracing::info;

/// Exit status for local (filesystem) failures
pub const EXIT_LOCAL_FAILURE: i32 = 1;
/// Exit status for failures reported by the hosted search service
pub const EXIT_REMOTE_FAILURE: i32 = 2;

pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RunError>() {
        Some(run_error) if run_error.is_remote() => EXIT_REMOTE_FAILURE,
        _ => EXIT_LOCAL_FAILURE,
    }
}

fn divider() -> String {
    "═".repeat(60).bright_blue().bold().to_string()
}

pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&divider());
    out.push('\n');
    out.push_str(&format!("{}\n", "  SEARCH INDEX UPDATED".green().bold()));
    out.push_str(&divider());
    out.push('\n');

    out.push_str(&format!(
        "{} Files scanned: {}\n",
        "✓".green().bold(),
        summary.pages_scanned.to_string().cyan()
    ));
    for (page_type, count) in summary.type_counts.sorted() {
        out.push_str(&format!(
            "  {} {}: {}\n",
            "•".blue(),
            page_type,
            count.to_string().cyan()
        ));
    }
    out.push_str(&format!(
        "{} Records published: {} → {}\n",
        "✓".green().bold(),
        summary.records_indexed.to_string().cyan(),
        summary.receipt.index_name.bright_white()
    ));
    out.push_str(&format!(
        "{} Reports: {}\n",
        "✓".green().bold(),
        summary.report_dir.display().to_string().bright_white()
    ));

    out
}

/// Load configuration from the environment and run the whole job
pub async fn handle_run() -> anyhow::Result<RunSummary> {
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Indexing {} into {}",
        config.paths.dist_dir.display(),
        config.search.index_name
    );

    let index = AlgoliaIndex::new(&config.search)
        .map_err(RunError::from)
        .context("Failed to set up the search client")?;

    let options = RunOptions {
        paths: config.paths,
        show_progress_bars: std::io::stderr().is_terminal(),
    };

    let summary = execute_run(options, &index, None).await?;
    Ok(summary)
}
