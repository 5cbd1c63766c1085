use crate::config::Paths;
use crate::error::{Result, RunError};
use crate::publish::{IndexPublisher, PublishReceipt};
use crate::record::{build_records, sort_by_serialized_size};
use crate::report::{FileReports, TypeCounts, render_index_json};
use crate::stats::StatsMap;
use doindex_scanner::scan_pages;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Options for a single indexing run
pub struct RunOptions {
    pub paths: Paths,
    pub show_progress_bars: bool,
}

/// Callback for reporting run progress
pub type RunProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_scanned: usize,
    pub records_indexed: usize,
    pub type_counts: TypeCounts,
    pub report_dir: PathBuf,
    pub receipt: PublishReceipt,
}

async fn create_report(path: PathBuf) -> Result<File> {
    File::create(&path).await.map_err(|e| RunError::io(path, e))
}

async fn write_report(mut file: File, path: &Path, contents: String) -> Result<()> {
    file.write_all(contents.as_bytes())
        .await
        .map_err(|e| RunError::io(path, e))?;
    file.flush().await.map_err(|e| RunError::io(path, e))
}

/// Scan the build output, write every report and replace the remote index.
///
/// Independent steps run concurrently: the stats load alongside the scan, and
/// the `index.json`/type report writes alongside the publish. Any failure
/// aborts the run.
pub async fn execute_run<P: IndexPublisher>(
    options: RunOptions,
    publisher: &P,
    progress_callback: Option<RunProgressCallback>,
) -> Result<RunSummary> {
    let RunOptions {
        paths,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Preparing reports...");
        Some(pb)
    } else {
        None
    };

    let notify = |msg: &str| {
        if let Some(ref callback) = progress_callback {
            callback(msg.to_string());
        }
        if let Some(ref pb) = progress_bar {
            pb.set_message(msg.to_string());
        }
    };

    tokio::fs::create_dir_all(&paths.report_dir)
        .await
        .map_err(|e| RunError::io(&paths.report_dir, e))?;

    let (index_file, unknown_file, redirect_file, types_file) = tokio::try_join!(
        create_report(paths.index_file()),
        create_report(paths.unknown_report()),
        create_report(paths.redirect_report()),
        create_report(paths.types_report()),
    )?;

    let reports = FileReports::new(
        BufWriter::new(unknown_file.into_std().await),
        BufWriter::new(redirect_file.into_std().await),
    );

    notify(&format!("Scanning {}...", paths.dist_dir.display()));
    let dist_dir = paths.dist_dir.clone();
    let scan_progress = progress_bar.clone();
    let scan = tokio::task::spawn_blocking(move || {
        let mut reports = reports;
        let pages = scan_pages(&dist_dir, |page_type, url| {
            if let Some(ref pb) = scan_progress {
                pb.set_message(format!("Scanning... {}", url));
            }
            reports.record(page_type, url)
        })?;
        Ok::<_, RunError>((pages, reports))
    });

    let (stats, (pages, reports)) = tokio::try_join!(StatsMap::load(&paths.stats_file), async {
        Ok::<_, RunError>(scan.await??)
    })?;

    let (type_counts, unknown, redirects) = reports
        .finish()
        .map_err(|e| RunError::io(&paths.report_dir, e))?;
    drop(unknown);
    drop(redirects);
    info!("Scanned {} files", type_counts.total());

    notify("Building search records...");
    let records = tokio::task::spawn_blocking(move || {
        let records = build_records(&pages, &stats)?;
        sort_by_serialized_size(records)
    })
    .await??;

    notify(&format!("Publishing {} records...", records.len()));
    let index_json = render_index_json(&records)?;
    let index_path = paths.index_file();
    let types_path = paths.types_report();

    let (_, _, receipt) = tokio::try_join!(
        write_report(index_file, &index_path, index_json),
        write_report(types_file, &types_path, type_counts.render()),
        async {
            publisher
                .replace_all_objects(&records)
                .await
                .map_err(RunError::from)
        },
    )?;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Run complete! {} records published to {}",
            records.len(),
            receipt.index_name
        ));
    }

    Ok(RunSummary {
        pages_scanned: type_counts.total(),
        records_indexed: records.len(),
        type_counts,
        report_dir: paths.report_dir,
        receipt,
    })
}
