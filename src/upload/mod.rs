//! Upload engine — executes a plan strictly sequentially: each item's
//! folders are ensured, its bytes transferred and its manifest record
//! appended before the next item starts, so manifest order always equals
//! plan order.

pub mod error;
pub mod plan;

use std::io::IsTerminal;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use crate::disk::{DiskClient, DiskError};
use crate::manifest::{self, ManifestRecord};
use crate::retry::{self, RetryPolicy};
use error::UploadError;
use plan::UploadPlanItem;

/// Subset of application config consumed by the upload engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug)]
pub struct UploadConfig {
    pub manifest_path: PathBuf,
    pub dry_run: bool,
    pub no_progress_bar: bool,
    pub retry: RetryPolicy,
}

/// What happened to the planned items.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub uploaded: usize,
    /// Failed items with the reason, in plan order.
    pub failed: Vec<(String, String)>,
}

/// Create a progress bar with a consistent template.
///
/// Returns `ProgressBar::hidden()` when the user passed `--no-progress-bar`
/// or stdout is not a TTY (piped output, cron jobs).
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .expect("valid template")
        .progress_chars("=> "),
    );
    pb
}

/// Upload one planned item: folders, transfer (with retries on transient
/// Disk errors), manifest record.
async fn upload_item(
    disk: &DiskClient,
    item: &UploadPlanItem,
    config: &UploadConfig,
) -> Result<(), UploadError> {
    if let Some((parent, _)) = item.remote_path.rsplit_once('/') {
        disk.ensure_path(parent)
            .await
            .map_err(|source| UploadError::Folder {
                path: item.remote_path.clone(),
                source,
            })?;
    }

    retry::with_backoff(
        &config.retry,
        |e: &DiskError| e.is_retryable(),
        || disk.transfer_from_url(&item.remote_path, &item.source_url),
    )
    .await
    .map_err(|source| UploadError::Transfer {
        path: item.remote_path.clone(),
        source,
    })?;

    let record = ManifestRecord {
        file_name: item.file_name.clone(),
        size: item.tag,
    };
    manifest::append_record(&config.manifest_path, &record).map_err(|source| {
        UploadError::Manifest {
            path: item.remote_path.clone(),
            source,
        }
    })
}

/// Run the plan item by item.
///
/// A failed item is reported and skipped; the rest of the plan still
/// runs. The caller turns a non-empty `failed` list into a non-zero exit.
pub async fn run_plan(
    disk: &DiskClient,
    items: &[UploadPlanItem],
    config: &UploadConfig,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    if config.dry_run {
        for item in items {
            tracing::info!(
                "[DRY RUN] Would upload {} -> {} (tag {})",
                item.source_url,
                item.remote_path,
                item.tag
            );
        }
        return report;
    }

    let pb = create_progress_bar(config.no_progress_bar, items.len() as u64);
    for item in items {
        pb.set_message(item.file_name.clone());
        match upload_item(disk, item, config).await {
            Ok(()) => report.uploaded += 1,
            Err(e) => {
                pb.suspend(|| tracing::error!("Upload failed: {}", e));
                report.failed.push((item.remote_path.clone(), e.to_string()));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    report
}
