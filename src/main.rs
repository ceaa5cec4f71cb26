//! vk2disk — back up a VK user's profile photos to Yandex Disk.
//!
//! Fetches photo metadata from the VK photos API, picks the largest
//! available variant of each photo, names files by like count and uploads
//! the top N (by pixel area) to a Yandex Disk folder, appending a manifest
//! record per uploaded file.

#![warn(clippy::all)]

mod cli;
mod config;
mod disk;
mod manifest;
mod retry;
mod types;
mod upload;
mod vk;

use std::io::Write as _;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;
use disk::DiskClient;
use vk::VkClient;

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Fetch (or replay) metadata, plan the uploads and execute the plan.
async fn run_backup(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting vk2disk for VK user {}", config.owner_id);

    let items = if config.from_cache {
        tracing::info!(
            "Loading photo metadata from {}",
            config.cache_file.display()
        );
        vk::cache::load_metadata(&config.cache_file)?
    } else {
        let client = VkClient::new(config.vk_token.clone());
        let items = retry::with_backoff(&config.retry, vk::VkError::is_retryable, || {
            client.profile_photos(&config.owner_id)
        })
        .await?;
        vk::cache::save_metadata(&config.cache_file, &items)?;
        tracing::debug!(
            "Saved raw metadata for {} photos to {}",
            items.len(),
            config.cache_file.display()
        );
        items
    };

    let considered = items.len();
    let photos = vk::photo::parse_items(&items);
    let malformed = considered - photos.len();

    let outcome = upload::plan::select_photos(&photos);
    for (photo_id, reason) in &outcome.skipped {
        tracing::warn!("Skipping photo {}: {}", photo_id, reason);
    }

    let plan = upload::plan::build_plan(&outcome.selected, config.photo_count, &config.folder);
    tracing::info!(
        "{} photos considered, {} selected, {} planned for upload",
        considered,
        outcome.selected.len(),
        plan.len()
    );

    let upload_config = upload::UploadConfig {
        manifest_path: config.manifest_file.clone(),
        dry_run: config.dry_run,
        no_progress_bar: config.no_progress_bar,
        retry: config.retry,
    };
    let disk = DiskClient::new(config.disk_token.clone());
    let report = upload::run_plan(&disk, &plan, &upload_config).await;

    if config.dry_run {
        tracing::info!("── Dry Run Summary ──");
        tracing::info!(
            "  {} files would be uploaded to '{}'",
            plan.len(),
            config.folder
        );
        return Ok(());
    }

    tracing::info!("── Summary ──");
    tracing::info!(
        "  {} considered, {} selected, {} skipped",
        considered,
        outcome.selected.len(),
        outcome.skipped.len() + malformed
    );
    tracing::info!(
        "  {} uploaded, {} failed, manifest at {}",
        report.uploaded,
        report.failed.len(),
        config.manifest_file.display()
    );
    for (path, reason) in &report.failed {
        tracing::error!("  failed {}: {}", path, reason);
    }

    if !report.failed.is_empty() {
        anyhow::bail!("{} of {} uploads failed", report.failed.len(), plan.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let owner_id = match cli.owner_id.clone() {
        Some(id) => id,
        None => prompt_line("VK user id: ")?,
    };
    let disk_token = match cli.disk_token.clone() {
        Some(token) => token,
        // A dry run touches nothing on Disk, so don't demand a token.
        None if cli.dry_run => String::new(),
        None => {
            tokio::task::block_in_place(|| rpassword::prompt_password("Yandex Disk token: "))?
        }
    };

    let config = Config::from_cli(cli, owner_id, disk_token)?;
    run_backup(config).await
}
