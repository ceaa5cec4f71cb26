use clap::Parser;

use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "vk2disk", about = "Back up VK profile photos to Yandex Disk")]
pub struct Cli {
    /// VK user id whose profile photos to back up (prompted if omitted)
    #[arg(short = 'o', long)]
    pub owner_id: Option<String>,

    /// VK service or user access token.
    /// WARNING: passing via --vk-token is visible in process listings.
    /// Prefer the VK_TOKEN environment variable instead.
    #[arg(long, env = "VK_TOKEN")]
    pub vk_token: Option<String>,

    /// Yandex Disk OAuth token (if not provided, will prompt).
    /// WARNING: passing via --disk-token is visible in process listings.
    /// Prefer the YADISK_TOKEN environment variable instead.
    #[arg(long, env = "YADISK_TOKEN")]
    pub disk_token: Option<String>,

    /// Destination folder on Yandex Disk (empty uploads to the Disk root)
    #[arg(short = 'f', long, default_value = "vk_photos")]
    pub folder: String,

    /// Number of photos to upload, largest first
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,

    /// File the raw photo metadata is saved to after every fetch
    #[arg(long, default_value = "photos_info.json")]
    pub cache_file: String,

    /// File recording every uploaded photo
    #[arg(long, default_value = "uploaded.json")]
    pub manifest_file: String,

    /// Plan from the saved metadata file instead of calling VK
    #[arg(long)]
    pub from_cache: bool,

    /// Do not modify Yandex Disk, only print the plan
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Transfer retry attempts on transient errors
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Base delay between retries, in seconds
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,
}
