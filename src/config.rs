use std::path::PathBuf;

use crate::cli::Cli;
use crate::retry::RetryPolicy;

/// Application configuration, resolved from the CLI plus interactive
/// prompts. Validation happens here, before any network call.
pub struct Config {
    pub owner_id: String,
    pub vk_token: String,
    pub disk_token: String,
    pub folder: String,
    pub photo_count: usize,
    pub cache_file: PathBuf,
    pub manifest_file: PathBuf,
    pub from_cache: bool,
    pub dry_run: bool,
    pub no_progress_bar: bool,
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("owner_id", &self.owner_id)
            .field("vk_token", &"<redacted>")
            .field("disk_token", &"<redacted>")
            .field("folder", &self.folder)
            .field("photo_count", &self.photo_count)
            .field("from_cache", &self.from_cache)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Build and validate the configuration.
    ///
    /// `owner_id` and `disk_token` arrive separately because they may
    /// have been prompted for. Missing or malformed credentials are fatal
    /// here so no run ever starts half-configured.
    pub fn from_cli(cli: Cli, owner_id: String, disk_token: String) -> anyhow::Result<Self> {
        let owner_id = owner_id.trim().to_string();
        if owner_id.is_empty() {
            anyhow::bail!("VK user id must not be empty");
        }
        if owner_id.parse::<i64>().is_err() {
            anyhow::bail!("VK user id must be numeric, got '{}'", owner_id);
        }

        let disk_token = disk_token.trim().to_string();
        if disk_token.is_empty() && !cli.dry_run {
            anyhow::bail!("a Yandex Disk token is required (set YADISK_TOKEN or pass --disk-token)");
        }

        let vk_token = match cli.vk_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => token.to_string(),
            // Replaying from the cache file needs no VK credentials.
            _ if cli.from_cache => String::new(),
            _ => anyhow::bail!("a VK access token is required (set VK_TOKEN or pass --vk-token)"),
        };

        Ok(Self {
            owner_id,
            vk_token,
            disk_token,
            folder: cli.folder.trim_matches('/').to_string(),
            photo_count: cli.count,
            cache_file: expand_tilde(&cli.cache_file),
            manifest_file: expand_tilde(&cli.manifest_file),
            from_cache: cli.from_cache,
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
            retry: RetryPolicy {
                max_retries: cli.max_retries,
                base_delay_secs: cli.retry_delay,
                ..RetryPolicy::default()
            },
        })
    }
}
