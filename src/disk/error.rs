use thiserror::Error;

/// Typed Yandex Disk errors enabling retry and "already exists"
/// classification.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("disk API error {status} for {path}: {description}")]
    Api {
        status: u16,
        path: String,
        description: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl DiskError {
    /// The directory-creation conflict the API reports when the target
    /// folder is already there. Non-fatal by contract.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, DiskError::Api { status: 409, .. })
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            DiskError::Api { status, .. } => *status == 429 || *status >= 500,
            DiskError::Http(_) => true,
        }
    }
}
