use thiserror::Error;

#[derive(Debug, Error)]
pub enum VkError {
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("VK response is missing response.items")]
    MissingItems,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VkError {
    /// Whether this error is transient and worth retrying.
    ///
    /// API-level errors (bad token, private profile) and decode failures
    /// are permanent; only transport failures can clear up on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VkError::Http(_))
    }
}
