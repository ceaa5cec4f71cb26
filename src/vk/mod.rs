//! VK API client — fetches a user's profile photo metadata.
//!
//! Only `photos.get` is needed: one request returns every profile photo
//! with its likes, upload date and the list of available size variants.

pub mod cache;
pub mod error;
pub mod photo;

use serde_json::Value;

pub use error::VkError;

const API_BASE: &str = "https://api.vk.com/method";
const API_VERSION: &str = "5.131";

pub struct VkClient {
    http: reqwest::Client,
    token: String,
}

impl VkClient {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
        }
    }

    /// Fetch the raw `photos.get` items for the profile album of `owner_id`.
    ///
    /// The VK API reports failures as a 200 response with an `error`
    /// envelope, so the body is inspected before the items are extracted.
    pub async fn profile_photos(&self, owner_id: &str) -> Result<Vec<Value>, VkError> {
        let response = self
            .http
            .get(format!("{API_BASE}/photos.get"))
            .query(&[
                ("owner_id", owner_id),
                ("access_token", self.token.as_str()),
                ("v", API_VERSION),
                ("album_id", "profile"),
                ("extended", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        if let Some(err) = body.get("error") {
            return Err(VkError::Api {
                code: err["error_code"].as_i64().unwrap_or(0),
                message: err["error_msg"]
                    .as_str()
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        body["response"]["items"]
            .as_array()
            .cloned()
            .ok_or(VkError::MissingItems)
    }
}

impl std::fmt::Debug for VkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VkClient")
            .field("token", &"<redacted>")
            .finish()
    }
}
