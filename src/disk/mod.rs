//! Yandex Disk API client.
//!
//! Three calls cover the whole upload flow: request a one-shot upload href
//! for a destination path, PUT the file bytes to that href, and create
//! directories. Every API call is authorized with an `OAuth <token>`
//! header; the upload href itself is pre-signed and needs none.

pub mod error;

use reqwest::header::AUTHORIZATION;
use serde_json::Value;

pub use error::DiskError;

const API_BASE: &str = "https://cloud-api.yandex.net/v1/disk";

pub struct DiskClient {
    http: reqwest::Client,
    token: String,
}

impl DiskClient {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
        }
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token)
    }

    /// Convert a non-success response into a typed error, pulling the
    /// human-readable `description` out of the API's JSON error body.
    async fn api_error(path: &str, response: reqwest::Response) -> DiskError {
        let status = response.status().as_u16();
        let description = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("description")
                    .or_else(|| body.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "no error description".to_string());
        DiskError::Api {
            status,
            path: path.to_string(),
            description,
        }
    }

    /// Request a pre-signed upload href for `path`, overwriting any
    /// existing file there.
    pub async fn upload_href(&self, path: &str) -> Result<String, DiskError> {
        let response = self
            .http
            .get(format!("{API_BASE}/resources/upload"))
            .query(&[("path", path), ("overwrite", "true")])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(path, response).await);
        }
        let body: Value = response.json().await?;
        body["href"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DiskError::Api {
                status: 200,
                path: path.to_string(),
                description: "upload response is missing href".to_string(),
            })
    }

    /// Stream the bytes behind `source_url` into the Disk file at `path`.
    ///
    /// The source response body is piped straight into the upload PUT so
    /// the photo never has to fit in memory.
    pub async fn transfer_from_url(&self, path: &str, source_url: &str) -> Result<(), DiskError> {
        let href = self.upload_href(path).await?;

        let source = self.http.get(source_url).send().await?;
        if !source.status().is_success() {
            return Err(Self::api_error(source_url, source).await);
        }

        let body = reqwest::Body::wrap_stream(source.bytes_stream());
        let response = self.http.put(&href).body(body).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(path, response).await);
        }
        Ok(())
    }

    /// Create a single directory. The caller decides whether an
    /// "already exists" conflict is acceptable.
    pub async fn create_dir(&self, path: &str) -> Result<(), DiskError> {
        let response = self
            .http
            .put(format!("{API_BASE}/resources"))
            .query(&[("path", path), ("overwrite", "true")])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(path, response).await);
        }
        Ok(())
    }

    /// Create every directory along `path`, one segment at a time, treating
    /// "already exists" as success. Any other failure is surfaced.
    pub async fn ensure_path(&self, path: &str) -> Result<(), DiskError> {
        let mut prefix = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            match self.create_dir(&prefix).await {
                Ok(()) => {}
                Err(e) if e.is_already_exists() => {
                    tracing::debug!("Folder {} already exists", prefix);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for DiskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskClient")
            .field("token", &"<redacted>")
            .finish()
    }
}
