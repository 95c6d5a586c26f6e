//! Release store contract and HTTP client.
//!
//! The pipeline depends only on the [`ReleaseStore`] trait: a point-in-time
//! lookup by version key and a create that attaches all assets. The trait is
//! annotated for `mockall` so the pipeline tests run against deterministic
//! mocks; [`ReleaseClient`] is the production implementation.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::ReleaseConfig;

/// Error type for release-store implementations (simple boxed error for now).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Request payload for creating a release.
pub struct NewRelease<'a> {
    /// Canonical version string; doubles as the release tag and the
    /// store-enforced uniqueness key.
    pub version_key: &'a str,
    /// Human-readable release title.
    pub title: &'a str,
    /// Markdown body with provenance and verification notes.
    pub notes: &'a str,
    /// Files to attach as release assets.
    pub assets: &'a [PathBuf],
}

/// A release as it exists in the store.
#[derive(Debug, Clone)]
pub struct ReleaseRecord {
    pub version_key: String,
    pub title: String,
    pub notes: String,
    /// Asset names attached to the release.
    pub assets: Vec<String>,
}

/// Trait for querying and creating versioned releases in the target store.
///
/// The store is authoritative for idempotency: `get_release` is an advisory
/// pre-check, and `create_release` rejects a duplicate version key rather
/// than overwriting.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Point-in-time lookup of a release by its version key.
    async fn get_release(&self, version_key: &str) -> Result<Option<ReleaseRecord>, StoreError>;

    /// Create a release and attach every asset. Either the fully assembled
    /// release comes back or an error does; no partial record is left behind.
    async fn create_release<'a>(&self, req: NewRelease<'a>) -> Result<ReleaseRecord, StoreError>;
}

#[derive(Deserialize)]
struct ApiRelease {
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    upload_url: String,
    #[serde(default)]
    assets: Vec<ApiAsset>,
}

#[derive(Deserialize)]
struct ApiAsset {
    name: String,
}

#[derive(Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
}

impl From<ApiRelease> for ReleaseRecord {
    fn from(api: ApiRelease) -> Self {
        ReleaseRecord {
            version_key: api.tag_name,
            title: api.name.unwrap_or_default(),
            notes: api.body.unwrap_or_default(),
            assets: api.assets.into_iter().map(|a| a.name).collect(),
        }
    }
}

/// GitHub-style releases API client.
pub struct ReleaseClient {
    client: reqwest::Client,
    api_base: String,
    repository: String,
    token: String,
}

impl ReleaseClient {
    pub fn new(api_base: impl Into<String>, repository: impl Into<String>, token: impl Into<String>) -> Self {
        ReleaseClient {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            repository: repository.into(),
            token: token.into(),
        }
    }

    /// Build a client from the merged release config; the token must have
    /// been injected by the config loader.
    pub fn from_config(config: &ReleaseConfig) -> Result<Self, StoreError> {
        let token = match &config.token {
            Some(token) => token.clone(),
            None => return Err("release config carries no API token".into()),
        };
        Ok(Self::new(
            config.api_base.trim_end_matches('/'),
            config.repository.clone(),
            token,
        ))
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/releases", self.api_base, self.repository)
    }
}

#[async_trait]
impl ReleaseStore for ReleaseClient {
    async fn get_release(&self, version_key: &str) -> Result<Option<ReleaseRecord>, StoreError> {
        let url = format!("{}/tags/{}", self.releases_url(), version_key);
        debug!(url = %url, "Querying release store by tag");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, "release-mirror")
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let api: ApiRelease = response.json().await?;
                Ok(Some(api.into()))
            }
            status => Err(format!("release lookup {url} returned {status}").into()),
        }
    }

    async fn create_release<'a>(&self, req: NewRelease<'a>) -> Result<ReleaseRecord, StoreError> {
        let url = self.releases_url();
        info!(tag = req.version_key, url = %url, "Creating release");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, "release-mirror")
            .json(&CreateReleaseBody {
                tag_name: req.version_key,
                name: req.title,
                body: req.notes,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            return Err(format!("release create returned {status}: {body}").into());
        }
        let created: ApiRelease = response.json().await?;

        // upload_url arrives as a URI template: ".../assets{?name,label}"
        let upload_base = created
            .upload_url
            .split('{')
            .next()
            .unwrap_or(&created.upload_url)
            .to_string();

        let mut asset_names = Vec::new();
        for asset in req.assets {
            let file_name = match asset.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => {
                    return Err(format!(
                        "asset path {} has no usable file name",
                        asset.display()
                    )
                    .into())
                }
            };
            let bytes = std::fs::read(asset)?;
            info!(asset = file_name, bytes = bytes.len(), "Uploading release asset");
            let upload = self
                .client
                .post(format!("{upload_base}?name={file_name}"))
                .bearer_auth(&self.token)
                .header(reqwest::header::USER_AGENT, "release-mirror")
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(bytes)
                .send()
                .await?;
            let upload_status = upload.status();
            if !upload_status.is_success() {
                return Err(format!(
                    "asset upload for {file_name} returned {upload_status}"
                )
                .into());
            }
            asset_names.push(file_name.to_string());
        }

        Ok(ReleaseRecord {
            version_key: created.tag_name,
            title: created.name.unwrap_or_default(),
            notes: created.body.unwrap_or_default(),
            assets: asset_names,
        })
    }
}
