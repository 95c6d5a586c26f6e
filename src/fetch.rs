//! Remote byte retrieval with a bounded retry budget.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::MirrorError;
use crate::retry::{retry_async, RetryPolicy};

/// Error type for a single transfer attempt (simple boxed error for now).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// One GET of a remote resource. The implementor owns connection handling
/// and per-attempt timeouts; the retry budget lives above this trait.
///
/// The trait is implemented by the real HTTP client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single GET of `url`, returning the full response body.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("GET {url} returned {status}").into());
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Fetch `url` into memory, retrying per the policy. Exhausting the attempt
/// ceiling is fatal and names the URL and attempt count.
pub async fn fetch_bytes<T>(
    transport: &T,
    policy: RetryPolicy,
    url: &str,
) -> Result<Vec<u8>, MirrorError>
where
    T: Transport + ?Sized,
{
    debug!(url, max_attempts = policy.attempts(), "Starting fetch");
    match retry_async(policy, || transport.get_bytes(url)).await {
        Ok(bytes) => {
            info!(url, bytes = bytes.len(), "Fetch succeeded");
            Ok(bytes)
        }
        Err(source) => Err(MirrorError::Fetch {
            url: url.to_string(),
            attempts: policy.attempts(),
            source,
        }),
    }
}

/// Fetch `url` and write the body to `dest` in the transient working area.
pub async fn fetch_to_file<T>(
    transport: &T,
    policy: RetryPolicy,
    url: &str,
    dest: &Path,
) -> Result<(), MirrorError>
where
    T: Transport + ?Sized,
{
    let bytes = fetch_bytes(transport, policy, url).await?;
    fs::write(dest, &bytes)?;
    info!(url, dest = %dest.display(), bytes = bytes.len(), "Wrote fetched bytes to disk");
    Ok(())
}
