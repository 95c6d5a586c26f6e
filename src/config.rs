use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::retry::RetryPolicy;

/// The fully merged runtime configuration for one mirror run.
#[derive(Debug)]
pub struct MirrorConfig {
    pub source: SourceConfig,
    pub fetch: FetchConfig,
    pub release: ReleaseConfig,
}

impl MirrorConfig {
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.source.base_url,
            repository = %self.release.repository,
            "Loaded MirrorConfig"
        );
        debug!(?self, "MirrorConfig loaded (full debug)");
    }
}

/// Where the upstream artifacts live and how their filenames are shaped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the remote directory listing; artifact URLs are joined onto it.
    pub base_url: String,
    /// Product name as it appears in the artifact filename (e.g. "pfSense").
    pub product: String,
    /// Architecture component of the filename (e.g. "amd64").
    pub arch: String,
    /// Uncompressed artifact extension (e.g. "iso"); the listing carries it gzipped.
    pub extension: String,
}

impl SourceConfig {
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            product = %self.product,
            arch = %self.arch,
            extension = %self.extension,
            "Loaded source config"
        );
    }
}

/// Transfer behaviour: retry budget and where transient files are rooted.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub retry: RetryPolicy,
    /// Optional parent for the per-run scratch directory. The scratch
    /// directory itself is always temporary and removed at run end.
    pub work_dir: Option<PathBuf>,
}

/// The target release store.
#[derive(Debug)]
pub struct ReleaseConfig {
    /// "owner/name" slug of the repository holding the releases.
    pub repository: String,
    /// API root, overridable for test servers.
    pub api_base: String,
    /// Bearer token, injected from the environment, never from the config file.
    pub token: Option<String>,
}

impl ReleaseConfig {
    pub fn trace_loaded(&self) {
        info!(
            repository = %self.repository,
            api_base = %self.api_base,
            token_present = self.token.is_some(),
            "Loaded release config"
        );
    }
}
