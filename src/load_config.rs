use crate::config::{FetchConfig, MirrorConfig, ReleaseConfig, SourceConfig};
use crate::retry::RetryPolicy;
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Deserialize)]
struct StaticConfig {
    source: SourceConfig,
    #[serde(default)]
    fetch: FetchSection,
    release: ReleaseSection,
}

#[derive(Deserialize, Default)]
struct FetchSection {
    #[serde(default)]
    max_attempts: Option<u32>,
    #[serde(default)]
    retry_delay_secs: Option<u64>,
    #[serde(default)]
    work_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct ReleaseSection {
    repository: String,
    #[serde(default)]
    api_base: Option<String>,
}

/// Loads a static YAML config file (no secrets) and injects required env vars for secrets.
/// Returns a fully merged MirrorConfig or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MirrorConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let token = match std::env::var("RELEASE_TOKEN") {
        Ok(token) => {
            info!("RELEASE_TOKEN found in env");
            token
        }
        Err(e) => {
            error!(error = ?e, "RELEASE_TOKEN environment variable not set");
            return Err(anyhow::anyhow!(
                "RELEASE_TOKEN environment variable not set: {e}"
            ));
        }
    };

    static_conf.source.trace_loaded();

    let retry = RetryPolicy {
        max_attempts: static_conf.fetch.max_attempts.unwrap_or(3),
        delay: Duration::from_secs(static_conf.fetch.retry_delay_secs.unwrap_or(10)),
    };

    let fetch_config = FetchConfig {
        retry,
        work_dir: static_conf.fetch.work_dir,
    };

    let release_config = ReleaseConfig {
        repository: static_conf.release.repository,
        api_base: static_conf
            .release
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        token: Some(token),
    };
    release_config.trace_loaded();

    info!(
        max_attempts = retry.max_attempts,
        retry_delay_secs = retry.delay.as_secs(),
        "Config loaded and merged successfully"
    );

    Ok(MirrorConfig {
        source: static_conf.source,
        fetch: fetch_config,
        release: release_config,
    })
}
