//! Coordinating module for the discover-verify-transform-publish pipeline.
//!
//! One run: scan the remote listing for the newest release artifact, skip
//! everything if that version is already in the release store, otherwise
//! fetch artifact and sidecar, verify integrity, decompress, regenerate
//! checksums and publish one release. Strictly sequential; any stage failure
//! aborts the run. All transient files live in a scratch directory that is
//! removed on every exit path.

use std::fs;
use tempfile::TempDir;
use tracing::{error, info};

use crate::checksum;
use crate::config::MirrorConfig;
use crate::discover::{self, ArtifactRef};
use crate::error::MirrorError;
use crate::fetch::{self, Transport};
use crate::release::{NewRelease, ReleaseStore};
use crate::transform;
use crate::verify;

/// Outcome of one scheduled run.
#[derive(Debug)]
pub enum Outcome {
    /// A new release was created with the final artifact and both sidecars.
    Published { assets: Vec<String> },
    /// The discovered version already exists in the store; no fetch,
    /// transform or publish happened.
    AlreadyReleased,
}

/// Run summary: the key facts a human reads in the scheduler log.
#[derive(Debug)]
pub struct MirrorReport {
    pub version: String,
    pub final_name: String,
    pub outcome: Outcome,
}

/// Entrypoint: run the mirror pipeline once according to config.
pub async fn mirror<S, T>(
    config: &MirrorConfig,
    store: &S,
    transport: &T,
) -> Result<MirrorReport, MirrorError>
where
    S: ReleaseStore,
    T: Transport,
{
    info!("[MIRROR] Starting release mirror run");
    let policy = config.fetch.retry;

    // Discovery: one unpaginated listing document.
    let listing = fetch::fetch_bytes(transport, policy, &config.source.base_url).await?;
    let body = String::from_utf8_lossy(&listing);
    let artifact = discover::select_latest(&config.source, &body)?;
    let version_key = artifact.version.to_string();
    info!(
        version = %version_key,
        file = %artifact.raw_filename,
        "[MIRROR] Newest upstream artifact selected"
    );

    // Idempotency gate: advisory point-in-time check. The store's create
    // remains the authority on duplicate keys.
    match store.get_release(&version_key).await {
        Ok(Some(_)) => {
            info!(version = %version_key, "[MIRROR] Version already released, skipping run");
            return Ok(MirrorReport {
                version: version_key,
                final_name: artifact.final_name,
                outcome: Outcome::AlreadyReleased,
            });
        }
        Ok(None) => {
            info!(version = %version_key, "[MIRROR] Version not yet released, proceeding");
        }
        Err(e) => {
            error!(error = ?e, version = %version_key, "[MIRROR][ERROR] Release store lookup failed");
            return Err(MirrorError::Publish(e));
        }
    }

    // Scratch area for everything transient; dropped (and deleted) on every
    // exit path, success or failure.
    let workdir = match &config.fetch.work_dir {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            TempDir::new_in(parent)?
        }
        None => TempDir::new()?,
    };

    // Fetch artifact, then its sidecar. Sequential, both must succeed.
    let compressed_path = workdir.path().join(&artifact.compressed_name);
    fetch::fetch_to_file(transport, policy, &artifact.download_url, &compressed_path).await?;

    let sidecar_bytes = fetch::fetch_bytes(transport, policy, &artifact.checksum_url).await?;
    let fetched_sidecar_path = workdir
        .path()
        .join(format!("{}.sha256", artifact.compressed_name));
    fs::write(&fetched_sidecar_path, &sidecar_bytes)?;
    let sidecar_body = String::from_utf8_lossy(&sidecar_bytes);

    // Integrity gate, strictly before decompression.
    verify::verify_compressed(&compressed_path, &sidecar_body)?;

    // Transform: gunzip in place; the compressed input is consumed.
    let final_path = workdir.path().join(&artifact.final_name);
    let size = transform::decompress(&compressed_path, &final_path)?;
    info!(
        file = %artifact.final_name,
        size_bytes = size,
        "[MIRROR] Final artifact ready"
    );

    // Checksums of the *final* artifact, distinct from the fetched sidecar
    // which covered the compressed form.
    let sha256 = checksum::sha256_file(&final_path)?;
    let sha_path = checksum::write_sidecar(
        workdir.path(),
        &artifact.checksum_sidecar_name,
        &sha256,
        &artifact.final_name,
    )?;
    let md5 = checksum::md5_file(&final_path)?;
    let md5_path = checksum::write_sidecar(
        workdir.path(),
        &artifact.md5_sidecar_name,
        &md5,
        &artifact.final_name,
    )?;

    // Publish: one release keyed by version, all three assets attached.
    let title = format!("{} CE {}", config.source.product, version_key);
    let notes = release_notes(&artifact, &sha256, &md5);
    let assets = vec![final_path, sha_path, md5_path];
    info!(version = %version_key, "[MIRROR] Publishing release");
    let record = match store
        .create_release(NewRelease {
            version_key: &version_key,
            title: &title,
            notes: &notes,
            assets: &assets,
        })
        .await
    {
        Ok(record) => {
            info!(
                version = %record.version_key,
                assets = record.assets.len(),
                "[MIRROR] Release published"
            );
            record
        }
        Err(e) => {
            error!(error = ?e, version = %version_key, "[MIRROR][ERROR] Publish failed");
            return Err(MirrorError::Publish(e));
        }
    };

    Ok(MirrorReport {
        version: version_key,
        final_name: artifact.final_name,
        outcome: Outcome::Published {
            assets: record.assets,
        },
    })
}

/// Provenance notes for the release body: source location and the commands
/// that verify the attached sidecars.
fn release_notes(artifact: &ArtifactRef, sha256: &str, md5: &str) -> String {
    format!(
        "Mirrored from {download_url}.\n\n\
         Verify the attached image with:\n\n\
         ```\n\
         sha256sum -c {sha_name}\n\
         md5sum -c {md5_name}\n\
         ```\n\n\
         SHA256: `{sha256}`\n\
         MD5: `{md5}`\n",
        download_url = artifact.download_url,
        sha_name = artifact.checksum_sidecar_name,
        md5_name = artifact.md5_sidecar_name,
    )
}
