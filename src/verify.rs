//! Integrity gate: the fetched artifact must match its upstream sidecar
//! before anything else touches it.

use std::path::Path;
use tracing::{error, info};

use crate::checksum;
use crate::error::MirrorError;

/// Extract the SHA-256 value from a sidecar body. Tolerates a bare hex
/// digest, coreutils `<hex>  <name>` lines, and BSD `SHA256 (name) = <hex>`.
pub fn parse_sha256_sidecar(body: &str) -> Option<String> {
    body.split_whitespace()
        .find(|token| token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit()))
        .map(|token| token.to_ascii_lowercase())
}

/// Recompute the digest of the fetched compressed artifact and compare it
/// against the sidecar. A mismatch aborts the run before decompression, so
/// corrupted or tampered bytes are never transformed, let alone published.
pub fn verify_compressed(artifact: &Path, sidecar_body: &str) -> Result<(), MirrorError> {
    let file = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| artifact.display().to_string());
    let computed = checksum::sha256_file(artifact)?;

    match parse_sha256_sidecar(sidecar_body) {
        Some(expected) if expected == computed => {
            info!(file = %file, digest = %computed, "Integrity check passed");
            Ok(())
        }
        Some(expected) => {
            error!(file = %file, expected = %expected, computed = %computed, "Integrity check failed");
            Err(MirrorError::Integrity {
                file,
                expected,
                computed,
            })
        }
        None => {
            error!(file = %file, "No digest found in sidecar body");
            Err(MirrorError::Integrity {
                file,
                expected: "no digest found in sidecar".to_string(),
                computed,
            })
        }
    }
}
