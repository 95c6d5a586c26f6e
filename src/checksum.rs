//! Digest computation and sidecar generation for the final artifact.

use md5::Md5;
use sha2::digest::{Digest, Output};
use sha2::Sha256;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

fn digest_file<D>(path: &Path) -> io::Result<String>
where
    D: Digest,
    Output<D>: core::fmt::LowerHex,
{
    let mut file = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Streaming SHA-256 of a file, lowercase hex.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    digest_file::<Sha256>(path)
}

/// Streaming MD5 of a file, lowercase hex. Published for consumers that
/// still compare against legacy digests.
pub fn md5_file(path: &Path) -> io::Result<String> {
    digest_file::<Md5>(path)
}

/// Write a coreutils-format sidecar (`<hex>  <name>`) into `dir`, so
/// `sha256sum -c` / `md5sum -c` verify it next to the artifact.
pub fn write_sidecar(
    dir: &Path,
    sidecar_name: &str,
    hex: &str,
    artifact_name: &str,
) -> io::Result<PathBuf> {
    let path = dir.join(sidecar_name);
    let mut file = File::create(&path)?;
    writeln!(file, "{hex}  {artifact_name}")?;
    info!(sidecar = %path.display(), digest = hex, "Wrote checksum sidecar");
    Ok(path)
}
