//! Transform stage: decompress the verified artifact into its distributable form.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::error::MirrorError;

/// Decompress `compressed` into `final_path`, consuming the compressed
/// input. Post-condition: the final file exists and is non-empty. Returns
/// the final file's size in bytes.
pub fn decompress(compressed: &Path, final_path: &Path) -> Result<u64, MirrorError> {
    debug!(
        from = %compressed.display(),
        to = %final_path.display(),
        "Decompressing artifact"
    );

    let input = File::open(compressed)?;
    let mut decoder = GzDecoder::new(input);
    let mut output = File::create(final_path)?;
    io::copy(&mut decoder, &mut output).map_err(|e| {
        MirrorError::Transform(format!("gunzip of {} failed: {e}", compressed.display()))
    })?;
    drop(output);

    fs::remove_file(compressed)?;

    let size = match fs::metadata(final_path) {
        Ok(meta) if meta.len() > 0 => meta.len(),
        Ok(_) => {
            return Err(MirrorError::Transform(format!(
                "{} is empty after decompression",
                final_path.display()
            )))
        }
        Err(e) => {
            return Err(MirrorError::Transform(format!(
                "{} missing after decompression: {e}",
                final_path.display()
            )))
        }
    };

    info!(
        file = %final_path.display(),
        size_bytes = size,
        "Artifact decompressed"
    );
    Ok(size)
}
