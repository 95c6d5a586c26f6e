//! Discovery: scan a raw directory listing for release artifacts and pick
//! the newest version.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::MirrorError;

/// Dotted numeric version. Ordering is component-wise numeric with shorter
/// tuples padded by zero, so "2.7.10" > "2.7.2" and "2.7" == "2.7.0".
#[derive(Debug, Clone)]
pub struct Version(Vec<u64>);

impl Version {
    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl FromStr for Version {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dotted = self
            .0
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{dotted}")
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Zero padding makes "2.7" and "2.7.0" the same version, so equality must
// follow cmp rather than the underlying Vec.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Everything derived from the winning filename, fixed for the rest of the run.
#[derive(Debug, Clone)]
pub struct ArtifactRef {
    /// The filename exactly as matched in the listing.
    pub raw_filename: String,
    pub version: Version,
    /// Name the artifact is downloaded under (identical to `raw_filename`).
    pub compressed_name: String,
    /// Distributable name: the compressed name with the ".gz" suffix stripped.
    pub final_name: String,
    /// Name of the strong-digest sidecar published with the final artifact.
    pub checksum_sidecar_name: String,
    /// Name of the legacy-digest sidecar published with the final artifact.
    pub md5_sidecar_name: String,
    pub download_url: String,
    /// URL of the upstream sidecar, which covers the *compressed* form.
    pub checksum_url: String,
}

impl ArtifactRef {
    fn derive(base_url: &str, raw_filename: &str, version: Version) -> Self {
        let compressed_name = raw_filename.to_string();
        let final_name = raw_filename
            .strip_suffix(".gz")
            .unwrap_or(raw_filename)
            .to_string();
        let base = base_url.trim_end_matches('/');
        let download_url = format!("{base}/{compressed_name}");
        let checksum_url = format!("{download_url}.sha256");
        ArtifactRef {
            raw_filename: compressed_name.clone(),
            version,
            compressed_name,
            checksum_sidecar_name: format!("{final_name}.sha256"),
            md5_sidecar_name: format!("{final_name}.md5"),
            final_name,
            download_url,
            checksum_url,
        }
    }
}

fn artifact_pattern(source: &SourceConfig) -> Result<Regex, regex::Error> {
    let pattern = format!(
        r"{}-CE-(\d+(?:\.\d+)*)-RELEASE-{}\.{}\.gz",
        regex::escape(&source.product),
        regex::escape(&source.arch),
        regex::escape(&source.extension),
    );
    Regex::new(&pattern)
}

/// Extract every distinct artifact filename (with its parsed version) from a
/// raw listing body. Listings repeat filenames (href plus link text), so
/// matches are deduplicated.
pub fn scan_listing(
    source: &SourceConfig,
    body: &str,
) -> Result<Vec<(String, Version)>, MirrorError> {
    let re = artifact_pattern(source)?;
    let mut candidates: Vec<(String, Version)> = Vec::new();
    for captures in re.captures_iter(body) {
        let raw = &captures[0];
        if candidates.iter().any(|(name, _)| name == raw) {
            continue;
        }
        match captures[1].parse::<Version>() {
            Ok(version) => {
                debug!(filename = raw, version = %version, "Found candidate artifact");
                candidates.push((raw.to_string(), version));
            }
            Err(e) => {
                debug!(filename = raw, error = ?e, "Skipping candidate with unparseable version");
            }
        }
    }
    Ok(candidates)
}

/// Select the candidate with the maximum version and derive the artifact
/// reference for it. An empty candidate set is fatal for the run.
///
/// Two distinct filenames parsing to the same version tuple (e.g. "2.7" vs
/// "2.7.0") tie-break to the lexicographically greatest raw filename, so
/// selection never depends on listing order.
pub fn select_latest(source: &SourceConfig, body: &str) -> Result<ArtifactRef, MirrorError> {
    let candidates = scan_listing(source, body)?;
    let (raw, version) = candidates
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
        .ok_or(MirrorError::Discovery)?;
    info!(filename = %raw, version = %version, "Selected newest artifact from listing");
    Ok(ArtifactRef::derive(&source.base_url, &raw, version))
}
