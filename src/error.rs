use thiserror::Error;

/// Boxed error produced by transport and release-store implementations.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can abort a mirror run. All variants are fatal for the
/// run in which they occur; "version already released" is not an error and
/// is reported through the run summary instead.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The remote listing contained no filename matching the release naming scheme.
    #[error("no candidate artifact found in listing")]
    Discovery,

    /// The artifact pattern built from the source configuration did not compile.
    #[error("invalid artifact pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// All fetch attempts for one URL were exhausted.
    #[error("failed to fetch {url} after {attempts} attempts: {source}")]
    Fetch {
        url: String,
        attempts: u32,
        source: SourceError,
    },

    /// The recomputed digest of the fetched artifact does not match its sidecar.
    #[error("checksum mismatch for {file}: sidecar says {expected}, computed {computed}")]
    Integrity {
        file: String,
        expected: String,
        computed: String,
    },

    /// Decompression failed or its post-condition did not hold.
    #[error("transform failed: {0}")]
    Transform(String),

    /// The release store rejected a lookup, the release creation, or an asset upload.
    #[error("release store error: {0}")]
    Publish(#[source] SourceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
