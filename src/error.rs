/// Crate-level error types for symref.
use std::path::PathBuf;

/// Failures of the ambient layer: reading symbol graphs, configuration, and
/// link-resolution snapshots. Merge and link problems are not errors; they are
/// reported as [`crate::diagnostics::Problem`] values and never abort a pass.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as symref::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A config file was named explicitly but does not exist.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A symbol graph or snapshot file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization of a graph, snapshot, or summary failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// No symbol graph files were given or discovered.
    #[error("no symbol graphs found in: {}", searched.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NoSymbolGraphs {
        /// Paths that were searched.
        searched: Vec<PathBuf>,
    },

    /// A snapshot decoded but its contents are inconsistent.
    #[error("snapshot corrupt: {reason}")]
    SnapshotCorrupt {
        /// Description of the inconsistency.
        reason: String,
    },

    /// A snapshot was written by an incompatible schema version.
    #[error("snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion {
        /// Version this build reads and writes.
        expected: u32,
        /// Version recorded in the snapshot.
        found: u32,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
