/// Crate-level error types for the orchestration pipeline.
use std::path::PathBuf;

use crate::types::DeclName;

/// All errors carry enough context to produce a useful diagnostic without
/// a debugger. Each variant names the file, declaration, or reason.
///
/// Fatality is decided by the orchestrator, not encoded here: configuration
/// and unknown-database errors abort the whole run, scan errors abort one
/// source root, and preparation/compilation/cache errors skip one
/// declaration.
#[allow(clippy::error_impl_error, reason = "crate-internal error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A cache artifact or metadata file could not be written.
    #[error("cache write failed: {}: {source}", path.display())]
    CacheIo {
        /// Path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The external compiler failed to generate an implementation.
    #[error("compilation failed for `{declaration}`: {reason}")]
    Compilation {
        /// The repository declaration being compiled.
        declaration: DeclName,
        /// Description of the compiler failure.
        reason: String,
    },

    /// The configuration is structurally broken (no databases, no source
    /// roots, missing default database, malformed exclude pattern).
    #[error("invalid configuration: {reason}")]
    ConfigInvalid {
        /// Description of the configuration problem.
        reason: String,
    },

    /// The configuration file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A cache metadata file exists but cannot be parsed or is unordered.
    #[error("cache metadata corrupt: {reason}")]
    MetadataCorrupt {
        /// Description of the corruption.
        reason: String,
    },

    /// A declaration carries the repository marker but is malformed
    /// (e.g. unresolvable entity type, duplicate method binding).
    #[error("cannot prepare `{declaration}`: {reason}")]
    Preparation {
        /// The malformed repository declaration.
        declaration: DeclName,
        /// Description of what makes the declaration invalid.
        reason: String,
    },

    /// A configured source root could not be traversed.
    #[error("cannot scan `{}`: {reason}", path.display())]
    Scan {
        /// The source root path that failed.
        path: PathBuf,
        /// Description of the traversal failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// TOML serialization failed.
    #[error("toml serialize: {0}")]
    TomlSer(
        /// The wrapped TOML serialization error.
        #[from]
        toml::ser::Error,
    ),

    /// A repository references a database name with no configured
    /// connection. Structural configuration error, aborts the run.
    #[error("unknown database: `{database}`")]
    UnknownDatabase {
        /// Database name with no configured binding.
        database: String,
    },
}
