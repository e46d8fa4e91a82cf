//! The external compiler collaborator boundary.
//!
//! The orchestrator never inspects declaration internals itself. The
//! compiler's prepare step reads a declaration's metadata and either
//! produces a [`RepositoryDescriptor`] or reports that the declaration is
//! not a repository at all. Generation and activation of the produced
//! source text are equally opaque to this crate.

use std::path::Path;

use crate::error::Error;
use crate::types::{DeclName, RepositoryDescriptor};

/// Outcome of inspecting a declaration's metadata.
///
/// `NotARepository` is a value, not an error: unrelated interfaces in a
/// scanned tree are expected and skipped without noise. Malformed
/// repository declarations surface as [`Error::Preparation`] instead, so
/// they stay discoverable in the logs.
#[derive(Debug)]
pub enum Prepared {
    /// The declaration lacks the repository marker.
    NotARepository,
    /// A valid repository declaration and its generation metadata.
    Repository(Box<RepositoryDescriptor>),
}

/// Translates repository interface declarations into generated
/// implementations. Implemented by the host; this crate only drives the
/// discover → generate-or-reuse → register lifecycle around it.
pub trait Compiler {
    /// Make a generated unit available to the running process.
    ///
    /// Called after a cache hit as well as after a fresh write, so the
    /// artifact is loaded exactly once per run either way.
    ///
    /// # Errors
    ///
    /// Returns `Error::Compilation` if the artifact cannot be loaded.
    fn activate(&self, artifact: &Path) -> Result<(), Error>;

    /// Produce the generated implementation source for a descriptor.
    ///
    /// Must be deterministic: the same descriptor and unchanged dependency
    /// sources yield byte-for-byte compatible output, so concurrent
    /// processes racing on the same cache entry can both win safely.
    ///
    /// # Errors
    ///
    /// Returns `Error::Compilation` on any generation failure.
    fn generate(&self, descriptor: &RepositoryDescriptor) -> Result<String, Error>;

    /// Inspect a declaration's metadata and build its descriptor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Preparation` for declarations that carry the
    /// repository marker but are malformed.
    fn prepare(&self, name: &DeclName) -> Result<Prepared, Error>;

    /// File extension of the source language, without the leading dot.
    /// Used both to scan candidate files and to name cache artifacts.
    fn source_extension(&self) -> &str;
}
