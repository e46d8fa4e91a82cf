//! Compilation cache: freshness checking and atomic artifact persistence.
//!
//! Each generated artifact is stored next to a `.meta` file recording the
//! dependency fingerprints observed at compile time. Writes go through a
//! temp-file-then-rename so that concurrent readers (parallel test
//! workers, cold-cache web requests) never observe a partially written
//! file; whichever racing writer wins produced equivalent bytes.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiler::Compiler;
use crate::error::Error;
use crate::fingerprint::fingerprint_file;
use crate::types::{DeclName, Dependency, Fingerprint, RepositoryDescriptor};

/// A single recorded dependency in a metadata file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Content fingerprint of the dependency at compile time.
    pub fingerprint: Fingerprint,
    /// Declaration name of the dependency.
    pub name: DeclName,
    /// Path to the dependency's source file.
    pub source: PathBuf,
}

impl Ord for DependencyRecord {
    /// Compare records by (name, source) for deterministic ordering.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        return (&self.name, &self.source).cmp(&(&other.name, &other.source));
    }
}

impl PartialOrd for DependencyRecord {
    /// Delegate to `Ord` implementation.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        return Some(self.cmp(other));
    }
}

/// The metadata file as a whole. Records are sorted by (name, source) so
/// repeated compilations of the same inputs produce identical bytes.
/// Constructed only via `Metadata::new()` or `Metadata::parse()`, both of
/// which enforce sorting.
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// The ordered list of recorded dependencies.
    pub dependencies: Vec<DependencyRecord>,
}

impl Metadata {
    /// Create metadata from unsorted records. Sorts and deduplicates.
    pub fn new(mut dependencies: Vec<DependencyRecord>) -> Self {
        dependencies.sort();
        dependencies.dedup();
        return Self { dependencies };
    }

    /// Fingerprint each dependency of a descriptor into a fresh record set.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a dependency source file cannot be read.
    pub fn capture(dependencies: &[Dependency]) -> Result<Self, Error> {
        let mut records = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            records.push(DependencyRecord {
                fingerprint: fingerprint_file(&dependency.source)?,
                name: dependency.name.clone(),
                source: dependency.source.clone(),
            });
        }
        return Ok(Self::new(records));
    }

    /// Parse a metadata file from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the content is not valid TOML,
    /// or `Error::MetadataCorrupt` if records are not sorted.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let metadata: Self = toml::from_str(content)?;
        for window in metadata.dependencies.windows(2) {
            let (Some(first), Some(second)) = (window.first(), window.get(1)) else {
                return Err(Error::MetadataCorrupt {
                    reason: "window underflow".to_string(),
                });
            };
            if first >= second {
                return Err(Error::MetadataCorrupt {
                    reason: format!(
                        "records not sorted: {} >= {}",
                        first.name, second.name
                    ),
                });
            }
        }
        return Ok(metadata);
    }

    /// Read and parse a metadata file from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` on read failure, `Error::TomlDe` if the content
    /// is invalid TOML, or `Error::MetadataCorrupt` if records are unsorted.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        return Self::parse(&content);
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlSer` if serialization fails.
    pub fn serialize(&self) -> Result<String, Error> {
        return Ok(toml::to_string_pretty(self)?);
    }
}

/// Deterministic artifact path for a generated name: dots become path
/// separators under `output_dir`, plus the compiler's source extension.
pub fn artifact_path(output_dir: &Path, generated_name: &DeclName, extension: &str) -> PathBuf {
    return output_dir.join(generated_name.to_relative_path(extension));
}

/// Sibling metadata path for an artifact: the artifact path plus `.meta`.
pub fn metadata_path(artifact: &Path) -> PathBuf {
    let mut os = artifact.as_os_str().to_os_string();
    os.push(".meta");
    return PathBuf::from(os);
}

/// Whether a dependency record still matches the filesystem.
/// Stale when the source is gone, modified after the artifact, or its
/// content fingerprint changed.
fn dependency_is_current(record: &DependencyRecord, artifact_mtime: SystemTime) -> bool {
    let Ok(source_meta) = std::fs::metadata(&record.source) else {
        return false;
    };
    if let Ok(source_mtime) = source_meta.modified() {
        if source_mtime > artifact_mtime {
            return false;
        }
    }
    let Ok(current) = fingerprint_file(&record.source) else {
        return false;
    };
    return current == record.fingerprint;
}

/// Freshness test for a cache entry.
///
/// Outside debug mode an existing artifact is trusted without re-checking
/// its dependencies — a deliberate trade of correctness for speed that
/// assumes the deployment process wipes the cache directory on deploy.
/// In debug mode the entry is fresh only if the metadata file parses and
/// every recorded dependency is unchanged; corrupt or missing metadata
/// counts as stale, never as an error.
pub fn is_fresh(artifact: &Path, metadata: &Path, debug: bool) -> bool {
    let Ok(artifact_meta) = std::fs::metadata(artifact) else {
        return false;
    };
    if !debug {
        return true;
    }
    let Ok(parsed) = Metadata::read(metadata) else {
        return false;
    };
    let Ok(artifact_mtime) = artifact_meta.modified() else {
        return false;
    };
    return parsed
        .dependencies
        .iter()
        .all(|record| return dependency_is_current(record, artifact_mtime));
}

/// Write content to a path atomically: temp file in the destination
/// directory, then rename into place.
///
/// # Errors
///
/// Returns `Error::CacheIo` on any filesystem failure.
fn write_atomic(path: &Path, content: &str) -> Result<(), Error> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let cache_io = |source: std::io::Error| {
        return Error::CacheIo {
            path: path.to_path_buf(),
            source,
        };
    };

    std::fs::create_dir_all(parent).map_err(cache_io)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(cache_io)?;
    std::io::Write::write_all(&mut tmp, content.as_bytes()).map_err(cache_io)?;
    tmp.persist(path).map_err(|e| return cache_io(e.error))?;
    return Ok(());
}

/// Resolve a descriptor to a cached artifact, compiling when stale.
///
/// On a miss the compiler generates the source text, the dependency set is
/// fingerprinted, and artifact plus metadata are written atomically. The
/// artifact is then activated (loaded into the running process) whether it
/// came from the cache or a fresh compile, and its path is returned.
///
/// # Errors
///
/// Returns `Error::Compilation` from the compiler, `Error::Io` if a
/// dependency cannot be fingerprinted, or `Error::CacheIo` on write
/// failure. All abort only this repository's registration.
pub fn resolve(
    compiler: &dyn Compiler,
    descriptor: &RepositoryDescriptor,
    output_dir: &Path,
    debug: bool,
) -> Result<PathBuf, Error> {
    let artifact = artifact_path(output_dir, &descriptor.generated_name, compiler.source_extension());
    let meta_path = metadata_path(&artifact);

    if is_fresh(&artifact, &meta_path, debug) {
        debug!(artifact = %artifact.display(), "cache hit");
    } else {
        let source_text = compiler.generate(descriptor)?;
        let metadata = Metadata::capture(&descriptor.dependencies)?;
        write_atomic(&artifact, &source_text)?;
        write_atomic(&meta_path, &metadata.serialize()?)?;
        debug!(artifact = %artifact.display(), "compiled");
    }

    compiler.activate(&artifact)?;
    return Ok(artifact);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::{
        DependencyRecord, Metadata, artifact_path, is_fresh, metadata_path,
    };
    use crate::types::{DeclName, Dependency, Fingerprint};
    use std::path::{Path, PathBuf};

    /// Build a record from string parts.
    fn record(name: &str, source: &str, fingerprint: &str) -> DependencyRecord {
        return DependencyRecord {
            fingerprint: Fingerprint(fingerprint.to_string()),
            name: DeclName(name.to_string()),
            source: PathBuf::from(source),
        };
    }

    #[test]
    fn artifact_and_metadata_paths_are_deterministic() {
        let name = DeclName("app.Default.FooRepository".to_string());
        let artifact = artifact_path(Path::new("/cache/repogen"), &name, "php");
        assert_eq!(artifact, PathBuf::from("/cache/repogen/app/Default/FooRepository.php"));
        assert_eq!(
            metadata_path(&artifact),
            PathBuf::from("/cache/repogen/app/Default/FooRepository.php.meta")
        );
    }

    #[test]
    fn metadata_round_trips_through_toml() {
        let metadata = Metadata::new(vec![
            record("app.Foo", "src/Foo.php", "bbb"),
            record("app.Bar", "src/Bar.php", "aaa"),
        ]);
        let serialized = metadata.serialize().unwrap();
        let parsed = Metadata::parse(&serialized).unwrap();
        assert_eq!(parsed.dependencies, metadata.dependencies);
        // new() sorted Bar before Foo.
        assert_eq!(parsed.dependencies[0].name.as_str(), "app.Bar");
    }

    #[test]
    fn unsorted_metadata_is_rejected() {
        let metadata = Metadata {
            dependencies: vec![
                record("app.Foo", "src/Foo.php", "bbb"),
                record("app.Bar", "src/Bar.php", "aaa"),
            ],
        };
        let serialized = metadata.serialize().unwrap();
        assert!(Metadata::parse(&serialized).is_err());
    }

    #[test]
    fn missing_artifact_is_stale_in_both_modes() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("Gone.php");
        let meta = metadata_path(&artifact);
        assert!(!is_fresh(&artifact, &meta, false));
        assert!(!is_fresh(&artifact, &meta, true));
    }

    #[test]
    fn existing_artifact_is_trusted_outside_debug_mode() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("Foo.php");
        std::fs::write(&artifact, "generated").unwrap();
        // No metadata file at all, still fresh: non-debug mode never
        // re-checks dependencies.
        assert!(is_fresh(&artifact, &metadata_path(&artifact), false));
    }

    #[test]
    fn debug_mode_detects_changed_dependency_content() {
        let dir = tempfile::tempdir().unwrap();
        let dependency = dir.path().join("Foo.php");
        std::fs::write(&dependency, "<?php class Foo {}\n").unwrap();

        let artifact = dir.path().join("FooRepository.php");
        let meta = metadata_path(&artifact);
        let captured = Metadata::capture(&[Dependency {
            name: DeclName("app.Foo".to_string()),
            source: dependency.clone(),
        }])
        .unwrap();
        std::fs::write(&artifact, "generated").unwrap();
        std::fs::write(&meta, captured.serialize().unwrap()).unwrap();

        assert!(is_fresh(&artifact, &meta, true));

        std::fs::write(&dependency, "<?php class Foo { public int $id; }\n").unwrap();
        assert!(!is_fresh(&artifact, &meta, true));
    }

    #[test]
    fn debug_mode_treats_corrupt_metadata_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("Foo.php");
        let meta = metadata_path(&artifact);
        std::fs::write(&artifact, "generated").unwrap();
        std::fs::write(&meta, "not valid toml [").unwrap();
        assert!(!is_fresh(&artifact, &meta, true));
    }
}
