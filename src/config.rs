//! Orchestration configuration: database map, source roots, cache location.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// Database name used when a repository does not specify one.
pub const DEFAULT_DATABASE: &str = "default";

/// Fixed subdirectory under the host cache directory that holds
/// generated artifacts.
pub const OUTPUT_SUBDIR: &str = "repogen";

/// One configured mapping from a source directory to a namespace prefix.
/// Roots are evaluated in configuration order.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRoot {
    /// Glob patterns excluding files from the scan. A pattern may match
    /// either the file name or the root-relative path; first match wins.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Namespace prefix for declarations found under this root.
    pub namespace: String,
    /// Directory containing the declaration source files.
    pub path: PathBuf,
}

/// Orchestration configuration, loaded from `repogen.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host cache directory; generated artifacts go to a fixed
    /// subdirectory underneath it.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Database name to connection service id. At least one required.
    #[serde(default)]
    pub databases: BTreeMap<String, String>,
    /// Strict freshness mode: re-check recorded dependencies on every
    /// run instead of trusting artifact existence.
    #[serde(default)]
    pub debug: bool,
    /// Name of the default database alias.
    #[serde(default = "default_database_name")]
    pub default_database: String,
    /// Source roots to scan for repository declarations, in order.
    #[serde(default)]
    pub source_roots: Vec<SourceRoot>,
}

/// Serde default for `cache_dir`.
fn default_cache_dir() -> PathBuf {
    return PathBuf::from("var/cache");
}

/// Serde default for `default_database`.
fn default_database_name() -> String {
    return DEFAULT_DATABASE.to_string();
}

impl Config {
    /// Read and parse a config file from disk.
    ///
    /// Unlike a missing optional config, a missing file here is an error —
    /// orchestration without databases or source roots cannot do anything.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or `Error::TomlDe` if the content is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Ok(toml::from_str(&content)?);
    }

    /// Directory that holds generated artifacts and their metadata.
    pub fn output_dir(&self) -> PathBuf {
        return self.cache_dir.join(OUTPUT_SUBDIR);
    }

    /// Check the configuration for structural problems.
    ///
    /// Runs before any generation; a broken configuration aborts the whole
    /// orchestration rather than one declaration.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigInvalid` if no database is configured, the
    /// default database has no entry, no source root is configured, or an
    /// exclude pattern is not a valid glob.
    pub fn validate(&self) -> Result<(), Error> {
        if self.databases.is_empty() {
            return Err(Error::ConfigInvalid {
                reason: "no databases configured".to_string(),
            });
        }
        if !self.databases.contains_key(&self.default_database) {
            return Err(Error::ConfigInvalid {
                reason: format!(
                    "default database `{}` has no connection entry",
                    self.default_database
                ),
            });
        }
        if self.source_roots.is_empty() {
            return Err(Error::ConfigInvalid {
                reason: "no source roots configured".to_string(),
            });
        }
        for root in &self.source_roots {
            for pattern in &root.exclude {
                if let Err(e) = glob::Pattern::new(pattern) {
                    return Err(Error::ConfigInvalid {
                        reason: format!("bad exclude pattern `{pattern}`: {e}"),
                    });
                }
            }
        }
        return Ok(());
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::Config;
    use crate::error::Error;

    /// Parse inline TOML into a `Config`.
    fn parse(content: &str) -> Config {
        return toml::from_str(content).unwrap();
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = parse(
            r#"
            [databases]
            default = "db.connection.default"
            [[source_roots]]
            path = "src/Repository"
            namespace = "app.repository"
            "#,
        );
        assert_eq!(config.default_database, "default");
        assert!(!config.debug);
        assert_eq!(config.output_dir(), std::path::PathBuf::from("var/cache/repogen"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_databases_is_invalid() {
        let config = parse(
            r#"
            [[source_roots]]
            path = "src"
            namespace = "app"
            "#,
        );
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn missing_default_database_entry_is_invalid() {
        let config = parse(
            r#"
            default_database = "main"
            [databases]
            other = "db.connection.other"
            [[source_roots]]
            path = "src"
            namespace = "app"
            "#,
        );
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn missing_source_roots_is_invalid() {
        let config = parse(
            r#"
            [databases]
            default = "db.connection.default"
            "#,
        );
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn bad_exclude_glob_is_invalid() {
        let config = parse(
            r#"
            [databases]
            default = "db.connection.default"
            [[source_roots]]
            path = "src"
            namespace = "app"
            exclude = ["[broken"]
            "#,
        );
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid { .. })));
    }
}
