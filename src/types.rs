/// Core domain types for declarations, descriptors, and fingerprints.
use std::fmt;
use std::path::PathBuf;

/// Opaque host service id of a database connection.
/// Newtype prevents mixing with arbitrary service ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ConnectionRef(
    /// The host container's service id for the connection.
    pub String,
);

/// Fully-qualified dotted declaration name, e.g. `app.repository.FooRepositoryInterface`.
///
/// Derived from a source root's namespace prefix plus the file's relative
/// path (separators mapped to `.`, extension stripped). See
/// [`crate::scanner::declaration_name`] for the derivation rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct DeclName(
    /// The dotted name string.
    pub String,
);

impl DeclName {
    /// Borrow the dotted name as a string slice.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// Map the dotted name to a relative file path with the given extension.
    ///
    /// `app.repository.FooRepository` with extension `php` becomes
    /// `app/repository/FooRepository.php`. Inverse of the derivation in the
    /// scanner; used to address cache artifacts deterministically.
    pub fn to_relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.0.split('.').collect();
        path.set_extension(extension);
        return path;
    }
}

impl fmt::Display for DeclName {
    /// Write the dotted name as-is.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// A declaration whose source content affects a repository's generated
/// output, resolved to its file by the compiler's prepare step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Declaration name of the dependency.
    pub name: DeclName,
    /// Path to the dependency's source file.
    pub source: PathBuf,
}

/// A content fingerprint — 64 hex chars, always lowercase SHA-256.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fingerprint(
    /// The hex-encoded digest string.
    pub String,
);

/// Generation-relevant metadata for one repository declaration.
///
/// Produced by the compiler's prepare step, read-only afterwards, and
/// recomputed on every run — preparation is cheap relative to compilation,
/// so descriptors are never persisted.
#[derive(Debug, Clone)]
pub struct RepositoryDescriptor {
    /// Name of the database this repository is configured against.
    pub database: String,
    /// Declarations whose content affects the generated output.
    pub dependencies: Vec<Dependency>,
    /// Name of the generated implementation class.
    pub generated_name: DeclName,
    /// Whether the generated constructor takes a connection parameter.
    /// Empty marker repositories have no persistence dependency.
    pub has_connection_parameter: bool,
    /// The originating repository interface declaration.
    pub source: DeclName,
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::DeclName;
    use std::path::PathBuf;

    #[test]
    fn decl_name_maps_dots_to_path_separators() {
        let name = DeclName("app.repository.FooRepository".to_string());
        assert_eq!(
            name.to_relative_path("php"),
            PathBuf::from("app/repository/FooRepository.php")
        );
    }

    #[test]
    fn single_segment_name_is_bare_file() {
        let name = DeclName("FooRepository".to_string());
        assert_eq!(name.to_relative_path("php"), PathBuf::from("FooRepository.php"));
    }
}
