//! Database bindings: route repository database names to connections.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::Error;
use crate::types::ConnectionRef;

/// Service id of the persistence layer for a named database.
/// `default` maps to `repogen.persistence.default`.
pub fn persistence_id(database: &str) -> String {
    return format!("repogen.persistence.{database}");
}

/// Unqualified alias for the default database's persistence service.
pub const DEFAULT_PERSISTENCE_ALIAS: &str = "repogen.persistence";

/// Class name registered for persistence services. The concrete
/// persistence layer is an external collaborator; the registry only
/// carries its name.
pub const PERSISTENCE_CLASS: &str = "repogen.Persistence";

/// Mapping from configured database names to connection references,
/// with exactly one name designated as default.
#[derive(Debug, Clone)]
pub struct DatabaseBindings {
    /// Database name to connection service reference.
    connections: BTreeMap<String, ConnectionRef>,
    /// The designated default database name.
    default: String,
}

impl DatabaseBindings {
    /// Build bindings from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigInvalid` if no database is configured or the
    /// default name has no entry — structural problems that abort
    /// orchestration before any generation.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        if config.databases.is_empty() {
            return Err(Error::ConfigInvalid {
                reason: "no databases configured".to_string(),
            });
        }
        let connections: BTreeMap<String, ConnectionRef> = config
            .databases
            .iter()
            .map(|(name, service)| return (name.clone(), ConnectionRef(service.clone())))
            .collect();
        if !connections.contains_key(&config.default_database) {
            return Err(Error::ConfigInvalid {
                reason: format!(
                    "default database `{}` has no connection entry",
                    config.default_database
                ),
            });
        }
        return Ok(Self {
            connections,
            default: config.default_database.clone(),
        });
    }

    /// The designated default database name.
    pub fn default_database(&self) -> &str {
        return &self.default;
    }

    /// Iterate configured (name, connection) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConnectionRef)> {
        return self.connections.iter().map(|(n, c)| return (n.as_str(), c));
    }

    /// Look up the connection reference for a database name.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDatabase` when the name has no entry. This is
    /// a configuration error, fatal to the whole orchestration — one bad
    /// declaration is skippable, a dangling database reference is not.
    pub fn resolve(&self, database: &str) -> Result<&ConnectionRef, Error> {
        return self.connections.get(database).ok_or_else(|| {
            return Error::UnknownDatabase {
                database: database.to_string(),
            };
        });
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::{DatabaseBindings, persistence_id};
    use crate::config::Config;
    use crate::error::Error;

    /// Parse inline TOML into a `Config`.
    fn config_with_databases(content: &str) -> Config {
        return toml::from_str(content).unwrap();
    }

    #[test]
    fn resolves_each_configured_database() {
        let config = config_with_databases(
            r#"
            [databases]
            default = "db.connection.default"
            other = "db.connection.other"
            "#,
        );
        let bindings = DatabaseBindings::from_config(&config).unwrap();
        assert_eq!(bindings.resolve("default").unwrap().0, "db.connection.default");
        assert_eq!(bindings.resolve("other").unwrap().0, "db.connection.other");
        assert_ne!(
            bindings.resolve("default").unwrap(),
            bindings.resolve("other").unwrap()
        );
    }

    #[test]
    fn unknown_database_is_an_error() {
        let config = config_with_databases(
            r#"
            [databases]
            default = "db.connection.default"
            "#,
        );
        let bindings = DatabaseBindings::from_config(&config).unwrap();
        assert!(matches!(
            bindings.resolve("analytics"),
            Err(Error::UnknownDatabase { .. })
        ));
    }

    #[test]
    fn missing_default_entry_is_config_invalid() {
        let config = config_with_databases(
            r#"
            default_database = "main"
            [databases]
            other = "db.connection.other"
            "#,
        );
        assert!(matches!(
            DatabaseBindings::from_config(&config),
            Err(Error::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn persistence_ids_are_per_database() {
        assert_eq!(persistence_id("default"), "repogen.persistence.default");
        assert_ne!(persistence_id("default"), persistence_id("other"));
    }
}
