//! The service registry produced by one orchestration pass.
//!
//! Built once by [`crate::orchestrator::run`] and handed to the host
//! container integration layer; there is no ambient global state and the
//! registry is never mutated concurrently.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the constructor parameter that receives the persistence
/// service in generated repository implementations.
pub const CONNECTION_PARAMETER: &str = "persistence";

/// A named constructor argument bound to another service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Constructor parameter name.
    pub name: String,
    /// Id of the service bound to the parameter.
    pub service: String,
}

/// One registered service definition.
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    /// Named constructor arguments, if any.
    pub arguments: Vec<Argument>,
    /// Implementation class name.
    pub class: String,
    /// Source file backing the service, for generated artifacts.
    pub file: Option<PathBuf>,
    /// Service id. For repositories this is the generated name.
    pub id: String,
}

/// Registry of service definitions plus alias names.
///
/// Registration is idempotent: re-registering an id replaces the previous
/// definition, so repeated orchestration runs cannot accumulate stale
/// duplicates.
#[derive(Debug, Default)]
pub struct Registry {
    /// Alias name to target service id.
    aliases: BTreeMap<String, String>,
    /// Service id to definition.
    services: BTreeMap<String, ServiceDefinition>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Register an alias from a secondary name to a service id.
    pub fn alias(&mut self, from: &str, to: &str) {
        self.aliases.insert(from.to_string(), to.to_string());
    }

    /// Iterate alias (name, target) pairs in name order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        return self.aliases.iter().map(|(f, t)| return (f.as_str(), t.as_str()));
    }

    /// Look up a service definition by exact id, ignoring aliases.
    pub fn get(&self, id: &str) -> Option<&ServiceDefinition> {
        return self.services.get(id);
    }

    /// Whether the registry holds no service definitions.
    pub fn is_empty(&self) -> bool {
        return self.services.is_empty();
    }

    /// Number of registered service definitions (aliases not counted).
    pub fn len(&self) -> usize {
        return self.services.len();
    }

    /// Resolve a name to a service definition, following alias chains.
    /// Returns `None` for unknown names or alias cycles.
    pub fn resolve(&self, name: &str) -> Option<&ServiceDefinition> {
        let mut current = name;
        // Alias chains are short (interface -> generated); the bound only
        // guards against a malformed cyclic alias set.
        for _ in 0..=self.aliases.len() {
            if let Some(definition) = self.services.get(current) {
                return Some(definition);
            }
            current = self.aliases.get(current)?.as_str();
        }
        return None;
    }

    /// Register a service definition, replacing any previous one with the
    /// same id.
    pub fn set(&mut self, definition: ServiceDefinition) {
        self.services.insert(definition.id.clone(), definition);
    }

    /// Iterate service definitions in id order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceDefinition> {
        return self.services.values();
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::{Registry, ServiceDefinition};

    /// Definition with no arguments and no backing file.
    fn definition(id: &str) -> ServiceDefinition {
        return ServiceDefinition {
            arguments: Vec::new(),
            class: id.to_string(),
            file: None,
            id: id.to_string(),
        };
    }

    #[test]
    fn resolve_follows_alias_chain() {
        let mut registry = Registry::new();
        registry.set(definition("app.FooRepository"));
        registry.alias("app.FooRepositoryInterface", "app.FooRepository");
        registry.alias("foo", "app.FooRepositoryInterface");

        assert_eq!(registry.resolve("foo").unwrap().id, "app.FooRepository");
        assert_eq!(
            registry.resolve("app.FooRepositoryInterface").unwrap().id,
            "app.FooRepository"
        );
        assert!(registry.resolve("app.Missing").is_none());
    }

    #[test]
    fn alias_cycle_resolves_to_none() {
        let mut registry = Registry::new();
        registry.alias("a", "b");
        registry.alias("b", "a");
        assert!(registry.resolve("a").is_none());
    }

    #[test]
    fn re_registration_replaces_previous_definition() {
        let mut registry = Registry::new();
        registry.set(definition("app.FooRepository"));
        let mut updated = definition("app.FooRepository");
        updated.class = "app.FooRepositoryV2".to_string();
        registry.set(updated);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("app.FooRepository").unwrap().class, "app.FooRepositoryV2");
    }
}
