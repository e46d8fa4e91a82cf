//! The orchestration pass: scan, filter, compile-or-reuse, register.

use std::path::Path;

use tracing::{error, info, warn};

use crate::bindings::{
    DEFAULT_PERSISTENCE_ALIAS, DatabaseBindings, PERSISTENCE_CLASS, persistence_id,
};
use crate::cache;
use crate::compiler::{Compiler, Prepared};
use crate::config::Config;
use crate::error::Error;
use crate::registry::{Argument, CONNECTION_PARAMETER, Registry, ServiceDefinition};
use crate::scanner;
use crate::types::DeclName;

/// Run one orchestration pass and return the populated registry.
///
/// For each source root, in configuration order: scan candidate
/// declarations, prepare each through the compiler, resolve its database
/// binding, resolve its cache entry (compiling when stale), and register
/// the generated service plus an alias from the originating declaration.
///
/// An unreadable root aborts only that root; a malformed or uncompilable
/// declaration aborts only that declaration. Configuration problems —
/// including a repository naming an unknown database — abort the whole
/// run.
///
/// # Errors
///
/// Returns `Error::ConfigInvalid` for a structurally broken configuration
/// or `Error::UnknownDatabase` when a repository references a database
/// with no configured connection.
pub fn run(config: &Config, compiler: &dyn Compiler) -> Result<Registry, Error> {
    config.validate()?;
    let bindings = DatabaseBindings::from_config(config)?;
    let output_dir = config.output_dir();

    let mut registry = Registry::new();
    register_persistence_services(&mut registry, &bindings);

    for root in &config.source_roots {
        let names = match scanner::scan(root, compiler.source_extension()) {
            Err(e) => {
                error!(root = %root.path.display(), "skipping source root: {e}");
                continue;
            },
            Ok(names) => names,
        };
        for name in names {
            process_declaration(
                &mut registry,
                &bindings,
                compiler,
                &output_dir,
                config.debug,
                &name,
            )?;
        }
    }

    info!(services = registry.len(), "orchestration complete");
    return Ok(registry);
}

/// Register one persistence service per configured database, each bound
/// to its connection reference, plus the default persistence alias.
fn register_persistence_services(registry: &mut Registry, bindings: &DatabaseBindings) {
    for (database, connection) in bindings.iter() {
        registry.set(ServiceDefinition {
            arguments: vec![Argument {
                name: "connection".to_string(),
                service: connection.0.clone(),
            }],
            class: PERSISTENCE_CLASS.to_string(),
            file: None,
            id: persistence_id(database),
        });
    }
    registry.alias(
        DEFAULT_PERSISTENCE_ALIAS,
        &persistence_id(bindings.default_database()),
    );
}

/// Prepare, compile-or-reuse, and register a single scanned declaration.
///
/// Non-repositories are skipped silently; malformed repositories and
/// compiler failures are logged and skipped so the rest of the scan
/// continues.
///
/// # Errors
///
/// Returns `Error::UnknownDatabase` (fatal) when the declaration's
/// database has no configured binding. The binding is checked before the
/// cache is touched, so a broken configuration never writes an artifact.
fn process_declaration(
    registry: &mut Registry,
    bindings: &DatabaseBindings,
    compiler: &dyn Compiler,
    output_dir: &Path,
    debug: bool,
    name: &DeclName,
) -> Result<(), Error> {
    let descriptor = match compiler.prepare(name) {
        Err(e @ Error::Preparation { .. }) => {
            warn!("skipping declaration: {e}");
            return Ok(());
        },
        Err(e) => return Err(e),
        Ok(Prepared::NotARepository) => return Ok(()),
        Ok(Prepared::Repository(descriptor)) => descriptor,
    };

    bindings.resolve(&descriptor.database)?;

    let artifact = match cache::resolve(compiler, &descriptor, output_dir, debug) {
        Err(e @ (Error::CacheIo { .. } | Error::Io(_))) => {
            // Reported at error level, but one bad cache path must not
            // abort the remaining repositories.
            error!("cache failure for `{}`: {e}", descriptor.source);
            return Ok(());
        },
        Err(e @ Error::Compilation { .. }) => {
            warn!("skipping repository: {e}");
            return Ok(());
        },
        Err(e) => return Err(e),
        Ok(artifact) => artifact,
    };

    let mut arguments = Vec::new();
    if descriptor.has_connection_parameter {
        arguments.push(Argument {
            name: CONNECTION_PARAMETER.to_string(),
            service: persistence_id(&descriptor.database),
        });
    }

    let generated = descriptor.generated_name.as_str().to_string();
    registry.set(ServiceDefinition {
        arguments,
        class: generated.clone(),
        file: Some(artifact),
        id: generated.clone(),
    });
    registry.alias(descriptor.source.as_str(), &generated);

    return Ok(());
}
