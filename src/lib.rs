//! Repository code generation orchestration.
//!
//! Given source roots containing interface-like declarations marked as
//! repositories, this crate discovers them, asks an external [`compiler`]
//! collaborator for a concrete implementation per declaration, caches the
//! generated artifact on disk behind a dependency-freshness check, and
//! publishes everything into a [`registry`] routed to the right named
//! database. The host container integration layer owns the compiler and
//! consumes the registry; this crate only manages the
//! discover → compile-or-reuse → register lifecycle.

pub mod bindings;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod orchestrator;
pub mod registry;
pub mod scanner;
pub mod types;
