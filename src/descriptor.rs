//! Persistable type identity.
//!
//! A [`TypeDescriptor`] remembers which registered type a value had, by name, so it can be looked
//! up again in a later session. Generic instances are stored as their definition name plus the
//! qualified names of their arguments (one level), and are made concrete again through
//! [`TypeRegistry::make_generic`](crate::TypeRegistry::make_generic).

use crate::context::SnapshotContext;
use crate::diagnostics::Diagnostic;
use crate::error::{Result, SnapshotError};
use crate::registry::TypeHandle;
use crate::snapshot::PersistenceHooks;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

/// Markers rustc puts into the names of closures, async blocks and other generated types.
const GENERATED_MARKERS: [&str; 4] = ["{{closure}}", "{{async_block}}", "{{async_fn_body}}", "{{coroutine}}"];

/// A type identity that survives persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    type_name: String,
    #[serde(default)]
    generic_args: Vec<String>,
    #[serde(skip)]
    resolved: OnceCell<TypeHandle>,
}

impl TypeDescriptor {
    /// Captures a registered type.
    pub fn capture(handle: &TypeHandle) -> Self {
        let (type_name, generic_args) = match handle.generic_definition() {
            Some(definition) => (definition.to_string(), handle.generic_arguments().to_vec()),
            None => (handle.name().to_string(), Vec::new()),
        };
        Self {
            type_name,
            generic_args,
            resolved: OnceCell::from(handle.clone()),
        }
    }

    /// Records a type the registry does not know. Resolving it fails with
    /// [`SnapshotError::TypeResolution`] unless a later registry registers that exact name.
    pub fn capture_unregistered(rust_type_name: &str) -> Self {
        Self {
            type_name: rust_type_name.to_string(),
            ..Self::default()
        }
    }

    /// The persisted base name: the qualified name, or the definition name of a generic instance.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The persisted argument names (empty for non-generic types).
    pub fn generic_args(&self) -> &[String] {
        &self.generic_args
    }

    /// The handle, if already captured or resolved.
    pub fn handle(&self) -> Option<&TypeHandle> {
        self.resolved.get()
    }

    /// Resolves the persisted names against the context's registry. The result is cached.
    ///
    /// # Errors
    /// Returns [`SnapshotError::TypeResolution`] if the base name is unknown. Unresolvable
    /// arguments only report [`Diagnostic::GenericArgumentUnresolved`] and yield the open generic
    /// definition, or the base type if that name is no longer generic.
    pub fn resolve(&self, ctx: &SnapshotContext<'_>) -> Result<TypeHandle> {
        if let Some(handle) = self.resolved.get() {
            return Ok(handle.clone());
        }

        let registry = ctx.registry();
        let base = registry
            .lookup(&self.type_name)
            .ok_or_else(|| SnapshotError::type_resolution(&self.type_name))?;

        let handle = if base.is_generic_definition() && !self.generic_args.is_empty() {
            let concrete = self
                .generic_args
                .iter()
                .map(|name| registry.lookup(name))
                .collect::<Option<Vec<_>>>()
                .and_then(|arguments| registry.make_generic(&base, &arguments));
            match concrete {
                Some(concrete) => concrete,
                None => {
                    ctx.report(Diagnostic::GenericArgumentUnresolved {
                        definition: self.type_name.clone(),
                        arguments: self.generic_args.clone(),
                    });
                    base
                }
            }
        } else {
            if !self.generic_args.is_empty() {
                ctx.report(Diagnostic::GenericArgumentUnresolved {
                    definition: self.type_name.clone(),
                    arguments: self.generic_args.clone(),
                });
            }
            base
        };

        Ok(self.resolved.get_or_init(|| handle).clone())
    }

    /// True if the type is an implementation detail emitted by the compiler (a closure, an async
    /// block) rather than a user-authored type.
    pub fn is_compiler_generated(&self) -> bool {
        if let Some(handle) = self.resolved.get() {
            if handle.is_compiler_generated() {
                return true;
            }
            if let Some(rust_name) = handle.rust_name() {
                return is_generated_name(rust_name);
            }
        }
        is_generated_name(&self.type_name)
    }
}

impl PersistenceHooks for TypeDescriptor {
    fn on_after_load(&mut self) {
        self.resolved.take();
    }
}

fn is_generated_name(name: &str) -> bool {
    GENERATED_MARKERS.iter().any(|marker| name.contains(marker))
}
