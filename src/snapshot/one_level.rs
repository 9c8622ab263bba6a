use super::{PersistedForm, PersistenceHooks, RecursiveSnapshot, Tier};
use crate::context::SnapshotContext;
use crate::descriptor::TypeDescriptor;
use crate::diagnostics::Diagnostic;
use crate::error::{Result, SnapshotError};
use crate::host::HostId;
use crate::registry::TypeHandle;
use crate::value::{Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

/// Snapshot of a single value without field-level decomposition.
///
/// Values whose type is neither a collection, host-managed nor serializable come back
/// default-constructed. Use [`RecursiveSnapshot`] unless that loss is intended.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OneLevelSnapshot {
    name: String,
    is_null: bool,
    #[serde(default)]
    object_type: Option<TypeDescriptor>,
    #[serde(default)]
    form: PersistedForm,
    #[serde(skip)]
    resolved: OnceCell<Option<Value>>,
}

impl OneLevelSnapshot {
    /// Captures `value` without a name.
    pub fn new(ctx: &SnapshotContext<'_>, value: impl Into<Option<Value>>) -> Self {
        Self::named(ctx, value, "")
    }

    /// Captures `value` under `name`. The live value stays readable until the entity is reloaded.
    pub fn named(
        ctx: &SnapshotContext<'_>,
        value: impl Into<Option<Value>>,
        name: impl Into<String>,
    ) -> Self {
        let value = value.into();
        let mut snapshot = Self::capture(ctx, value.as_ref().map(Value::view), name.into(), 0);
        snapshot.resolved = OnceCell::from(value);
        snapshot
    }

    pub(crate) fn capture(
        ctx: &SnapshotContext<'_>,
        value: Option<ValueRef<'_>>,
        name: String,
        depth: usize,
    ) -> Self {
        let Some(value) = value else {
            return Self::capture_null(name);
        };

        let (object_type, form) = match ctx.registry().handle_for(value.type_id()) {
            Some(handle) => {
                let form = capture_form(ctx, &handle, value, &name, depth);
                (TypeDescriptor::capture(&handle), form)
            }
            None => {
                ctx.report(Diagnostic::UnregisteredType {
                    name: name.clone(),
                    type_name: value.type_name().to_string(),
                });
                (
                    TypeDescriptor::capture_unregistered(value.type_name()),
                    PersistedForm::Empty,
                )
            }
        };

        let snapshot = Self {
            name,
            is_null: false,
            object_type: Some(object_type),
            form,
            resolved: OnceCell::new(),
        };
        tracing::debug!(
            name = %snapshot.name,
            type_name = snapshot.object_type.as_ref().map(TypeDescriptor::type_name),
            tier = ?snapshot.tier(),
            "captured"
        );
        snapshot
    }

    pub(crate) fn capture_null(name: String) -> Self {
        Self {
            name,
            is_null: true,
            ..Self::default()
        }
    }

    /// The identifying name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the captured value was absent.
    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// The captured type, absent for null snapshots.
    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        self.object_type.as_ref()
    }

    /// The populated persisted-form slot.
    pub fn form(&self) -> &PersistedForm {
        &self.form
    }

    /// The tier that produced this snapshot.
    pub fn tier(&self) -> Tier {
        match &self.form {
            _ if self.is_null => Tier::Null,
            PersistedForm::Elements(_) => Tier::Collection,
            PersistedForm::HostReference(_) => Tier::HostReference,
            PersistedForm::Blob(_) => Tier::Blob,
            PersistedForm::Empty => Tier::DefaultReconstruct,
        }
    }

    /// True once a value is cached (right after capture, or after the first read).
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// The resolved value. The first read after [`on_after_load`](PersistenceHooks::on_after_load)
    /// restores it; later reads return the cached value.
    ///
    /// # Errors
    /// [`SnapshotError::TypeResolution`] if the captured type is unknown to the registry and
    /// [`SnapshotError::NotConstructible`] if restoring needs a default the type cannot provide.
    pub fn value(&self, ctx: &SnapshotContext<'_>) -> Result<Option<&Value>> {
        if let Some(value) = self.resolved.get() {
            return Ok(value.as_ref());
        }
        let value = self.materialize(ctx)?;
        Ok(self.resolved.get_or_init(|| value).as_ref())
    }

    /// Consumes the snapshot, returning the cached value or restoring it.
    pub fn into_value(mut self, ctx: &SnapshotContext<'_>) -> Result<Option<Value>> {
        match self.resolved.take() {
            Some(value) => Ok(value),
            None => self.materialize(ctx),
        }
    }

    pub(crate) fn cache(&self) -> &OnceCell<Option<Value>> {
        &self.resolved
    }

    pub(crate) fn take_cache(&mut self) -> Option<Option<Value>> {
        self.resolved.take()
    }

    pub(crate) fn resolve_type(&self, ctx: &SnapshotContext<'_>) -> Result<TypeHandle> {
        self.object_type
            .as_ref()
            .ok_or_else(|| SnapshotError::type_resolution(""))?
            .resolve(ctx)
    }

    /// Restores a fresh value from the persisted form without touching the cache.
    pub(crate) fn materialize(&self, ctx: &SnapshotContext<'_>) -> Result<Option<Value>> {
        if self.is_null {
            return Ok(None);
        }
        let handle = self.resolve_type(ctx)?;
        if handle.is_generic_definition() {
            // An open definition has no storage to decode into.
            return handle.construct().map(Some);
        }

        match &self.form {
            PersistedForm::Elements(elements) => self.rebuild_collection(ctx, &handle, elements).map(Some),
            PersistedForm::HostReference(id) => Ok(self.find_host_object(ctx, *id)),
            PersistedForm::Blob(text) if !text.is_empty() => self.decode_blob(ctx, &handle, text).map(Some),
            PersistedForm::Blob(_) | PersistedForm::Empty => handle.construct().map(Some),
        }
    }

    fn rebuild_collection(
        &self,
        ctx: &SnapshotContext<'_>,
        handle: &TypeHandle,
        elements: &[RecursiveSnapshot],
    ) -> Result<Value> {
        let mut collection = handle.construct()?;
        let push = handle.collection_ops().map(|ops| ops.push);

        for (index, element) in elements.iter().enumerate() {
            let restored = match element.materialize(ctx) {
                Ok(restored) => restored,
                Err(error) => {
                    tracing::warn!(name = %element.name(), %error, "collection element lost");
                    None
                }
            };
            let accepted = match (push, restored) {
                (Some(push), Some(value)) => push(collection.as_any_mut(), value).is_ok(),
                _ => false,
            };
            if !accepted {
                ctx.report(Diagnostic::CollectionElementRejected {
                    type_name: handle.name().to_string(),
                    index,
                });
            }
        }
        Ok(collection)
    }

    fn find_host_object(&self, ctx: &SnapshotContext<'_>, id: HostId) -> Option<Value> {
        let found = ctx.host().and_then(|host| host.find(id));
        if found.is_none() {
            ctx.report(Diagnostic::HostObjectMissing {
                name: self.name.clone(),
                id: id.as_u64(),
            });
        }
        found
    }

    fn decode_blob(&self, ctx: &SnapshotContext<'_>, handle: &TypeHandle, text: &str) -> Result<Value> {
        let decoded = match handle.codec_ops() {
            Some(codec) => (codec.decode)(text),
            None => Err(SnapshotError::Decoding(format!(
                "'{}' is no longer serializable",
                handle.name()
            ))),
        };
        decoded.or_else(|error| {
            ctx.report(Diagnostic::DecodingFailure {
                name: self.name.clone(),
                type_name: handle.name().to_string(),
                reason: error.to_string(),
            });
            handle.construct()
        })
    }
}

/// Tiers 2 to 5 for a non-null value of a registered type.
fn capture_form(
    ctx: &SnapshotContext<'_>,
    handle: &TypeHandle,
    value: ValueRef<'_>,
    name: &str,
    depth: usize,
) -> PersistedForm {
    if let Some(ops) = handle.collection_ops() {
        let limit = ctx.options().depth_limit();
        if depth >= limit {
            ctx.report(Diagnostic::DepthLimitExceeded {
                name: name.to_string(),
                limit,
            });
            return PersistedForm::Empty;
        }
        let elements = (ops.elements)(value.as_any())
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                RecursiveSnapshot::capture(ctx, Some(element), format!("{name}[{index}]"), depth + 1)
            })
            .collect();
        tracing::trace!(name, element_type = ops.element_type, "decomposed collection");
        return PersistedForm::Elements(elements);
    }

    if let Some(id) = handle.host_id_of(value) {
        return PersistedForm::HostReference(id);
    }

    if let Some(codec) = handle.codec_ops() {
        match (codec.encode)(value.as_any(), &ctx.options().codec_options()) {
            Ok(blob) => return PersistedForm::Blob(blob),
            Err(error) => ctx.report(Diagnostic::EncodingFailure {
                name: name.to_string(),
                type_name: handle.name().to_string(),
                reason: error.to_string(),
            }),
        }
    }

    PersistedForm::Empty
}

impl PersistenceHooks for OneLevelSnapshot {
    fn on_before_save(&mut self) {
        tracing::trace!(name = %self.name, tier = ?self.tier(), "before save");
    }

    fn on_after_load(&mut self) {
        self.resolved.take();
        if let Some(descriptor) = self.object_type.as_mut() {
            descriptor.on_after_load();
        }
        if let PersistedForm::Elements(elements) = &mut self.form {
            elements.iter_mut().for_each(PersistenceHooks::on_after_load);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{TypeDef, TypeRegistry};

    #[derive(Debug, Default, PartialEq)]
    struct Cursor {
        line: u32,
    }

    fn registry() -> Result<TypeRegistry> {
        TypeRegistry::builder()
            .register(TypeDef::<Cursor>::new("demo::Cursor").default_constructible())
            .register_vec::<i32>()
            .build()
    }

    #[test]
    fn collections_take_priority_over_codec() -> Result<()> {
        let registry = registry()?;
        let ctx = SnapshotContext::new(&registry);
        let snapshot = OneLevelSnapshot::new(&ctx, Value::new(vec![1_i32, 2]));
        assert_eq!(snapshot.tier(), Tier::Collection);
        Ok(())
    }

    #[test]
    fn unserializable_values_come_back_as_default() -> Result<()> {
        let registry = registry()?;
        let ctx = SnapshotContext::new(&registry);
        let mut snapshot = OneLevelSnapshot::named(&ctx, Value::new(Cursor { line: 9 }), "cursor");
        assert_eq!(snapshot.tier(), Tier::DefaultReconstruct);
        assert_eq!(
            snapshot.value(&ctx)?.and_then(|v| v.downcast_ref::<Cursor>()),
            Some(&Cursor { line: 9 })
        );

        snapshot.on_after_load();
        assert!(!snapshot.is_resolved());
        assert_eq!(
            snapshot.value(&ctx)?.and_then(|v| v.downcast_ref::<Cursor>()),
            Some(&Cursor::default())
        );
        Ok(())
    }

    #[test]
    fn null_skips_every_tier() -> Result<()> {
        let registry = registry()?;
        let ctx = SnapshotContext::new(&registry);
        let mut snapshot = OneLevelSnapshot::new(&ctx, None::<Value>);
        snapshot.on_after_load();
        assert!(snapshot.is_null());
        assert!(snapshot.type_descriptor().is_none());
        assert!(snapshot.form().is_empty());
        assert!(snapshot.value(&ctx)?.is_none());
        Ok(())
    }
}
