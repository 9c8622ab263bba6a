use super::{OneLevelSnapshot, PersistedForm, PersistenceHooks, Tier};
use crate::context::SnapshotContext;
use crate::descriptor::TypeDescriptor;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::registry::TypeHandle;
use crate::value::{Value, ValueRef};
use serde::{Deserialize, Serialize};

/// Snapshot of an arbitrary value, restoring unserializable values field by field.
///
/// When none of the storing tiers applies, every field of the value's field table is captured as
/// its own [`OneLevelSnapshot`]. On restore the default-constructed instance gets each field
/// patched back in by name; fields that vanished, changed type or fail to restore keep their
/// default and are reported as [`Diagnostic`]s.
///
/// ```rust
/// use snapcode::{
///     PersistenceHooks, RecursiveSnapshot, Reflect, SnapshotContext, TypeDef, TypeRegistry, Value,
/// };
///
/// #[derive(Debug, Default, PartialEq, Reflect)]
/// struct Selection {
///     anchor: usize,
///     head: usize,
/// }
///
/// let registry = TypeRegistry::builder()
///     .register(TypeDef::<Selection>::object("editor::Selection"))
///     .build()?;
/// let ctx = SnapshotContext::new(&registry);
///
/// let mut snapshot = RecursiveSnapshot::named(&ctx, Value::new(Selection { anchor: 3, head: 8 }), "sel");
/// snapshot.on_before_save();
/// snapshot.on_after_load();
///
/// let restored = snapshot.value(&ctx)?.and_then(|v| v.downcast_ref::<Selection>());
/// assert_eq!(restored, Some(&Selection { anchor: 3, head: 8 }));
/// # Ok::<(), snapcode::SnapshotError>(())
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecursiveSnapshot {
    base: OneLevelSnapshot,
    #[serde(default)]
    fields: Option<Vec<OneLevelSnapshot>>,
}

impl RecursiveSnapshot {
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
        let snapshot = Self::capture(ctx, value.as_ref().map(Value::view), name.into(), 0);
        // Capture never reads the cache, so it is still empty here.
        let _ = snapshot.base.cache().set(value);
        snapshot
    }

    /// A snapshot of an absent value.
    pub fn null(name: impl Into<String>) -> Self {
        Self {
            base: OneLevelSnapshot::capture_null(name.into()),
            fields: None,
        }
    }

    pub(crate) fn capture(
        ctx: &SnapshotContext<'_>,
        value: Option<ValueRef<'_>>,
        name: String,
        depth: usize,
    ) -> Self {
        let base = OneLevelSnapshot::capture(ctx, value, name, depth);
        let fields = match (value, base.form()) {
            (Some(value), PersistedForm::Empty) => capture_fields(ctx, &base, value, depth),
            _ => None,
        };
        Self { base, fields }
    }

    /// The identifying name.
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// True if the captured value was absent.
    pub fn is_null(&self) -> bool {
        self.base.is_null()
    }

    /// The captured type, absent for null snapshots.
    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        self.base.type_descriptor()
    }

    /// The populated persisted-form slot.
    pub fn form(&self) -> &PersistedForm {
        self.base.form()
    }

    /// The tier that produced this snapshot.
    pub fn tier(&self) -> Tier {
        self.base.tier()
    }

    /// The wrapped one-level snapshot.
    pub fn base(&self) -> &OneLevelSnapshot {
        &self.base
    }

    /// Per-field snapshots, present only for values restored by default reconstruction.
    pub fn field_snapshots(&self) -> Option<&[OneLevelSnapshot]> {
        self.fields.as_deref()
    }

    /// True once a value is cached (right after capture, or after the first read).
    pub fn is_resolved(&self) -> bool {
        self.base.is_resolved()
    }

    /// The resolved value. The first read after [`on_after_load`](PersistenceHooks::on_after_load)
    /// restores it; later reads return the cached value.
    ///
    /// # Errors
    /// Fails only when the captured type itself cannot be resolved or constructed.
    pub fn value(&self, ctx: &SnapshotContext<'_>) -> Result<Option<&Value>> {
        if let Some(value) = self.base.cache().get() {
            return Ok(value.as_ref());
        }
        let value = self.materialize(ctx)?;
        Ok(self.base.cache().get_or_init(|| value).as_ref())
    }

    /// Consumes the snapshot, returning the cached value or restoring it.
    pub fn into_value(mut self, ctx: &SnapshotContext<'_>) -> Result<Option<Value>> {
        match self.base.take_cache() {
            Some(value) => Ok(value),
            None => self.materialize(ctx),
        }
    }

    /// Restores a fresh value without touching the cache.
    pub(crate) fn materialize(&self, ctx: &SnapshotContext<'_>) -> Result<Option<Value>> {
        let Some(mut value) = self.base.materialize(ctx)? else {
            return Ok(None);
        };
        if let Some(fields) = &self.fields {
            let handle = self.base.resolve_type(ctx)?;
            restore_fields(ctx, &handle, &mut value, fields);
        }
        Ok(Some(value))
    }
}

fn capture_fields(
    ctx: &SnapshotContext<'_>,
    base: &OneLevelSnapshot,
    value: ValueRef<'_>,
    depth: usize,
) -> Option<Vec<OneLevelSnapshot>> {
    let table = base.type_descriptor()?.handle()?.fields()?;
    let fields = table
        .iter()
        .filter_map(|field| {
            let field_value = field.get(value.as_any())?;
            Some(OneLevelSnapshot::capture(
                ctx,
                Some(field_value),
                field.name().to_string(),
                depth,
            ))
        })
        .collect();
    Some(fields)
}

fn restore_fields(
    ctx: &SnapshotContext<'_>,
    handle: &TypeHandle,
    value: &mut Value,
    captured: &[OneLevelSnapshot],
) {
    let declared = handle.fields().unwrap_or_default();
    if declared.len() != captured.len() {
        ctx.report(Diagnostic::FieldCountMismatch {
            type_name: handle.name().to_string(),
            declared: declared.len(),
            captured: captured.len(),
        });
    }

    for field in declared {
        let Some(entry) = captured.iter().find(|entry| entry.name() == field.name()) else {
            ctx.report(Diagnostic::FieldNotFound {
                type_name: handle.name().to_string(),
                field: field.name().to_string(),
            });
            continue;
        };

        let restored = match entry.materialize(ctx) {
            Ok(Some(restored)) => restored,
            Ok(None) => {
                tracing::debug!(field = field.name(), "captured null, field keeps its default");
                continue;
            }
            Err(error) => {
                ctx.report(Diagnostic::FieldRestoreFailed {
                    type_name: handle.name().to_string(),
                    field: field.name().to_string(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        let found = restored.type_name();
        if !field.accepts(&restored) || field.set(value.as_any_mut(), restored).is_err() {
            ctx.report(Diagnostic::FieldTypeIncompatible {
                type_name: handle.name().to_string(),
                field: field.name().to_string(),
                expected: field.type_name().to_string(),
                found: found.to_string(),
            });
        }
    }
}

impl PersistenceHooks for RecursiveSnapshot {
    fn on_before_save(&mut self) {
        self.base.on_before_save();
    }

    fn on_after_load(&mut self) {
        self.base.on_after_load();
        if let Some(fields) = self.fields.as_mut() {
            fields.iter_mut().for_each(PersistenceHooks::on_after_load);
        }
    }
}
