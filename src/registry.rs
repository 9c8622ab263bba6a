//! The type registry.
//!
//! Rust has no runtime type lookup, no activator and no field reflection, so every type that takes
//! part in snapshots is registered up front with the capabilities the engine may use on it:
//!
//! | Capability                 | Registered with                     | Used by tier            |
//! |----------------------------|-------------------------------------|-------------------------|
//! | element enumeration / add  | [`TypeDef::collection`]             | collection              |
//! | host identity              | [`TypeDef::host_managed`]           | host reference          |
//! | serde round trip           | [`TypeDef::serializable`]           | codec blob              |
//! | `Default` factory          | [`TypeDef::default_constructible`]  | default reconstruction  |
//! | field table                | [`TypeDef::reflect`]                | field-level restore     |
//!
//! Generic types cannot be instantiated at runtime either. A generic *definition* (for example
//! `Vec` with arity 1) exists implicitly for every registered instance, and
//! [`TypeRegistry::make_generic`] only succeeds for argument combinations that were registered.
//!
//! The registry is immutable once built and is handed to the engine explicitly through
//! [`SnapshotContext`](crate::SnapshotContext).

use crate::codec::{self, CodecOptions};
use crate::error::{Result, SnapshotError};
use crate::host::{HostId, HostObject};
use crate::reflect::{FieldDescriptor, Reflect};
use crate::value::{Value, ValueRef};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

// --- Erased capabilities ---

pub(crate) struct CollectionOps {
    pub(crate) element_type: &'static str,
    pub(crate) elements: for<'a> fn(&'a dyn Any) -> Vec<ValueRef<'a>>,
    pub(crate) push: fn(&mut dyn Any, Value) -> std::result::Result<(), Value>,
}

pub(crate) struct CodecOps {
    pub(crate) encode: fn(&dyn Any, &CodecOptions) -> Result<String>,
    pub(crate) decode: fn(&str) -> Result<Value>,
}

fn construct_default<T: Default + Any + Send + Sync>() -> Value {
    Value::new(T::default())
}

fn collection_elements<'a, C, E>(owner: &'a dyn Any) -> Vec<ValueRef<'a>>
where
    C: Any,
    E: Any,
    for<'b> &'b C: IntoIterator<Item = &'b E>,
{
    owner
        .downcast_ref::<C>()
        .map(|collection| collection.into_iter().map(ValueRef::new).collect())
        .unwrap_or_default()
}

fn collection_push<C, E>(owner: &mut dyn Any, value: Value) -> std::result::Result<(), Value>
where
    C: Any + Extend<E>,
    E: Any,
{
    let Some(collection) = owner.downcast_mut::<C>() else {
        return Err(value);
    };
    let element = value.downcast::<E>()?;
    collection.extend(std::iter::once(element));
    Ok(())
}

fn arc_host_id<T: HostObject>(owner: &dyn Any) -> Option<HostId> {
    owner.downcast_ref::<Arc<T>>().map(|handle| handle.host_id())
}

fn erased_encode<T: Serialize + Any>(owner: &dyn Any, options: &CodecOptions) -> Result<String> {
    let value = owner.downcast_ref::<T>().ok_or_else(|| {
        SnapshotError::Encoding(format!(
            "value is not a '{}'",
            std::any::type_name::<T>()
        ))
    })?;
    codec::encode(value, options)
}

fn erased_decode<T: DeserializeOwned + Any + Send + Sync>(text: &str) -> Result<Value> {
    codec::decode_required::<T>(text).map(Value::new)
}

// --- Type information ---

#[derive(Debug, Clone, PartialEq, Eq)]
struct GenericInstance {
    definition: String,
    arguments: Vec<String>,
}

/// Generic arguments known only by Rust type until the registry is built.
#[derive(Debug, Clone)]
struct DeferredArgs {
    definition: String,
    arguments: Vec<(TypeId, &'static str)>,
}

/// Everything the registry knows about one type.
pub struct TypeInfo {
    name: String,
    type_id: Option<TypeId>,
    rust_name: Option<&'static str>,
    generic: Option<GenericInstance>,
    deferred: Option<DeferredArgs>,
    arity: usize,
    compiler_generated: bool,
    factory: Option<fn() -> Value>,
    fields: Option<Vec<FieldDescriptor>>,
    collection: Option<CollectionOps>,
    host: Option<fn(&dyn Any) -> Option<HostId>>,
    codec: Option<CodecOps>,
}

impl TypeInfo {
    fn definition(name: String, arity: usize) -> Self {
        Self {
            name,
            type_id: None,
            rust_name: None,
            generic: None,
            deferred: None,
            arity,
            compiler_generated: false,
            factory: None,
            fields: None,
            collection: None,
            host: None,
            codec: None,
        }
    }

    /// Renames `Def` to `Def<A, B>` and records the instance.
    fn instantiate(&mut self, arguments: Vec<String>) {
        if arguments.is_empty() {
            return;
        }
        let definition = std::mem::take(&mut self.name);
        self.name = format!("{definition}<{}>", arguments.join(", "));
        self.generic = Some(GenericInstance {
            definition,
            arguments,
        });
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("rust_name", &self.rust_name)
            .field("generic", &self.generic)
            .field("arity", &self.arity)
            .field("default", &self.factory.is_some())
            .field("fields", &self.fields.as_ref().map(Vec::len))
            .field("collection", &self.collection.is_some())
            .field("host", &self.host.is_some())
            .field("codec", &self.codec.is_some())
            .finish()
    }
}

/// A cheap, clonable handle to a registered type. Two handles are equal if they point at the same
/// registration.
#[derive(Clone)]
pub struct TypeHandle(Arc<TypeInfo>);

impl TypeHandle {
    /// The qualified name. Generic instances are named `Definition<Arg1, Arg2>`.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The `TypeId` of the concrete type. `None` for generic definitions.
    pub fn type_id(&self) -> Option<TypeId> {
        self.0.type_id
    }

    /// The Rust type name the registration was made for.
    pub fn rust_name(&self) -> Option<&'static str> {
        self.0.rust_name
    }

    /// True for an open generic definition such as `Vec`.
    pub fn is_generic_definition(&self) -> bool {
        self.0.type_id.is_none() && self.0.arity > 0
    }

    /// True for a concrete instantiation of a generic definition.
    pub fn is_generic(&self) -> bool {
        self.0.generic.is_some()
    }

    /// The definition name of a generic instance.
    pub fn generic_definition(&self) -> Option<&str> {
        self.0.generic.as_ref().map(|g| g.definition.as_str())
    }

    /// The qualified argument names of a generic instance (empty otherwise).
    pub fn generic_arguments(&self) -> &[String] {
        self.0
            .generic
            .as_ref()
            .map(|g| g.arguments.as_slice())
            .unwrap_or_default()
    }

    /// Declared number of type parameters of a generic definition.
    pub fn arity(&self) -> usize {
        self.0.arity
    }

    /// True if the type was registered as emitted by tooling rather than written by a user.
    pub fn is_compiler_generated(&self) -> bool {
        self.0.compiler_generated
    }

    /// True if the type can be default-constructed.
    pub fn is_default_constructible(&self) -> bool {
        self.0.factory.is_some()
    }

    /// True if values use the collection tier.
    pub fn is_collection(&self) -> bool {
        self.0.collection.is_some()
    }

    /// True if values use the host reference tier.
    pub fn is_host_managed(&self) -> bool {
        self.0.host.is_some()
    }

    /// True if values use the codec tier.
    pub fn is_serializable(&self) -> bool {
        self.0.codec.is_some()
    }

    /// The static field table, if the type was registered with one.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        self.0.fields.as_deref()
    }

    /// Default-constructs a new instance.
    pub fn construct(&self) -> Result<Value> {
        self.0
            .factory
            .map(|factory| factory())
            .ok_or_else(|| SnapshotError::NotConstructible {
                type_name: self.0.name.clone(),
            })
    }

    pub(crate) fn collection_ops(&self) -> Option<&CollectionOps> {
        self.0.collection.as_ref()
    }

    pub(crate) fn host_id_of(&self, value: ValueRef<'_>) -> Option<HostId> {
        self.0.host.and_then(|host_id| host_id(value.as_any()))
    }

    pub(crate) fn codec_ops(&self) -> Option<&CodecOps> {
        self.0.codec.as_ref()
    }

    /// Returns true if both handles point at the same registration.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for TypeHandle {}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.0.name)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

// --- Registration ---

/// Registration of a single type `T`, assembled with builder methods.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use snapcode::{TypeDef, TypeRegistry};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Point { x: f32, y: f32 }
///
/// let registry = TypeRegistry::builder()
///     .register(TypeDef::<Point>::new("demo::Point").serializable().default_constructible())
///     .build()?;
/// assert!(registry.handle_of::<Point>().is_some_and(|t| t.is_serializable()));
/// # Ok::<(), snapcode::SnapshotError>(())
/// ```
pub struct TypeDef<T> {
    info: TypeInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeDef<T> {
    /// Starts a registration under the qualified `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let mut info = TypeInfo::definition(name.into(), 0);
        info.type_id = Some(TypeId::of::<T>());
        info.rust_name = Some(std::any::type_name::<T>());
        Self {
            info,
            _marker: PhantomData,
        }
    }

    /// A serializable, default-constructible value type.
    pub fn value(name: impl Into<String>) -> Self
    where
        T: Serialize + DeserializeOwned + Default,
    {
        Self::new(name).serializable().default_constructible()
    }

    /// An unserializable object restored field by field.
    pub fn object(name: impl Into<String>) -> Self
    where
        T: Reflect + Default,
    {
        Self::new(name).reflect().default_constructible()
    }

    /// Marks this registration as an instance of the generic definition named at [`TypeDef::new`],
    /// with the given qualified argument names. The qualified name becomes `Def<A, B>`.
    /// [`RegistryBuilder::build`] rejects argument names that match no registration.
    pub fn generic_args<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.info
            .instantiate(arguments.into_iter().map(Into::into).collect());
        self
    }

    /// Flags the type as tooling-generated (closures, anonymous records).
    pub fn compiler_generated(mut self) -> Self {
        self.info.compiler_generated = true;
        self
    }

    /// Registers a `Default` factory.
    pub fn default_constructible(mut self) -> Self
    where
        T: Default,
    {
        self.info.factory = Some(construct_default::<T>);
        self
    }

    /// Registers the static field table of `T`.
    pub fn reflect(mut self) -> Self
    where
        T: Reflect,
    {
        self.info.fields = Some(T::fields());
        self
    }

    /// Registers a serde round trip through the graph codec.
    pub fn serializable(mut self) -> Self
    where
        T: Serialize + DeserializeOwned,
    {
        self.info.codec = Some(CodecOps {
            encode: erased_encode::<T>,
            decode: erased_decode::<T>,
        });
        self
    }

    /// Registers `T` as a single-element-type collection over `E`.
    pub fn collection<E>(mut self) -> Self
    where
        E: Any,
        T: Extend<E>,
        for<'b> &'b T: IntoIterator<Item = &'b E>,
    {
        self.info.collection = Some(CollectionOps {
            element_type: std::any::type_name::<E>(),
            elements: collection_elements::<T, E>,
            push: collection_push::<T, E>,
        });
        self
    }
}

impl<T: HostObject> TypeDef<Arc<T>> {
    /// Values of this handle type are referenced, never copied.
    pub fn host_managed(mut self) -> Self {
        self.info.host = Some(arc_host_id::<T>);
        self
    }
}

/// Collects registrations and validates them into a [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<TypeInfo>,
}

macro_rules! register_primitives {
    ($builder:expr, $($t:ty),*) => {
        $builder
        $(
            .register(TypeDef::<$t>::value(stringify!($t)))
        )*
    }
}

impl RegistryBuilder {
    /// An empty builder with no types at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the scalar types and `String` as serializable values named like their Rust
    /// spelling (`i32`, `String`, ...).
    pub fn with_primitives(self) -> Self {
        register_primitives!(
            self, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool,
            char, String
        )
    }

    /// Adds one registration.
    pub fn register<T>(mut self, def: TypeDef<T>) -> Self {
        self.types.push(def.info);
        self
    }

    /// Registers `Vec<E>` as a collection named `Vec<elem>`, where `elem` is the name `E` is
    /// registered under. `E` may be registered before or after this call.
    pub fn register_vec<E: Any + Send + Sync>(self) -> Self {
        let mut def = TypeDef::<Vec<E>>::new("Vec")
            .collection::<E>()
            .default_constructible();
        def.info.deferred = Some(DeferredArgs {
            definition: "Vec".to_string(),
            arguments: vec![(TypeId::of::<E>(), std::any::type_name::<E>())],
        });
        self.register(def)
    }

    /// Names deferred generic arguments after their registered types. Instances whose arguments are
    /// themselves deferred instances resolve in later rounds.
    fn resolve_deferred(types: &mut [TypeInfo]) -> Result<()> {
        loop {
            let names: HashMap<TypeId, String> = types
                .iter()
                .filter(|info| info.deferred.is_none())
                .filter_map(|info| info.type_id.map(|id| (id, info.name.clone())))
                .collect();

            let mut progressed = false;
            let mut pending = None;
            for info in types.iter_mut() {
                let Some(deferred) = info.deferred.clone() else {
                    continue;
                };
                let arguments: Option<Vec<String>> = deferred
                    .arguments
                    .iter()
                    .map(|(id, _)| names.get(id).cloned())
                    .collect();
                match arguments {
                    Some(arguments) => {
                        info.name = deferred.definition;
                        info.deferred = None;
                        info.instantiate(arguments);
                        progressed = true;
                    }
                    None => pending = Some(deferred),
                }
            }

            match pending {
                None => return Ok(()),
                Some(_) if progressed => continue,
                Some(deferred) => {
                    let missing: Vec<&str> = deferred
                        .arguments
                        .iter()
                        .filter(|(id, _)| !names.contains_key(id))
                        .map(|(_, rust_name)| *rust_name)
                        .collect();
                    return Err(SnapshotError::Registry(format!(
                        "generic argument(s) [{}] of '{}' are not registered",
                        missing.join(", "),
                        deferred.definition
                    )));
                }
            }
        }
    }

    /// Validates the registrations.
    ///
    /// # Errors
    /// Returns [`SnapshotError::Registry`] when two registrations share a name or a Rust type,
    /// when instances of one generic definition disagree on its arity, or when a generic argument
    /// names no registered type.
    pub fn build(mut self) -> Result<TypeRegistry> {
        Self::resolve_deferred(&mut self.types)?;

        let mut registry = TypeRegistry {
            by_name: HashMap::new(),
            by_id: HashMap::new(),
            instances: HashMap::new(),
        };
        let mut arities: HashMap<String, usize> = HashMap::new();

        for info in self.types {
            if let Some(generic) = &info.generic {
                let arity = generic.arguments.len();
                match arities.entry(generic.definition.clone()) {
                    Entry::Occupied(known) if *known.get() != arity => {
                        return Err(SnapshotError::Registry(format!(
                            "generic definition '{}' registered with arity {} and {}",
                            generic.definition,
                            known.get(),
                            arity
                        )));
                    }
                    Entry::Occupied(_) => {}
                    Entry::Vacant(slot) => {
                        slot.insert(arity);
                    }
                }
            }

            let handle = TypeHandle(Arc::new(info));
            if let Some(type_id) = handle.type_id()
                && registry.by_id.insert(type_id, handle.clone()).is_some()
            {
                return Err(SnapshotError::Registry(format!(
                    "Rust type '{}' registered twice",
                    handle.rust_name().unwrap_or_default()
                )));
            }
            if registry
                .by_name
                .insert(handle.name().to_string(), handle.clone())
                .is_some()
            {
                return Err(SnapshotError::Registry(format!(
                    "type name '{}' registered twice",
                    handle.name()
                )));
            }
            if let Some(generic) = &handle.0.generic {
                registry.instances.insert(
                    (generic.definition.clone(), generic.arguments.clone()),
                    handle.clone(),
                );
            }
        }

        for (definition, arguments) in registry.instances.keys() {
            if let Some(unknown) = arguments
                .iter()
                .find(|name| !registry.by_name.contains_key(name.as_str()))
            {
                return Err(SnapshotError::Registry(format!(
                    "generic argument '{unknown}' of '{definition}' is not registered"
                )));
            }
        }

        for (definition, arity) in arities {
            match registry.by_name.get(&definition) {
                Some(existing) if !existing.is_generic_definition() => {
                    return Err(SnapshotError::Registry(format!(
                        "'{definition}' is both a concrete type and a generic definition"
                    )));
                }
                Some(_) => {}
                None => {
                    let handle = TypeHandle(Arc::new(TypeInfo::definition(definition.clone(), arity)));
                    registry.by_name.insert(definition, handle);
                }
            }
        }

        Ok(registry)
    }
}

/// Read-only lookup of registered types by name and by Rust type.
pub struct TypeRegistry {
    by_name: HashMap<String, TypeHandle>,
    by_id: HashMap<TypeId, TypeHandle>,
    instances: HashMap<(String, Vec<String>), TypeHandle>,
}

impl TypeRegistry {
    /// A builder pre-populated with the primitive types.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new().with_primitives()
    }

    /// Looks up a type or generic definition by qualified name.
    pub fn lookup(&self, name: &str) -> Option<TypeHandle> {
        self.by_name.get(name).cloned()
    }

    /// Looks up the registration for a Rust type.
    pub fn handle_for(&self, type_id: TypeId) -> Option<TypeHandle> {
        self.by_id.get(&type_id).cloned()
    }

    /// Looks up the registration for `T`.
    pub fn handle_of<T: Any>(&self) -> Option<TypeHandle> {
        self.handle_for(TypeId::of::<T>())
    }

    /// Substitutes `arguments` into a generic `definition`.
    ///
    /// Returns `None` if `definition` is not a generic definition, the argument count differs
    /// from its arity, or the combination was never registered.
    pub fn make_generic(
        &self,
        definition: &TypeHandle,
        arguments: &[TypeHandle],
    ) -> Option<TypeHandle> {
        if !definition.is_generic_definition() || arguments.len() != definition.arity() {
            return None;
        }
        let key = (
            definition.name().to_string(),
            arguments.iter().map(|a| a.name().to_string()).collect::<Vec<_>>(),
        );
        self.instances.get(&key).cloned()
    }

    /// Number of registered names (types and generic definitions).
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair<A, B>(A, B);

    impl<A: Default, B: Default> Default for Pair<A, B> {
        fn default() -> Self {
            Pair(A::default(), B::default())
        }
    }

    #[test]
    fn primitives_are_named_like_rust() -> Result<()> {
        let registry = TypeRegistry::builder().build()?;
        let handle = registry.lookup("i32").ok_or_else(|| SnapshotError::type_resolution("i32"))?;
        assert!(handle.is_serializable());
        assert!(handle.is_default_constructible());
        assert_eq!(registry.handle_of::<i32>(), Some(handle));
        Ok(())
    }

    #[test]
    fn generic_instances_create_their_definition() -> Result<()> {
        let registry = TypeRegistry::builder()
            .register(
                TypeDef::<Pair<i32, String>>::new("demo::Pair")
                    .generic_args(["i32", "String"])
                    .default_constructible(),
            )
            .build()?;

        let definition = registry.lookup("demo::Pair").ok_or_else(|| SnapshotError::type_resolution("demo::Pair"))?;
        assert!(definition.is_generic_definition());
        assert_eq!(definition.arity(), 2);
        assert!(!definition.is_default_constructible());

        let args: Vec<TypeHandle> = ["i32", "String"].iter().filter_map(|n| registry.lookup(n)).collect();
        let instance = registry.make_generic(&definition, &args);
        assert_eq!(instance.as_ref().map(TypeHandle::name), Some("demo::Pair<i32, String>"));

        let swapped: Vec<TypeHandle> = args.into_iter().rev().collect();
        assert!(registry.make_generic(&definition, &swapped).is_none());
        Ok(())
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = TypeRegistry::builder()
            .register(TypeDef::<Pair<u8, u8>>::new("i32"))
            .build();
        assert!(matches!(result, Err(SnapshotError::Registry(_))));
    }

    #[test]
    fn arity_conflicts_are_rejected() {
        let result = TypeRegistry::builder()
            .register(TypeDef::<Pair<u8, u8>>::new("Pair").generic_args(["u8", "u8"]))
            .register(TypeDef::<Vec<u8>>::new("Pair").generic_args(["u8"]))
            .build();
        assert!(matches!(result, Err(SnapshotError::Registry(_))));
    }

    #[test]
    fn vec_registration_uses_element_name() -> Result<()> {
        let registry = TypeRegistry::builder().register_vec::<i32>().build()?;
        let handle = registry.handle_of::<Vec<i32>>().ok_or_else(|| SnapshotError::type_resolution("Vec<i32>"))?;
        assert_eq!(handle.name(), "Vec<i32>");
        assert_eq!(handle.generic_definition(), Some("Vec"));
        assert!(handle.is_collection());
        Ok(())
    }

    #[derive(Default)]
    struct Point;

    #[test]
    fn vec_may_be_registered_before_its_element() -> Result<()> {
        let registry = TypeRegistry::builder()
            .register_vec::<Vec<Point>>()
            .register_vec::<Point>()
            .register(TypeDef::<Point>::new("demo::Point").default_constructible())
            .build()?;

        let inner = registry
            .handle_of::<Vec<Point>>()
            .ok_or_else(|| SnapshotError::type_resolution("Vec<demo::Point>"))?;
        assert_eq!(inner.name(), "Vec<demo::Point>");
        assert_eq!(inner.generic_arguments(), ["demo::Point"]);

        let outer = registry
            .handle_of::<Vec<Vec<Point>>>()
            .ok_or_else(|| SnapshotError::type_resolution("Vec<Vec<demo::Point>>"))?;
        assert_eq!(outer.name(), "Vec<Vec<demo::Point>>");

        let definition = registry.lookup("Vec").ok_or_else(|| SnapshotError::type_resolution("Vec"))?;
        assert_eq!(registry.make_generic(&definition, &[inner]), Some(outer));
        Ok(())
    }

    #[test]
    fn unregistered_vec_element_is_rejected() {
        let result = TypeRegistry::builder().register_vec::<Point>().build();
        assert!(matches!(result, Err(SnapshotError::Registry(msg)) if msg.contains("Point")));
    }

    #[test]
    fn unknown_generic_argument_names_are_rejected() {
        let result = TypeRegistry::builder()
            .register(TypeDef::<Pair<i32, Point>>::new("demo::Pair").generic_args(["i32", "demo::Point"]))
            .build();
        assert!(matches!(result, Err(SnapshotError::Registry(msg)) if msg.contains("demo::Point")));
    }
}
