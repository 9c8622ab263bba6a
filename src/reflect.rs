//! Static field tables.
//!
//! A type that wants its instance fields captured individually (when it is neither a collection,
//! host-managed nor serializable) exposes a table of [`FieldDescriptor`]s through [`Reflect`].
//! The table is usually generated by `#[derive(Reflect)]`:
//!
//! ```rust
//! use snapcode::Reflect;
//!
//! #[derive(Default, Reflect)]
//! struct Brush {
//!     size: u32,
//!     #[snapshot(rename = "tip")]
//!     tip_name: String,
//!     #[snapshot(skip)]
//!     scratch: Vec<u8>,
//! }
//!
//! let names: Vec<_> = Brush::fields().iter().map(|f| f.name()).collect();
//! assert_eq!(names, ["size", "tip"]);
//! ```

use crate::value::{Value, ValueRef};
use std::any::{Any, TypeId};
use std::fmt;

/// Types exposing a static field table.
pub trait Reflect: Any {
    /// Returns one descriptor per captured instance field, in declaration order.
    fn fields() -> Vec<FieldDescriptor>;
}

/// Type-erased access to one field of one struct type.
trait FieldAccess: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any>;
    fn set(&self, owner: &mut dyn Any, value: Value) -> std::result::Result<(), Value>;
}

struct Accessor<S, F> {
    get: fn(&S) -> &F,
    get_mut: fn(&mut S) -> &mut F,
}

impl<S: Any, F: Any> FieldAccess for Accessor<S, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        let owner = owner.downcast_ref::<S>()?;
        Some((self.get)(owner) as &dyn Any)
    }

    fn set(&self, owner: &mut dyn Any, value: Value) -> std::result::Result<(), Value> {
        let Some(owner) = owner.downcast_mut::<S>() else {
            return Err(value);
        };
        *(self.get_mut)(owner) = value.downcast::<F>()?;
        Ok(())
    }
}

/// Name, declared type and accessors of a single field.
pub struct FieldDescriptor {
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    access: Box<dyn FieldAccess>,
}

impl FieldDescriptor {
    /// Describes field `name` of `S` with declared type `F`.
    pub fn new<S: Any, F: Any>(
        name: &'static str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Self {
        Self {
            name,
            type_id: TypeId::of::<F>(),
            type_name: std::any::type_name::<F>(),
            access: Box::new(Accessor { get, get_mut }),
        }
    }

    /// The name used to match captured and declared fields.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `TypeId` of the declared field type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust name of the declared field type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the field out of `owner`. `None` if `owner` is not the described struct.
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<ValueRef<'a>> {
        self.access
            .get(owner)
            .map(|any| ValueRef::erased(any, self.type_name))
    }

    /// Assigns `value` into the field. The value is handed back if it is not of the declared type.
    pub fn set(&self, owner: &mut dyn Any, value: Value) -> std::result::Result<(), Value> {
        self.access.set(owner, value)
    }

    /// Assignment compatibility: Rust has no subtyping, so only the exact declared type fits.
    pub fn accepts(&self, value: &Value) -> bool {
        value.type_id() == self.type_id
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pen {
        width: f32,
        label: String,
    }

    fn pen_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new::<Pen, f32>("width", |p| &p.width, |p| &mut p.width),
            FieldDescriptor::new::<Pen, String>("label", |p| &p.label, |p| &mut p.label),
        ]
    }

    #[test]
    fn get_and_set_through_erased_owner() {
        let fields = pen_fields();
        let mut pen = Pen {
            width: 1.5,
            label: "ink".into(),
        };

        let width = fields[0].get(&pen).and_then(|v| v.downcast_ref::<f32>().copied());
        assert_eq!(width, Some(1.5));

        assert!(fields[1].set(&mut pen, Value::new(String::from("lead"))).is_ok());
        assert_eq!(pen.label, "lead");
    }

    #[test]
    fn incompatible_assignment_is_refused() {
        let fields = pen_fields();
        let mut pen = Pen::default();
        let rejected = fields[0].set(&mut pen, Value::new(7_i32));
        assert!(rejected.is_err());
        assert_eq!(pen.width, 0.0);
        assert!(!fields[0].accepts(&Value::new(7_i32)));
    }
}
