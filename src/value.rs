//! Type-erased value handles.
//!
//! The engine moves live values around as [`Value`]: an owned `Box<dyn Any>` that also remembers
//! the Rust type name it was created from. The name is only used for types the registry does not
//! know, so the snapshot can still record *something* about them.

use std::any::{Any, TypeId};
use std::fmt;

/// An owned, type-erased live value.
pub struct Value {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps a concrete value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The Rust type name recorded at construction.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The `TypeId` of the wrapped value (not of the box).
    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Returns true if the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the wrapped value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Mutably borrows the wrapped value as `T`.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut::<T>()
    }

    /// Unwraps into `T`, handing the value back untouched on a type mismatch.
    pub fn downcast<T: Any>(self) -> std::result::Result<T, Value> {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(inner) => Err(Self { inner, type_name }),
        }
    }

    /// A borrowed view used by capture.
    pub fn view(&self) -> ValueRef<'_> {
        ValueRef {
            any: &*self.inner,
            type_name: self.type_name,
        }
    }

    pub(crate) fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut *self.inner
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}

/// A borrowed, type-erased value: a field, a collection element or a [`Value`] being captured.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    any: &'a dyn Any,
    type_name: &'static str,
}

impl<'a> ValueRef<'a> {
    /// Builds a view over a concrete reference.
    pub fn new<T: Any>(value: &'a T) -> Self {
        Self {
            any: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Builds a view over an erased reference whose declared type name is known.
    pub(crate) fn erased(any: &'a dyn Any, type_name: &'static str) -> Self {
        Self { any, type_name }
    }

    /// The Rust type name of the viewed value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The `TypeId` of the viewed value.
    pub fn type_id(&self) -> TypeId {
        self.any.type_id()
    }

    /// The underlying `dyn Any`.
    pub fn as_any(&self) -> &'a dyn Any {
        self.any
    }

    /// Borrows the viewed value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.any.downcast_ref::<T>()
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueRef<{}>", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_id_is_the_inner_type() {
        let value = Value::new(3_u16);
        assert_eq!(value.type_id(), TypeId::of::<u16>());
        assert_eq!(value.view().type_id(), TypeId::of::<u16>());
    }

    #[test]
    fn failed_downcast_returns_the_value() {
        let value = Value::new(String::from("kept"));
        let back = value.downcast::<i64>().err();
        assert_eq!(
            back.as_ref().and_then(|v| v.downcast_ref::<String>()).map(String::as_str),
            Some("kept")
        );
    }
}
