//! Centralized error handling for snapcode.
//!
//! Only failures that leave the engine unable to produce *any* value are errors. Everything else
//! (a field that vanished between capture and restore, a blob that no longer decodes, a generic
//! argument that is not registered anymore) is reported as a [`Diagnostic`](crate::Diagnostic)
//! and absorbed with a degraded result.
//!
//! ## Error Categories
//!
//! - **Type resolution** ([`SnapshotError::TypeResolution`]): the persisted base type name is not
//!   known to the registry. No value can be produced.
//! - **Construction** ([`SnapshotError::NotConstructible`]): the type resolved but has no registered
//!   default factory (this includes open generic definitions).
//! - **Codec** ([`SnapshotError::Encoding`], [`SnapshotError::Decoding`]): raised by the
//!   [`codec`](crate::codec) module. The snapshot layer converts them into diagnostics.
//! - **Compression** ([`SnapshotError::Compression`]): a blob names an unavailable or failing
//!   compression algorithm.
//! - **Registry** ([`SnapshotError::Registry`]): conflicting registrations detected by
//!   [`RegistryBuilder::build`](crate::RegistryBuilder::build).
//!
//! ## Usage
//!
//! ```rust
//! use snapcode::{RecursiveSnapshot, SnapshotContext, SnapshotError, TypeRegistry, Value};
//!
//! let registry = TypeRegistry::builder().build()?;
//! let ctx = SnapshotContext::new(&registry);
//! let snapshot = RecursiveSnapshot::new(&ctx, Some(Value::new(7_i32)));
//!
//! match snapshot.value(&ctx) {
//!     Ok(Some(v)) => assert_eq!(v.downcast_ref::<i32>(), Some(&7)),
//!     Ok(None) => unreachable!(),
//!     Err(SnapshotError::TypeResolution { type_name }) => eprintln!("lost type {type_name}"),
//!     Err(e) => eprintln!("other error: {e}"),
//! }
//! # Ok::<(), snapcode::SnapshotError>(())
//! ```

/// A specialized `Result` type for snapcode operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// The master error enum covering every fatal failure in snapcode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The persisted base type name could not be found in the registry.
    ///
    /// Raised when a snapshot is resolved against a registry that does not know the type it was
    /// captured from, either because the type was renamed, removed, or never registered.
    #[error("could not resolve type '{type_name}'")]
    TypeResolution {
        /// The persisted (qualified) type name.
        type_name: String,
    },

    /// The type resolved but cannot be default-constructed.
    ///
    /// The type was registered without [`TypeDef::default_constructible`](crate::TypeDef::default_constructible),
    /// or the descriptor degraded to an open generic definition.
    #[error("type '{type_name}' has no default factory")]
    NotConstructible {
        /// The qualified name of the resolved type.
        type_name: String,
    },

    /// The codec could not encode a value graph.
    ///
    /// The string carries the message of the underlying bincode error.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The codec could not decode a blob (invalid base64, truncated payload, type mismatch).
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Compression or decompression of a blob failed.
    #[error("compression error: {0}")]
    Compression(String),

    /// The registry was configured inconsistently (duplicate names, arity mismatches).
    #[error("registry error: {0}")]
    Registry(String),
}

impl SnapshotError {
    pub(crate) fn type_resolution(type_name: impl Into<String>) -> Self {
        Self::TypeResolution {
            type_name: type_name.into(),
        }
    }

    /// Returns true for failures caused by the persisted type identity rather than the data.
    pub fn is_type_failure(&self) -> bool {
        matches!(
            self,
            Self::TypeResolution { .. } | Self::NotConstructible { .. }
        )
    }
}
