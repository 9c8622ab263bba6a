//! Non-fatal anomalies reported while capturing or restoring.
//!
//! Every diagnostic is logged through `tracing` at `warn` level when it is reported and is also
//! appended to the [`SnapshotContext`](crate::SnapshotContext) that was driving the operation, so
//! hosts can surface them after the fact.

use std::fmt;

/// A recoverable anomaly. The operation that produced it continued with a degraded result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A generic argument name could not be resolved, or the registry holds no instantiation for
    /// the argument combination. The descriptor fell back to the open definition, or to the plain
    /// type when the persisted name no longer denotes a generic definition.
    GenericArgumentUnresolved {
        /// Name of the generic definition.
        definition: String,
        /// The persisted argument names.
        arguments: Vec<String>,
    },
    /// A nominally serializable value failed to encode; the blob tier was left empty.
    EncodingFailure {
        /// Snapshot name.
        name: String,
        /// Qualified type name.
        type_name: String,
        /// Codec message.
        reason: String,
    },
    /// A stored blob failed to decode; the value was default-constructed instead.
    DecodingFailure {
        /// Snapshot name.
        name: String,
        /// Qualified type name.
        type_name: String,
        /// Codec message.
        reason: String,
    },
    /// The restored type declares a different number of fields than were captured.
    FieldCountMismatch {
        /// Qualified type name.
        type_name: String,
        /// Fields declared by the type at restore time.
        declared: usize,
        /// Field snapshots stored at capture time.
        captured: usize,
    },
    /// No captured field matches a declared field by name. The field keeps its default.
    FieldNotFound {
        /// Qualified type name.
        type_name: String,
        /// The declared field.
        field: String,
    },
    /// The captured value does not have the declared field type. The field keeps its default.
    FieldTypeIncompatible {
        /// Qualified type name.
        type_name: String,
        /// The declared field.
        field: String,
        /// Declared field type.
        expected: String,
        /// Runtime type of the captured value.
        found: String,
    },
    /// A captured field could not be resolved at all. The field keeps its default.
    FieldRestoreFailed {
        /// Qualified type name.
        type_name: String,
        /// The declared field.
        field: String,
        /// Error message of the failed resolution.
        reason: String,
    },
    /// A collection refused a restored element (null or wrong element type).
    CollectionElementRejected {
        /// Qualified collection type name.
        type_name: String,
        /// Position of the element in the captured sequence.
        index: usize,
    },
    /// The host no longer knows the referenced object, or no host directory was supplied.
    HostObjectMissing {
        /// Snapshot name.
        name: String,
        /// Raw host identifier.
        id: u64,
    },
    /// A value of a type that was never registered was captured. Resolving it will fail.
    UnregisteredType {
        /// Snapshot name.
        name: String,
        /// Rust type name of the value.
        type_name: String,
    },
    /// Collection decomposition went deeper than the configured limit.
    DepthLimitExceeded {
        /// Snapshot name.
        name: String,
        /// The configured limit.
        limit: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenericArgumentUnresolved {
                definition,
                arguments,
            } => write!(
                f,
                "could not make generic definition '{definition}' concrete with [{}]",
                arguments.join(", ")
            ),
            Self::EncodingFailure {
                name,
                type_name,
                reason,
            } => write!(f, "could not encode '{name}' of type '{type_name}': {reason}"),
            Self::DecodingFailure {
                name,
                type_name,
                reason,
            } => write!(f, "could not decode '{name}' of type '{type_name}': {reason}"),
            Self::FieldCountMismatch {
                type_name,
                declared,
                captured,
            } => write!(
                f,
                "field count of '{type_name}' and captured member count don't match ({declared}:{captured})"
            ),
            Self::FieldNotFound { type_name, field } => {
                write!(f, "no matching captured field for '{type_name}.{field}'")
            }
            Self::FieldTypeIncompatible {
                type_name,
                field,
                expected,
                found,
            } => write!(
                f,
                "incompatible captured field type for '{type_name}.{field}': expected '{expected}', found '{found}'"
            ),
            Self::FieldRestoreFailed {
                type_name,
                field,
                reason,
            } => write!(f, "could not restore '{type_name}.{field}': {reason}"),
            Self::CollectionElementRejected { type_name, index } => {
                write!(f, "collection '{type_name}' rejected element #{index}")
            }
            Self::HostObjectMissing { name, id } => {
                write!(f, "host object #{id} referenced by '{name}' is gone")
            }
            Self::UnregisteredType { name, type_name } => {
                write!(f, "'{name}' has unregistered type '{type_name}'")
            }
            Self::DepthLimitExceeded { name, limit } => {
                write!(f, "'{name}' is nested deeper than {limit} collections")
            }
        }
    }
}
