//! # snapcode
//!
//! Capture and restore of opaque runtime values for undo/redo histories and checkpoints.
//!
//! ## Overview
//!
//! An editor that records "before" and "after" states for undo cannot know in advance what kind of
//! value a property holds. snapcode turns any value of a registered type into a snapshot entity
//! that the host can persist with its own serde pipeline, and turns that entity back into a live
//! value later, possibly after the program restarted and the types evolved.
//!
//! ### Key Features
//!
//! *   **Tiered capture:** each value is stored the cheapest faithful way available. Absent values
//!     become a flag, collections are decomposed element by element, host-owned objects are stored
//!     as references, serializable values become a compact text blob, and everything else is
//!     rebuilt from its default plus its captured fields.
//! *   **Identity preservation:** host-managed objects come back as the very same handle, never as
//!     a copy.
//! *   **Schema tolerance:** fields that were renamed, removed or retyped since capture are
//!     reported and skipped. The rest of the value is still restored.
//! *   **Lazy resolution:** persisted entities resolve on first read and cache the result.
//!
//! ## Core Concepts
//!
//! ### Registry
//!
//! Rust has no runtime reflection, so the engine only works on types registered in a
//! [`TypeRegistry`]. A registration lists the capabilities the engine may use: element enumeration,
//! host identity, serde round trip, default construction and a static field table.
//!
//! ### Context
//!
//! Every capture and restore runs against a [`SnapshotContext`], which carries the registry, the
//! host's object directory, the [`SnapshotOptions`] and the sink for [`Diagnostic`]s.
//!
//! ### Snapshots
//!
//! [`RecursiveSnapshot`] is the entity collaborators construct. It wraps a [`OneLevelSnapshot`]
//! holding the persisted form and, for values rebuilt from their default, one field snapshot per
//! field.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use snapcode::{PersistenceHooks, RecursiveSnapshot, SnapshotContext, Tier, TypeDef, TypeRegistry, Value};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Color { r: u8, g: u8, b: u8 }
//!
//! let registry = TypeRegistry::builder()
//!     .register(TypeDef::<Color>::value("paint::Color"))
//!     .build()?;
//! let ctx = SnapshotContext::new(&registry);
//!
//! let snapshot = RecursiveSnapshot::named(&ctx, Value::new(Color { r: 255, g: 128, b: 0 }), "fill");
//! assert_eq!(snapshot.tier(), Tier::Blob);
//!
//! // Persist with any serde format, then reload.
//! let json = serde_json::to_string(&snapshot).map_err(|e| snapcode::SnapshotError::Encoding(e.to_string()))?;
//! let mut loaded: RecursiveSnapshot =
//!     serde_json::from_str(&json).map_err(|e| snapcode::SnapshotError::Decoding(e.to_string()))?;
//! loaded.on_after_load();
//!
//! let color = loaded.value(&ctx)?.and_then(|v| v.downcast_ref::<Color>());
//! assert_eq!(color, Some(&Color { r: 255, g: 128, b: 0 }));
//! # Ok::<(), snapcode::SnapshotError>(())
//! ```
//!
//! ### Safety and Error Handling
//!
//! The crate forbids `unsafe` code. Only failures that leave no value at all surface as
//! [`SnapshotError`]; every other anomaly is a [`Diagnostic`], logged through `tracing` and
//! collected on the context.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// Lets `#[derive(Reflect)]` expand inside this crate's own tests.
extern crate self as snapcode;

// --- PUBLIC API MODULES ---
pub mod codec;
pub mod compression;
pub mod context;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod reflect;
pub mod registry;
pub mod snapshot;
pub mod value;

// --- RE-EXPORTS ---

#[cfg(feature = "lz4_flex")]
pub use compression::Lz4Compressor;
pub use compression::{Compressor, CompressorRegistry, NoCompression};

pub use context::{SnapshotContext, SnapshotOptions};
pub use descriptor::TypeDescriptor;
pub use diagnostics::Diagnostic;
pub use error::{Result, SnapshotError};
pub use host::{HostId, HostObject, HostObjects};
pub use reflect::{FieldDescriptor, Reflect};
pub use registry::{RegistryBuilder, TypeDef, TypeHandle, TypeRegistry};
pub use snapshot::{OneLevelSnapshot, PersistedForm, PersistenceHooks, RecursiveSnapshot, Tier};
pub use value::{Value, ValueRef};

// Re-export the derive macro so it is accessible as `snapcode::Reflect`
#[cfg(feature = "derive")]
pub use snapcode_derive::Reflect;
