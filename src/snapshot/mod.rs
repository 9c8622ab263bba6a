//! Snapshot entities.
//!
//! [`RecursiveSnapshot`] is what collaborators construct. It wraps a [`OneLevelSnapshot`], which
//! holds the persisted form chosen by the first matching tier:
//!
//! 1. null: nothing but the null flag,
//! 2. collection: one [`RecursiveSnapshot`] per element, in enumeration order,
//! 3. host reference: the object's [`HostId`],
//! 4. codec blob: the text produced by the [codec](crate::codec),
//! 5. nothing: default reconstruction from the type, plus (for [`RecursiveSnapshot`] only) one
//!    [`OneLevelSnapshot`] per field.
//!
//! Field snapshots never carry field lists themselves, which caps field-level decomposition at one
//! level below the outer entity. Collection elements are full recursive snapshots, so collection
//! nesting is only bounded by [`SnapshotOptions::max_depth`](crate::SnapshotOptions::max_depth).

mod one_level;
mod recursive;

pub use one_level::OneLevelSnapshot;
pub use recursive::RecursiveSnapshot;

use crate::host::HostId;
use serde::{Deserialize, Serialize};

/// The single populated persisted-form slot of a snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
pub enum PersistedForm {
    /// Nothing stored: restore default-constructs from the type.
    #[default]
    Empty,
    /// Reference to an object owned by the host.
    HostReference(HostId),
    /// Codec blob.
    Blob(String),
    /// Decomposed collection elements.
    Elements(Vec<RecursiveSnapshot>),
}

impl PersistedForm {
    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// The capture strategy that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// The value was absent.
    Null,
    /// The value was decomposed into elements.
    Collection,
    /// The value is referenced through the host.
    HostReference,
    /// The value was encoded into a blob.
    Blob,
    /// Nothing could be stored; the value is rebuilt from its type.
    DefaultReconstruct,
}

/// Boundary with the host's persistence mechanism.
pub trait PersistenceHooks {
    /// Called right before the host persists the entity.
    fn on_before_save(&mut self) {}

    /// Called right after the host rebuilt the entity's persisted fields and before anyone reads
    /// the resolved value.
    fn on_after_load(&mut self);
}
