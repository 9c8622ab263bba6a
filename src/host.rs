//! Host-managed references.
//!
//! Objects whose lifetime belongs to an external runtime (scene nodes, assets, documents) are never
//! copied into a snapshot. The snapshot stores the object's [`HostId`] and asks the host for the
//! very same handle on restore.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a host-managed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(u64);

impl HostId {
    /// Creates a new HostId.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Implemented by objects owned by the host runtime.
///
/// Register `Arc<T>` with [`TypeDef::host_managed`](crate::TypeDef::host_managed) to make values of
/// that handle type use the reference tier.
pub trait HostObject: Send + Sync + 'static {
    /// The identity under which the host can find this object again.
    fn host_id(&self) -> HostId;
}

/// The host's object directory, consulted when a reference tier is restored.
pub trait HostObjects {
    /// Returns the live handle for `id`, or `None` if the host destroyed the object.
    ///
    /// The returned value must wrap the same handle type that was captured (usually `Arc<T>`).
    fn find(&self, id: HostId) -> Option<Value>;
}
