//! The explicit environment of a capture or restore.
//!
//! Nothing in snapcode consults global state: the registry, the host directory, the options and the
//! diagnostics sink all travel in a [`SnapshotContext`].

use crate::codec::CodecOptions;
use crate::compression::CompressorRegistry;
use crate::diagnostics::Diagnostic;
use crate::host::HostObjects;
use crate::registry::TypeRegistry;
use std::cell::RefCell;
use std::fmt;

/// Default bound on nested collection decomposition.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// ID of the LZ4 compressor in the blob meta byte.
const LZ4_ID: u8 = 1;

/// Capture configuration.
///
/// ```rust
/// use snapcode::SnapshotOptions;
///
/// let options = SnapshotOptions::default().compression(true).max_depth(8);
/// assert_eq!(options.depth_limit(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    compress: bool,
    max_depth: usize,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            compress: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SnapshotOptions {
    /// Compress codec blobs with LZ4. Ignored when the `lz4_flex` feature is disabled.
    pub fn compression(mut self, enable: bool) -> Self {
        self.compress = enable;
        self
    }

    /// Maximum number of nested collections decomposed below a snapshot.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// The configured depth limit.
    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// True if compression was requested and an algorithm is available.
    pub fn compresses(&self) -> bool {
        self.compress && CompressorRegistry::global().supports(LZ4_ID)
    }

    /// Options handed to the codec.
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            compression_id: if self.compresses() { LZ4_ID } else { 0 },
        }
    }
}

/// Registry, host directory, options and diagnostics for one batch of captures or restores.
pub struct SnapshotContext<'a> {
    registry: &'a TypeRegistry,
    host: Option<&'a dyn HostObjects>,
    options: SnapshotOptions,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl<'a> SnapshotContext<'a> {
    /// A context without host directory and with default options.
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            host: None,
            options: SnapshotOptions::default(),
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Attaches the host's object directory, needed to restore host references.
    pub fn with_host(mut self, host: &'a dyn HostObjects) -> Self {
        self.host = Some(host);
        self
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: SnapshotOptions) -> Self {
        self.options = options;
        self
    }

    /// The type registry.
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// The host directory, if any.
    pub fn host(&self) -> Option<&'a dyn HostObjects> {
        self.host
    }

    /// The options in effect.
    pub fn options(&self) -> &SnapshotOptions {
        &self.options
    }

    /// Logs `diagnostic` and keeps it for [`diagnostics`](Self::diagnostics).
    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "snapshot degraded");
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// A copy of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drains the reported diagnostics.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

impl fmt::Debug for SnapshotContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotContext")
            .field("registry", &self.registry.len())
            .field("host", &self.host.is_some())
            .field("options", &self.options)
            .field("diagnostics", &self.diagnostics.borrow().len())
            .finish()
    }
}
