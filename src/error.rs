//! Error kinds the engine distinguishes, per the error-handling design.
//!
//! `NotFound` is not represented here: absent k-mers/indices are signalled
//! through `npos`/`None`/`false` return values, not through `Result`, since
//! "not found" is a normal outcome of a query, not a failure.

use thiserror::Error;

/// Errors the core can report to a caller.
///
/// `InvariantViolation` is never constructed and handed back to a caller in
/// the ordinary control flow: internal invariant checks `debug_assert!`
/// directly so that a broken invariant aborts rather than silently
/// propagating. The variant exists here only so `Display`/`Debug`
/// formatting of an invariant name is in one place.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A serialized graph file was truncated, had a bad magic/state tag, or
    /// otherwise failed to parse. The caller gets `Err`, never a partially
    /// initialized graph.
    #[error("I/O failure loading graph: {0}")]
    IoFailure(#[from] std::io::Error),

    /// The serialized file's header was well-formed I/O-wise but
    /// structurally invalid (bad state tag, alphabet size mismatch, ...).
    #[error("corrupt graph file: {0}")]
    Corrupt(String),

    /// Allocation failure (or configured soft cap exceeded with no smaller
    /// shard size left to retry) during bulk construction.
    #[error("out of memory during build: {0}")]
    OutOfMemory(String),

    /// An internal invariant was found violated by a consistency check
    /// (e.g. `GraphCore::equals_internally` style verification, or a
    /// debug-only assertion compiled into a release checked build). Carries
    /// the invariant's short name (`"I1"`..`"I8"`).
    #[error("invariant {0} violated: {1}")]
    InvariantViolation(&'static str, String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Counter for symbols remapped to an alphabet's catch-all code during
/// encoding, surfaced to the caller only in verbose mode (§7: "counters for
/// remapped characters are printed only in verbose mode").
#[derive(Debug, Default, Clone, Copy)]
pub struct RemapCounter {
    pub remapped: u64,
}

impl RemapCounter {
    pub fn bump(&mut self) {
        self.remapped += 1;
    }
}
