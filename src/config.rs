//! Explicit build/mutation configuration. No globals, no env-var reads —
//! every knob is a field the caller sets, passed down explicitly rather
//! than read from ambient state.

use crate::alphabet::Alphabet;

/// Parameters for [`crate::builder::BulkBuilder`] (C5).
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub k: usize,
    pub alphabet: Alphabet,
    /// Target worker/shard count `P`. Shard suffix length is derived as
    /// `ceil(log_sigma(P))` (§4.5).
    pub parallelism: usize,
    /// Soft cap, in bytes, on a single shard's in-memory (k+1)-mer buffer
    /// before it is eagerly flushed to a temp file and merged back in.
    pub mem_cap_bytes: u64,
    /// Build edges for both a k-mer and its reverse complement (DNA only).
    pub canonical: bool,
}

impl BuildConfig {
    pub fn new(k: usize, alphabet: Alphabet) -> Self {
        BuildConfig {
            k,
            alphabet,
            parallelism: num_cpus::get(),
            mem_cap_bytes: 1 << 30,
            canonical: false,
        }
    }

    pub fn with_parallelism(mut self, p: usize) -> Self {
        self.parallelism = p.max(1);
        self
    }

    pub fn with_mem_cap_bytes(mut self, bytes: u64) -> Self {
        self.mem_cap_bytes = bytes;
        self
    }

    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }
}

/// Parameters for incremental [`crate::graph::core::DynGraphCore`] mutation
/// (C4) — currently just whether `add_sequence` should try to extend an
/// existing source k-mer before falling back to the dummy prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutatorConfig {
    pub try_extend: bool,
}
