#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]

//! A succinct de Bruijn graph engine (BOSS representation) for very large
//! k-mer sets: `W`/`L`/`F`-array construction (incremental and bulk),
//! rank/select/`fwd`/`bwd` primitives, mutation, and traversal.

pub mod alphabet;
pub mod annotation;
pub mod bits;
pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod io;
pub mod traverse;
pub mod wavelet;

/// Re-exports covering the six components (C1-C6): bit sequences,
/// wavelet strings, the read-only graph core, mutation, bulk
/// construction, and traversal.
pub mod prelude {
    pub use crate::alphabet::{Alphabet, Code};
    pub use crate::annotation::{AnnotationSink, EdgeHandle, LabelSource, MemorySink};
    pub use crate::bits::{BitSequence, DynBitVector, DynamicBits, SmallBitVector, StatBitVector};
    pub use crate::builder::chunk::Chunk;
    pub use crate::builder::BulkBuilder;
    pub use crate::config::{BuildConfig, MutatorConfig};
    pub use crate::error::{GraphError, RemapCounter, Result};
    pub use crate::graph::prelude::*;
    pub use crate::traverse::{canonical_kmer, Path};
    pub use crate::wavelet::{DynWaveletString, StatWaveletString, WaveletString};
}
