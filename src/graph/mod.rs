//! The succinct de Bruijn graph (C3/C4): arrays, read-only primitives,
//! incremental mutation, and fuzzy search.

pub mod core;
mod fuzzy;
mod mutator;

pub use core::{DynGraphCore, GraphCore, StatGraphCore, NPOS};
pub use fuzzy::{CigarOp, HitInfo};

pub mod prelude {
    pub use super::core::{DynGraphCore, GraphCore, StatGraphCore, NPOS};
    pub use super::fuzzy::{CigarOp, HitInfo};
}
