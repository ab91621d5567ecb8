//! On-disk graph layout (§6): `F`, `k`, a state tag, the wavelet tree `W`
//! and bit vector `L`, little-endian throughout. Hand-rolled rather than
//! routed through an external serialization crate, favoring a small
//! bespoke binary format over pulling in something like `epserde` for
//! a layout this simple.
//!
//! The alphabet (hence `sigma`, hence `F`'s length) is a build-time
//! parameter the caller already knows (§3: "The engine is parameterized at
//! build time by Σ"), so it is passed into [`load`] rather than guessed
//! from the wire bytes.
//!
//! Grounded on `original_source/metagraph`'s `dbg_succinct_chunk.hpp`
//! (`serialize`/`load`) and the not-in-the-pack `serialization.hpp` it
//! calls into (referenced only, not copied).

use crate::alphabet::Alphabet;
use crate::bits::{BitSequence, StatBitVector};
use crate::error::{GraphError, Result};
use crate::graph::core::StatGraphCore;
use crate::wavelet::{StatWaveletString, WaveletString};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// `state` tag (§6 item 3). Only `STAT` is produced by this crate's
/// serializer; `DYN`/`SMALL` are reserved values a loader must still
/// recognize (and reject, per §7's `IOFailure`) for forward-compatibility
/// with graphs written by other tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum GraphState {
    Dyn = 0,
    Stat = 1,
    Small = 2,
}

impl GraphState {
    fn from_tag(tag: u64) -> Result<Self> {
        match tag {
            0 => Ok(GraphState::Dyn),
            1 => Ok(GraphState::Stat),
            2 => Ok(GraphState::Small),
            other => Err(GraphError::Corrupt(format!("unknown state tag {other}"))),
        }
    }
}

/// Write a finalized static graph to `path` in the §6 wire layout: `F`,
/// `k`, `state`, a self-describing `W` header (alphabet size + length)
/// followed by its bytes, then `L`'s length followed by its bytes.
pub fn save(graph: &StatGraphCore, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path).map_err(GraphError::IoFailure)?;
    let mut w = BufWriter::new(file);
    write_u64_seq(&mut w, graph.f())?;
    write_u64(&mut w, graph.k() as u64)?;
    write_u64(&mut w, GraphState::Stat as u64)?;

    let n = graph.n();
    write_u64(&mut w, 2 * graph.sigma() as u64)?; // W's self-describing alphabet size
    write_u64(&mut w, n)?;
    for i in 0..=n {
        w.write_all(&[graph.get_w(i)]).map_err(GraphError::IoFailure)?;
    }

    write_u64(&mut w, n)?;
    for i in 1..=n {
        w.write_all(&[graph.get_last(i) as u8]).map_err(GraphError::IoFailure)?;
    }
    Ok(())
}

/// Load a graph previously written by [`save`]. `alphabet` must be the
/// same one the graph was built with (its `sigma` fixes `F`'s length).
/// Returns `Err` rather than a partially-initialized graph on any
/// truncation or corruption (§7 `IOFailure`).
pub fn load(path: impl AsRef<Path>, alphabet: Alphabet) -> Result<StatGraphCore> {
    let file = std::fs::File::open(path).map_err(GraphError::IoFailure)?;
    let mut r = BufReader::new(file);
    let sigma = alphabet.sigma();

    let mut f = Vec::with_capacity(sigma);
    for _ in 0..sigma {
        f.push(read_u64(&mut r)?);
    }
    let k = read_u64(&mut r)? as usize;
    let state = GraphState::from_tag(read_u64(&mut r)?)?;
    if state != GraphState::Stat {
        return Err(GraphError::Corrupt("loader only supports STAT-mode files".into()));
    }

    let alphabet_size = read_u64(&mut r)? as usize;
    if alphabet_size != 2 * sigma {
        return Err(GraphError::Corrupt(format!("alphabet size mismatch: file has {alphabet_size}, expected {}", 2 * sigma)));
    }
    let n_w = read_u64(&mut r)?;
    let mut w_bytes = vec![0u8; n_w as usize + 1];
    r.read_exact(&mut w_bytes).map_err(GraphError::IoFailure)?;

    let n_l = read_u64(&mut r)?;
    if n_l != n_w {
        return Err(GraphError::Corrupt("W/L length mismatch".into()));
    }
    let mut l_bytes = vec![0u8; n_l as usize];
    r.read_exact(&mut l_bytes).map_err(GraphError::IoFailure)?;
    let mut l_bits = vec![false];
    l_bits.extend(l_bytes.iter().map(|&b| b != 0));

    let wavelet = StatWaveletString::from_symbols(&w_bytes, alphabet_size);
    let last = StatBitVector::from_bits(&l_bits);
    Ok(crate::graph::core::GraphCore::from_parts(wavelet, last, f, k, alphabet))
}

fn write_u64(w: &mut impl Write, v: u64) -> Result<()> {
    w.write_all(&v.to_le_bytes()).map_err(GraphError::IoFailure)
}

fn write_u64_seq(w: &mut impl Write, vs: &[u64]) -> Result<()> {
    for &v in vs {
        write_u64(w, v)?;
    }
    Ok(())
}

fn read_u64(r: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(GraphError::IoFailure)?;
    Ok(u64::from_le_bytes(buf))
}

/// Stream-level concatenation of `.<shard-id>.chunk` files (§6): append
/// the `W` payloads, append the `L` payloads, sum `F` elementwise. Used
/// when `BulkBuilder` has spilled shards to disk rather than keeping them
/// all in memory for in-process stacking.
pub fn concat_chunk_files(alphabet: Alphabet, k: usize, paths: &[impl AsRef<Path>]) -> Result<StatGraphCore> {
    let sigma = alphabet.sigma();
    let mut w = vec![0u8];
    let mut l = vec![false];
    let mut f = vec![0u64; sigma];
    for p in paths {
        let g = load(p, alphabet.clone())?;
        for i in 1..=g.n() {
            w.push(g.get_w(i));
            l.push(g.get_last(i));
        }
        for c in 0..sigma {
            f[c] += g.f()[c];
        }
    }
    let wavelet = StatWaveletString::from_symbols(&w, 2 * sigma);
    let last = StatBitVector::from_bits(&l);
    Ok(crate::graph::core::GraphCore::from_parts(wavelet, last, f, k, alphabet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemapCounter;
    use crate::graph::core::DynGraphCore;

    fn sample_graph() -> StatGraphCore {
        let alphabet = Alphabet::dna();
        let mut g = DynGraphCore::empty(3, alphabet.clone());
        let mut counter = RemapCounter::default();
        let codes = alphabet.encode_seq(b"ACGT", &mut counter);
        let mut padded = vec![0; 3];
        padded.extend_from_slice(&codes);
        g.add_sequence(&padded, false);
        g.to_static()
    }

    #[test]
    fn save_then_load_round_trips_topology() {
        let graph = sample_graph();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");
        save(&graph, &path).unwrap();
        let loaded = load(&path, Alphabet::dna()).unwrap();
        assert!(graph.graph_eq(&loaded));
    }

    #[test]
    fn loading_truncated_file_is_an_error() {
        let graph = sample_graph();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");
        save(&graph, &path).unwrap();
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() / 2);
        std::fs::write(&path, &bytes).unwrap();
        assert!(load(&path, Alphabet::dna()).is_err());
    }
}
