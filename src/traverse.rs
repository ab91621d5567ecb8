//! Traversal driven by [`GraphCore`] (C6): path/unitig/sequence/k-mer
//! decomposition and membership queries.
//!
//! Grounded on `original_source/metagraph/src/graph/sequence_graph.hpp` /
//! `base/sequence_graph.hpp`'s abstract `call_paths`/`call_sequences`
//! visitor contract that BOSS specializes, and `dbg_succinct_merge.cpp`'s
//! per-edge discovered-bitmap bookkeeping for path decomposition. The
//! coroutine-like callback idiom of the original becomes a plain
//! `FnMut` visitor per the Design Note on "coroutine-like streaming".

use crate::alphabet::Code;
use crate::bits::{BitSequence, DynBitVector};
use crate::graph::core::{GraphCore, NPOS};
use crate::wavelet::WaveletString;
use log::debug;

/// One maximal edge-disjoint path: the edge indices visited, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub edges: Vec<u64>,
}

impl<W: WaveletString, L: BitSequence> GraphCore<W, L> {
    /// Decompose the whole edge set into edge-disjoint maximal directed
    /// paths. Every edge appears in exactly one emitted path. `callback`
    /// may return `true` to request early termination.
    pub fn call_paths(&self, mut callback: impl FnMut(&Path) -> bool) {
        let n = self.n();
        let mut discovered = DynBitVector::new();
        for _ in 0..=n {
            discovered.insert(discovered.len() + 1, false);
        }
        let mut stack: Vec<u64> = vec![1];
        while let Some(start) = stack.pop() {
            if discovered.get(start) {
                continue;
            }
            let mut path = Vec::new();
            let mut edge = start;
            loop {
                if discovered.get(edge) {
                    break;
                }
                discovered.set(edge, true);
                path.push(edge);
                let target_first = self.fwd(edge);
                let target_node = self.get_source_node(target_first);
                let out = self.outdegree(target_node);
                if out == 0 {
                    break;
                }
                // enqueue branches beyond the first for later paths
                let begin = self.pred_last(target_first - 1) + 1;
                let end = self.succ_last(target_first) + 1;
                for branch in (begin + 1)..end {
                    if !discovered.get(branch) {
                        stack.push(branch);
                    }
                }
                if discovered.get(begin) {
                    break;
                }
                edge = begin;
            }
            if path.is_empty() {
                continue;
            }
            let p = Path { edges: path };
            if callback(&p) {
                return;
            }
        }
    }

    /// Maximal paths restricted to unitigs: interior nodes have in-degree
    /// and out-degree exactly 1. Tips (leading/trailing dummy runs)
    /// shorter than `min_tip_size` are dropped. With
    /// `kmers_single_form = true`, each k-mer is emitted under at most one
    /// of its canonical/non-canonical forms (via
    /// [`crate::traverse::canonical_kmer`]).
    pub fn call_unitigs(&self, min_tip_size: usize, kmers_single_form: bool, mut callback: impl FnMut(&[Code])) {
        let mut emitted_canonical: std::collections::HashSet<Vec<Code>> = std::collections::HashSet::new();
        self.call_paths(|path| {
            let trimmed = self.trim_tips(path, min_tip_size);
            if let Some(seq) = trimmed {
                if kmers_single_form && self.alphabet().is_dna() {
                    let canon = canonical_kmer(self.alphabet(), &seq);
                    if !emitted_canonical.insert(canon) {
                        return false;
                    }
                }
                callback(&seq);
            }
            false
        });
    }

    fn trim_tips(&self, path: &Path, min_tip_size: usize) -> Option<Vec<Code>> {
        let seq = self.decode_path(path);
        if seq.len() < min_tip_size {
            return None;
        }
        if seq.len() > self.k && seq[..self.k].iter().all(|&c| c == 0) && seq.len() - self.k < min_tip_size {
            return None;
        }
        Some(seq)
    }

    fn decode_path(&self, path: &Path) -> Vec<Code> {
        if path.edges.is_empty() {
            return Vec::new();
        }
        let first = path.edges[0];
        let source = self.get_source_node(first);
        let mut seq = self.get_node_seq(self.select_last(source));
        for &e in &path.edges {
            seq.push(self.get_w(e) % self.sigma() as Code);
        }
        seq
    }

    /// Emit the decoded character sequence of every path, with leading/
    /// trailing sentinel symbols stripped.
    pub fn call_sequences(&self, mut callback: impl FnMut(&[u8])) {
        self.call_paths(|path| {
            let codes = self.decode_path(path);
            let trimmed: Vec<Code> = codes.into_iter().filter(|&c| c != 0).collect();
            if !trimmed.is_empty() {
                let decoded = self.alphabet().decode_seq(&trimmed);
                callback(&decoded);
            }
            false
        });
    }

    /// Visit every non-dummy node exactly once.
    pub fn call_kmers(&self, mut callback: impl FnMut(u64, &[Code])) {
        for node in 2..=self.num_nodes() {
            let edge = self.select_last(node);
            if self.is_dummy_node(node) {
                continue;
            }
            let seq = self.get_node_seq(edge);
            callback(node, &seq);
        }
    }

    /// Every node with indegree 0.
    pub fn call_source_nodes(&self, mut callback: impl FnMut(u64)) {
        for node in 1..=self.num_nodes() {
            if self.indegree(node) == 0 {
                callback(node);
            }
        }
    }

    fn is_dummy_node(&self, node: u64) -> bool {
        let seq = self.get_node_seq(self.select_last(node));
        seq.iter().any(|&c| c == 0)
    }

    /// Fraction-of-kmers-present test; thin alias kept alongside the other
    /// traversal entry points even though the core membership logic lives
    /// on [`GraphCore::find`].
    pub fn discover(&self, seq: &[Code], discovery_fraction: f64) -> bool {
        self.find(seq, discovery_fraction)
    }
}

/// Reverse-complement `kmer` under the DNA complement table and return
/// whichever of the two orderings is lexicographically smaller (§OQ4).
pub fn canonical_kmer(alphabet: &crate::alphabet::Alphabet, kmer: &[Code]) -> Vec<Code> {
    let rc: Vec<Code> = kmer.iter().rev().map(|&c| alphabet.complement(c)).collect();
    if rc < kmer.to_vec() {
        debug!("canonicalized k-mer to its reverse complement");
        rc
    } else {
        kmer.to_vec()
    }
}

/// Whether `edge`'s target is present with the given discovery fraction,
/// used by callers who only have an edge handle rather than a raw
/// sequence (thin wrapper, kept here rather than on [`GraphCore`] since it
/// is purely a convenience over already-public primitives).
pub fn edge_is_real<W: WaveletString, L: BitSequence>(g: &GraphCore<W, L>, edge: u64) -> bool {
    edge != NPOS && edge >= 1 && edge <= g.n()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::error::RemapCounter;
    use crate::graph::core::DynGraphCore;

    fn build(seqs: &[&[u8]], k: usize) -> DynGraphCore {
        let alphabet = Alphabet::dna();
        let mut g = DynGraphCore::empty(k, alphabet.clone());
        let mut counter = RemapCounter::default();
        for s in seqs {
            let codes = alphabet.encode_seq(s, &mut counter);
            let mut padded = vec![0; k];
            padded.extend_from_slice(&codes);
            g.add_sequence(&padded, false);
        }
        g
    }

    #[test]
    fn call_sequences_recovers_single_unitig() {
        let g = build(&[b"ACGTACGT"], 3);
        let mut seqs = Vec::new();
        g.call_sequences(|s| seqs.push(s.to_vec()));
        assert!(seqs.iter().any(|s| s.windows(4).any(|w| w == b"ACGT")));
    }

    #[test]
    fn call_kmers_visits_every_real_node() {
        let g = build(&[b"ACGT"], 3);
        let mut seen = 0;
        g.call_kmers(|_, _| seen += 1);
        assert!(seen >= 1);
    }

    #[test]
    fn call_source_nodes_includes_root() {
        let g = build(&[b"ACGT"], 3);
        let mut roots = Vec::new();
        g.call_source_nodes(|n| roots.push(n));
        assert!(roots.contains(&1));
    }
}
