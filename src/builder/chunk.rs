//! A graph chunk: a sorted, deduplicated run of `W`/`L`/`F` ready to be
//! concatenated into the final graph or serialized to a `.chunk` file
//! (§6). Grounded on `original_source/metagraph/src/graph/dbg_succinct_chunk.hpp`'s
//! `Chunk` class.

use crate::alphabet::{Alphabet, Code};
use crate::bits::{BitSequence, DynBitVector, StatBitVector};
use crate::graph::core::{DynGraphCore, GraphCore, StatGraphCore};
use crate::wavelet::{DynWaveletString, StatWaveletString, WaveletString};
use std::collections::HashMap;

/// `w[0]`/`last[0]` are always the reserved placeholder (`0`/`false`);
/// `w[1..]`/`last[1..]` are this shard's real edges.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub k: usize,
    pub sigma: usize,
    pub w: Vec<Code>,
    pub last: Vec<bool>,
    /// Local histogram-as-cumulative-count: `f[c]` = number of *this
    /// chunk's* edges whose target ends in a symbol `< c`. Elementwise
    /// sum across shards gives the correct global `F` (§6).
    pub f: Vec<u64>,
}

impl Chunk {
    pub fn empty(k: usize, sigma: usize) -> Self {
        Chunk { k, sigma, w: vec![0], last: vec![false], f: vec![0u64; sigma] }
    }

    pub fn push_back(&mut self, w: Code, last: bool) {
        self.w.push(w);
        self.last.push(last);
    }

    pub fn get_w_back(&self) -> Code {
        *self.w.last().unwrap()
    }

    pub fn alter_w_back(&mut self, w: Code) {
        *self.w.last_mut().unwrap() = w;
    }

    pub fn alter_last_back(&mut self, last: bool) {
        *self.last.last_mut().unwrap() = last;
    }

    pub fn size(&self) -> u64 {
        self.w.len() as u64 - 1
    }

    /// Append another chunk's real content after this one's.
    pub fn extend(&mut self, other: &Chunk) {
        self.w.extend_from_slice(&other.w[1..]);
        self.last.extend_from_slice(&other.last[1..]);
        for c in 0..self.sigma {
            self.f[c] += other.f[c];
        }
    }

    /// Derive a chunk from a sorted, deduplicated list of (k+1)-mers
    /// (each `kmer[0..k]` the source node, `kmer[k]` the edge label /
    /// target's last symbol). First-incoming (I7) is resolved by tracking,
    /// per `(source k-1 suffix, label)` pair, whether an earlier kmer in
    /// this sorted run already claimed it.
    pub fn from_sorted_kmers(k: usize, sigma: usize, kmers: &[Vec<Code>]) -> Self {
        let mut chunk = Chunk::empty(k, sigma);
        let mut claimed: HashMap<(Vec<Code>, Code), ()> = HashMap::new();
        let mut histogram = vec![0u64; sigma];

        for (idx, kmer) in kmers.iter().enumerate() {
            debug_assert_eq!(kmer.len(), k + 1);
            let label = kmer[k];
            let suffix = kmer[1..k].to_vec();
            let extended = if claimed.insert((suffix, label), ()).is_some() {
                label + sigma as Code
            } else {
                label
            };
            histogram[label as usize] += 1;

            let is_last_of_source = idx + 1 == kmers.len() || kmers[idx + 1][0..k] != kmer[0..k];
            chunk.push_back(extended, is_last_of_source);
        }

        let mut running = 0u64;
        for c in 0..sigma {
            chunk.f[c] = running;
            running += histogram[c];
        }
        chunk
    }

    /// Stack an ordered sequence of shard chunks (in shard/suffix order)
    /// into a single dynamic graph. `alphabet.sigma()` must equal `sigma`.
    pub fn stack_into_graph(k: usize, sigma: usize, alphabet: Alphabet, chunks: &[Chunk]) -> DynGraphCore {
        let mut core = GraphCore::<DynWaveletString, DynBitVector>::empty(k, alphabet);
        // `empty()` already seeded the root dummy edge (w=[0,0], last=[_,true], f=[0,1,1,...]).
        // Replace its content with the stacked chunks', then re-seed F from scratch.
        let mut w = vec![0 as Code, 0];
        let mut last = vec![false, true];
        let mut f = vec![0u64; sigma];
        f[1..].fill(1);
        for chunk in chunks {
            w.extend_from_slice(&chunk.w[1..]);
            last.extend_from_slice(&chunk.last[1..]);
            for c in 0..sigma {
                f[c] += chunk.f[c];
            }
        }
        core.w = StatWaveletString::from_symbols(&w, 2 * sigma).to_dynamic();
        core.l = StatBitVector::from_bits(&last).to_dynamic();
        core.f = f;
        core.p = (2..=core.w.len()).find(|&i| core.w.get(i) == 0).unwrap_or(1);
        core
    }

    pub fn into_stat_graph(self, alphabet: Alphabet) -> StatGraphCore {
        let k = self.k;
        let sigma = self.sigma;
        Chunk::stack_into_graph(k, sigma, alphabet, std::slice::from_ref(&self)).to_static()
    }
}
