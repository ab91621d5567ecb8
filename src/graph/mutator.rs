//! Incremental mutation of a [`DynGraphCore`] (C4): `append_pos`,
//! `insert_edge`, bulk `erase_edges`, dummy-prefix trimming, and the
//! sequence-level `add_sequence` driver.
//!
//! Grounded function-for-function on `original_source/metagraph`'s
//! `append_pos`/`insert_edge`/`erase_edges_dyn`/`update_F`
//! (`dbg_succinct.cpp`) and `add_seq` (`construct.cpp`).

use crate::alphabet::Code;
use crate::bits::{BitSequence, DynamicBits};
use crate::graph::core::{DynGraphCore, NPOS};
use crate::wavelet::WaveletString;

impl DynGraphCore {
    pub(crate) fn update_f(&mut self, c: Code, delta: i64) {
        debug_assert!(delta == 1 || delta == -1);
        for i in (c as usize + 1)..self.sigma() {
            self.f[i] = (self.f[i] as i64 + delta) as u64;
        }
    }

    /// Insert a new outgoing edge labelled `c` into the `[begin, end)`
    /// range, preserving I3's sort order. Returns `true` if the array grew
    /// (as opposed to overwriting a dead-end sentinel).
    fn insert_edge(&mut self, c: Code, begin: u64, end: u64) -> bool {
        if begin > 1 && self.get_w(begin) == 0 {
            self.w.set(begin, c);
            return false;
        }
        let sigma = self.sigma() as Code;
        let mut pos = begin;
        while pos < end && self.get_w(pos) % sigma < c % sigma {
            pos += 1;
        }
        let last_symbol = self.get_node_last_value(begin);
        self.update_f(last_symbol, 1);
        self.l.insert(begin, false);
        self.w.insert(pos, c);
        true
    }

    /// Create an outgoing edge labelled `c` from `source_node` (an edge
    /// index) if one does not already exist. `source_kmer` is the source
    /// node's k-symbol suffix, supplied by the caller so I7's tie-break
    /// doesn't require re-walking `bwd`.
    pub fn append_pos(&mut self, c: Code, source_node: u64, source_kmer: &[Code]) -> u64 {
        debug_assert_eq!(source_kmer, self.get_node_seq(source_node).as_slice());

        let begin = self.pred_last(source_node - 1) + 1;
        let end = self.succ_last(source_node) + 1;
        let sigma = self.sigma() as Code;

        let prev_c_pos = self.pred_w(end - 1, c).max(self.pred_w(end - 1, c + sigma));
        if prev_c_pos >= begin {
            return self.fwd(prev_c_pos);
        }

        if prev_c_pos > 0 && self.compare_node_suffix_kmer(prev_c_pos, source_kmer) {
            self.insert_edge(c + sigma, begin, end);
            return self.fwd(prev_c_pos);
        }

        let first_c = if end < self.n() { self.succ_w(end, c) } else { self.n() };
        let mut the_only_incoming = true;
        if first_c < self.n() {
            the_only_incoming = !self.compare_node_suffix_kmer(first_c, source_kmer);
            if !the_only_incoming {
                self.w.set(first_c, c + sigma);
            }
        }

        let shifted = self.insert_edge(c, begin, end);
        if !the_only_incoming {
            return self.fwd(first_c + shifted as u64);
        }

        let sentinel_pos = self.select_last(self.rank_last(self.f[c as usize]) + self.rank_w(begin - 1, c)) + 1;
        self.update_f(c, 1);
        self.w.insert(sentinel_pos, 0);
        self.l.insert(sentinel_pos, true);
        self.p = sentinel_pos;
        sentinel_pos
    }

    /// Encode `seq`, optionally try to extend from an existing source
    /// k-mer, else prepend `k` sentinel steps; `append_pos` every
    /// successive edge (§4.4.4).
    pub fn add_sequence(&mut self, seq: &[Code], try_extend: bool) {
        if seq.len() < self.k + 1 {
            return;
        }
        let mut source = self.p;
        let mut kmer: Vec<Code> = vec![0; self.k];
        if try_extend {
            let found = self.index(&seq[0..self.k]);
            if found != NPOS {
                source = self.select_last(found);
                kmer.copy_from_slice(&seq[0..self.k]);
            }
        }
        for i in 0..seq.len() - self.k {
            let c = seq[i + self.k];
            source = self.append_pos(c, source, &kmer);
            kmer.rotate_left(1);
            *kmer.last_mut().unwrap() = c;
        }
    }

    /// Bulk-remove edges named by `mask[i] == true`, rewriting `W`, `L`,
    /// `F` in one pass. Preserves I2 (flip the retained predecessor's
    /// `L` bit to 1) and I7 (relabel the surviving `c+sigma` sibling to
    /// `c`). Orphaned nodes are left for the caller to deal with.
    pub fn erase_edges(&mut self, mask: &[bool]) {
        debug_assert_eq!(mask.len() as u64, self.n() + 1);
        let sigma = self.sigma() as Code;
        let mut shift = 0u64;
        for edge in 1..=self.n() {
            if !mask[edge as usize] {
                continue;
            }
            let edge_id = edge - shift;
            let d = self.get_w(edge_id);
            if d < sigma {
                let next = edge_id + 1;
                let j = if next < self.n() { self.succ_w(next, d) } else { self.n() };
                let mut i = next;
                while i < j {
                    if self.get_w(i) == d + sigma {
                        self.w.set(i, d);
                        break;
                    }
                    i += 1;
                }
            }
            self.w.delete(edge_id);
            let last_symbol = self.get_node_last_value(edge_id);
            self.update_f(last_symbol, -1);
            if self.get_last(edge_id) && edge_id > 1 && !self.get_last(edge_id - 1) {
                self.l.delete(edge_id - 1);
            } else {
                self.l.delete(edge_id);
            }
            shift += 1;
        }
    }

    /// Mark as removable every dummy-source edge whose terminal dummy step
    /// has more than one real incoming edge (making the dummy redundant),
    /// then erase them via [`Self::erase_edges`]. Returns the mask.
    pub fn erase_redundant_dummy_edges(&mut self) -> Vec<bool> {
        let n = self.n();
        let mut mask = vec![false; (n + 1) as usize];
        for i in 1..=n {
            if self.get_w(i) != 0 {
                continue;
            }
            let node = self.get_source_node(i);
            if node == 1 {
                continue;
            }
            if self.indegree(node) > 1 {
                mask[i as usize] = true;
            }
        }
        self.erase_edges(&mask);
        mask
    }
}
