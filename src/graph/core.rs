//! The succinct graph itself (C3): arrays `W`, `L`, `F`, the distinguished
//! terminal index `p`, and the primitives everything else is built on.
//!
//! Grounded on `original_source/metagraph/dbg_succinct.cpp`'s
//! `rank_W`/`select_W`/`pred_W`/`succ_W`, `rank_last`/`select_last`/
//! `pred_last`/`succ_last`, `fwd`/`bwd`, `get_source_node`,
//! `get_node_last_value`, `pick_edge`, `outgoing`/`incoming`,
//! `get_node_seq`, `compare_node_suffix`, and `pred_kmer` — ported
//! function-for-function, generalized over the `BitSequence`/
//! `WaveletString` traits in place of the original's virtual dispatch.

use crate::alphabet::{Alphabet, Code};
use crate::bits::{BitSequence, DynBitVector, StatBitVector};
use crate::wavelet::{DynWaveletString, StatWaveletString, WaveletString};

/// Sentinel "no such node/edge" index, matching the original's `npos`.
pub const NPOS: u64 = u64::MAX;

/// How many steps `pred_*`/`succ_*` scan linearly before falling back to a
/// rank/select call. A tuning constant, not part of the contract (10 while
/// mutable, 1000 once static — mirroring `original_source`'s
/// `state == Config::STAT` check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanBudget {
    Dynamic,
    Static,
}

impl ScanBudget {
    fn limit(self) -> u64 {
        match self {
            ScanBudget::Dynamic => 10,
            ScanBudget::Static => 1000,
        }
    }
}

/// The succinct de Bruijn graph, generic over its `W`/`L` storage variant.
/// [`DynGraphCore`] is used while building/mutating; [`StatGraphCore`]
/// once finalized for read-only serving.
#[derive(Debug, Clone)]
pub struct GraphCore<W, L> {
    pub(crate) w: W,
    pub(crate) l: L,
    /// Length-`sigma` cumulative offsets; `f[0] == 0`.
    pub(crate) f: Vec<u64>,
    /// Index of the dummy terminal edge (`W[p] == 0`).
    pub(crate) p: u64,
    pub(crate) k: usize,
    pub(crate) alphabet: Alphabet,
    pub(crate) scan_budget: ScanBudget,
}

pub type DynGraphCore = GraphCore<DynWaveletString, DynBitVector>;
pub type StatGraphCore = GraphCore<StatWaveletString, StatBitVector>;

impl DynGraphCore {
    /// A freshly created graph: just the root dummy edge (I1, I8).
    pub fn empty(k: usize, alphabet: Alphabet) -> Self {
        let sigma = alphabet.sigma();
        let mut w = DynWaveletString::new(2 * sigma);
        let mut l = DynBitVector::new();
        w.insert(1, 0);
        l.insert(1, true);
        let mut f = vec![0u64; sigma];
        f[1..].fill(1);
        GraphCore {
            w,
            l,
            f,
            p: 1,
            k,
            alphabet,
            scan_budget: ScanBudget::Dynamic,
        }
    }

    pub fn to_static(&self) -> StatGraphCore {
        GraphCore {
            w: self.w.to_static(),
            l: self.l.to_static(),
            f: self.f.clone(),
            p: self.p,
            k: self.k,
            alphabet: self.alphabet.clone(),
            scan_budget: ScanBudget::Static,
        }
    }
}

impl StatGraphCore {
    /// Assemble a static graph from already-built parts (used by
    /// [`crate::io::load`] and [`crate::builder::chunk::Chunk::stack_into_graph`]'s
    /// static-mode callers).
    pub fn from_parts(w: StatWaveletString, l: StatBitVector, f: Vec<u64>, k: usize, alphabet: Alphabet) -> Self {
        let p = (2..=w.len()).find(|&i| w.get(i) == 0).unwrap_or(1);
        GraphCore { w, l, f, p, k, alphabet, scan_budget: ScanBudget::Static }
    }

    pub fn to_dynamic(&self) -> DynGraphCore {
        GraphCore {
            w: self.w.to_dynamic(),
            l: self.l.to_dynamic(),
            f: self.f.clone(),
            p: self.p,
            k: self.k,
            alphabet: self.alphabet.clone(),
            scan_budget: ScanBudget::Dynamic,
        }
    }
}

impl<W: WaveletString, L: BitSequence> GraphCore<W, L> {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn sigma(&self) -> usize {
        self.alphabet.sigma()
    }

    pub fn f(&self) -> &[u64] {
        &self.f
    }

    pub fn p(&self) -> u64 {
        self.p
    }

    /// Size of `W`/`L` including the reserved root dummy edge at index 1.
    pub fn n(&self) -> u64 {
        self.w.len()
    }

    pub fn num_nodes(&self) -> u64 {
        self.rank_last(self.n())
    }

    pub fn num_edges(&self) -> u64 {
        self.n() - 1
    }

    pub fn get_w(&self, i: u64) -> Code {
        self.w.get(i)
    }

    pub fn get_last(&self, i: u64) -> bool {
        self.l.get(i)
    }

    // -- W: rank/select/pred/succ -----------------------------------

    pub(crate) fn rank_w(&self, i: u64, c: Code) -> u64 {
        if i == 0 {
            0
        } else {
            self.w.rank(c, i) - if c == 0 { 1 } else { 0 }
        }
    }

    pub(crate) fn select_w(&self, j: u64, c: Code) -> u64 {
        if j == 0 {
            0
        } else {
            self.w.select(c, j + if c == 0 { 1 } else { 0 })
        }
    }

    pub(crate) fn pred_w(&self, i: u64, c: Code) -> u64 {
        let max_iter = self.scan_budget.limit();
        let mut pos = i;
        for _ in 0..max_iter {
            if pos == 0 || self.get_w(pos) == c {
                return pos;
            }
            pos -= 1;
        }
        self.select_w(self.rank_w(pos, c), c)
    }

    /// Smallest position `>= i` holding symbol `c`, or `n + 1` if none
    /// exists — the same "not found" sentinel `select`/`select1` document
    /// (`src/bits/mod.rs`, `src/wavelet/mod.rs`), so a result at exactly
    /// `n` (the last real position) is never confused with "not found".
    pub(crate) fn succ_w(&self, i: u64, c: Code) -> u64 {
        let max_iter = self.scan_budget.limit();
        let n = self.n();
        let mut t = 0u64;
        while t < max_iter {
            let pos = i + t;
            if pos > n {
                return n + 1;
            }
            if self.get_w(pos) == c {
                return pos;
            }
            t += 1;
        }
        let rk = self.rank_w(i + max_iter - 1, c);
        if rk == self.rank_w(n, c) {
            return n + 1;
        }
        self.select_w(rk + 1, c)
    }

    // -- L: rank/select/pred/succ -------------------------------------

    pub fn rank_last(&self, i: u64) -> u64 {
        self.l.rank1(i)
    }

    pub fn select_last(&self, j: u64) -> u64 {
        self.l.select1(j)
    }

    pub(crate) fn pred_last(&self, i: u64) -> u64 {
        let max_iter = self.scan_budget.limit();
        let mut pos = i;
        for _ in 0..max_iter {
            if pos == 0 || self.get_last(pos) {
                return pos;
            }
            pos -= 1;
        }
        self.select_last(self.rank_last(pos))
    }

    pub(crate) fn succ_last(&self, i: u64) -> u64 {
        let max_iter = self.scan_budget.limit();
        let n = self.n();
        let mut t = 0u64;
        while t < max_iter {
            if i + t == n || self.get_last(i + t) {
                return i + t;
            }
            t += 1;
        }
        let next_rank = self.get_source_node(i);
        self.select_last(next_rank)
    }

    // -- node/edge primitives ------------------------------------------

    pub fn get_source_node(&self, i: u64) -> u64 {
        self.rank_last(i - 1) + 1
    }

    pub fn get_node_last_value(&self, i: u64) -> Code {
        if i == 0 {
            return 0;
        }
        for c in 0..self.sigma() {
            if self.f[c] >= i {
                return (c - 1) as Code;
            }
        }
        (self.sigma() - 1) as Code
    }

    /// Walks `bwd` `k` times and returns `(value at the final node, bwd of
    /// the final node)` — ported as-is from `get_minus_k_value`.
    pub fn get_minus_k_value(&self, mut i: u64, k: usize) -> (Code, u64) {
        for _ in 0..k {
            i = self.bwd(i);
        }
        (self.get_node_last_value(i), self.bwd(i))
    }

    pub fn bwd(&self, i: u64) -> u64 {
        let node_rank = self.get_source_node(i);
        let c = self.get_node_last_value(i);
        let offset = self.f[c as usize];
        self.select_w(node_rank - self.rank_last(offset), c)
    }

    pub fn fwd(&self, i: u64) -> u64 {
        let c = self.get_w(i) % self.sigma() as Code;
        let o = self.f[c as usize];
        let r = self.rank_w(i, c);
        self.select_last(self.rank_last(o) + r)
    }

    /// Source node's full k-mer, as codes (index `k-1` = last symbol).
    pub fn get_node_seq(&self, k_node: u64) -> Vec<Code> {
        let mut ret = vec![self.get_node_last_value(k_node); self.k];
        let mut node = k_node;
        for curr_k in (0..self.k.saturating_sub(1)).rev() {
            node = self.bwd(node);
            ret[curr_k] = self.get_node_last_value(node);
        }
        ret
    }

    /// Do the source nodes of `first` and `second` share a `k-1`-symbol
    /// suffix? Used to resolve the first-incoming tie-break (I7).
    pub fn compare_node_suffix(&self, mut first: u64, mut second: u64) -> bool {
        for _ in 0..self.k.saturating_sub(1) {
            if self.get_node_last_value(first) != self.get_node_last_value(second) {
                return false;
            }
            first = self.bwd(first);
            second = self.bwd(second);
        }
        true
    }

    /// As [`Self::compare_node_suffix`], but against an explicit k-mer
    /// (`kmer[k-1]` is the last symbol) rather than another edge.
    pub fn compare_node_suffix_kmer(&self, mut first: u64, kmer: &[Code]) -> bool {
        debug_assert_eq!(kmer.len(), self.k);
        for i in (1..self.k).rev() {
            if self.get_node_last_value(first) != kmer[i] {
                return false;
            }
            first = self.bwd(first);
        }
        true
    }

    fn pick_edge(&self, edge: u64, node: u64, c: Code) -> u64 {
        let j = self.pred_w(edge, c);
        if j == 0 || self.get_source_node(j) == node {
            return j;
        }
        let j = self.pred_w(edge, c + self.sigma() as Code);
        if j == 0 || self.get_source_node(j) == node {
            return j;
        }
        NPOS
    }

    fn outgoing_edge_idx(&self, node: u64, c: Code) -> u64 {
        self.pick_edge(self.select_last(node), node, c)
    }

    pub fn outgoing(&self, node: u64, c: Code) -> u64 {
        let c = c % self.sigma() as Code;
        let j = self.outgoing_edge_idx(node, c);
        if j == NPOS {
            return NPOS;
        }
        let offset = self.f[c as usize];
        let rank = self.rank_w(j, c);
        self.rank_last(offset) + rank
    }

    pub fn incoming(&self, node: u64, c: Code) -> u64 {
        if node == 1 {
            return if c == 0 { 1 } else { NPOS };
        }
        let c = c % self.sigma() as Code;
        let edge = self.select_last(node);
        let x = self.bwd(edge);

        if self.get_minus_k_value(x, self.k.saturating_sub(1)).0 == c {
            return if x != 0 { self.get_source_node(x) } else { NPOS };
        }
        if x + 1 == self.n() {
            return NPOS;
        }
        let d = self.get_node_last_value(edge);
        let y = self.succ_w(x + 1, d);
        let mut x = x;
        while x + 1 < y {
            x = self.succ_w(x + 1, d + self.sigma() as Code);
            if x < y && self.get_minus_k_value(x, self.k.saturating_sub(1)).0 == c {
                return if x != 0 { self.get_source_node(x) } else { NPOS };
            }
        }
        NPOS
    }

    pub fn traverse(&self, node: u64, c: Code) -> u64 {
        self.outgoing(node, c)
    }

    pub fn traverse_back(&self, node: u64, c: Code) -> u64 {
        self.incoming(node, c)
    }

    pub fn outdegree(&self, node: u64) -> u64 {
        self.select_last(node) - if node == 1 { 0 } else { self.select_last(node - 1) }
    }

    pub fn is_single_outgoing(&self, i: u64) -> bool {
        self.get_last(i) && (i == 1 || self.get_last(i - 1))
    }

    pub fn is_single_incoming(&self, i: u64) -> bool {
        let c = self.get_w(i);
        if c as usize >= self.sigma() {
            return false;
        }
        let max_iter = 1000u64;
        let end = self.n().min(i + 1 + max_iter);
        let mut j = i + 1;
        while j < end {
            if self.get_w(j) == c + self.sigma() as Code {
                return false;
            }
            if self.get_w(j) == c {
                return true;
            }
            j += 1;
        }
        j == self.n() || self.succ_w(j, c) <= self.succ_w(j, c + self.sigma() as Code)
    }

    pub fn indegree(&self, node: u64) -> u64 {
        if node == 1 {
            return 1;
        }
        let edge = self.select_last(node);
        let x = self.bwd(edge);
        if x + 1 == self.n() {
            return 1;
        }
        let d = self.get_node_last_value(edge);
        let y = self.succ_w(x + 1, d);
        let sig = self.sigma() as Code;
        1 + self.rank_w(y - 1, d + sig) - self.rank_w(x - 1, d + sig)
    }

    /// Exact node lookup via backward search over the extended-alphabet
    /// BWT range, specializing `index_fuzzy`'s zero-mismatch path.
    pub fn index(&self, kmer: &[Code]) -> u64 {
        debug_assert_eq!(kmer.len(), self.k);
        let sigma = self.sigma() as Code;
        let last = kmer[self.k - 1];
        let mut rl = if (last as usize) + 1 < self.f.len() {
            self.succ_last(self.f[last as usize] + 1)
        } else {
            self.n()
        };
        let mut ru = if (last as usize) + 1 < self.f.len() {
            self.f[last as usize + 1]
        } else {
            self.n() - 1
        };
        if rl == 0 || ru == 0 || rl > ru {
            return NPOS;
        }
        for pos in (0..self.k - 1).rev() {
            let b = kmer[pos];
            let nrl = self.succ_w(self.pred_last(rl - 1) + 1, b).min(self.succ_w(self.pred_last(rl - 1) + 1, b + sigma));
            let nru = self.pred_w(ru, b).max(self.pred_w(ru, b + sigma));
            if nrl > self.n() || nru > self.n() || nrl > nru {
                return NPOS;
            }
            rl = self.fwd(nrl);
            ru = self.fwd(nru);
            if rl == 0 && ru == 0 {
                return NPOS;
            }
        }
        if rl != ru {
            return NPOS;
        }
        self.get_source_node(rl)
    }

    /// Node-index of the lexicographically-greatest stored k-mer `<= kmer`.
    pub fn pred_kmer(&self, kmer: &[Code]) -> u64 {
        debug_assert_eq!(kmer.len(), self.k);
        let sigma = self.sigma() as Code;
        let mut last = if (kmer[0] as usize) + 1 < self.f.len() {
            self.f[kmer[0] as usize + 1]
        } else {
            self.n() - 1
        };
        let mut shift = 0u64;
        for &s in &kmer[1..] {
            let last_target = self.pred_w(last, s).max(self.pred_w(last, s + sigma));
            if last_target > 0 {
                if self.rank_last(last_target - 1) < self.rank_last(last - 1) {
                    shift = 0;
                }
                last = self.fwd(last_target);
                continue;
            }
            let succ_target = self.succ_w(last, s).min(self.succ_w(last, s + sigma));
            if succ_target <= self.n() {
                last = self.fwd(succ_target);
                shift = 1;
            } else {
                last = self.f[s as usize];
                shift = 0;
            }
        }
        self.rank_last(last - shift)
    }

    /// Yield the node index for each k-mer of `seq`, in order (`NPOS` for
    /// unmatched k-mers), consulting `stop()` after every callback. Uses
    /// `outgoing` to walk forward once a k-mer resolves, rather than
    /// re-running `index` from scratch (§4.3 adjacency optimization).
    pub fn map_to_nodes(&self, seq: &[Code], mut callback: impl FnMut(u64), mut stop: impl FnMut() -> bool) {
        if seq.len() < self.k {
            return;
        }
        let mut i = 0usize;
        while i + self.k <= seq.len() {
            let mut node = self.index(&seq[i..i + self.k]);
            callback(node);
            if stop() {
                return;
            }
            if node == NPOS {
                i += 1;
                continue;
            }
            while i + self.k < seq.len() {
                let nxt = self.outgoing(node, seq[i + self.k]);
                if nxt == NPOS {
                    break;
                }
                node = nxt;
                callback(node);
                if stop() {
                    return;
                }
                i += 1;
            }
            i += 1;
        }
    }

    /// Yield the edge index for each (k+1)-mer of `seq`, in order.
    pub fn map_to_edges(&self, seq: &[Code], mut callback: impl FnMut(u64), mut stop: impl FnMut() -> bool) {
        let kp1 = self.k + 1;
        if seq.len() < kp1 {
            return;
        }
        let mut i = 0usize;
        while i + kp1 <= seq.len() {
            let node = self.index(&seq[i..i + self.k]);
            let mut edge = if node == NPOS { NPOS } else { self.outgoing_edge_idx(node, seq[i + self.k]) };
            callback(edge);
            if stop() {
                return;
            }
            while edge != NPOS && i + kp1 < seq.len() {
                let fwd_edge = self.fwd(edge);
                let next_node = self.get_source_node(fwd_edge);
                edge = self.pick_edge(fwd_edge, next_node, seq[i + kp1]);
                callback(edge);
                if stop() {
                    return;
                }
                i += 1;
            }
            i += 1;
        }
    }

    /// Fraction-of-kmers-present membership test (§4.6), short-circuiting
    /// as soon as the pass/fail decision is forced either way.
    pub fn find(&self, seq: &[Code], kmer_discovery_fraction: f64) -> bool {
        let kp1 = self.k + 1;
        if seq.len() < kp1 {
            return false;
        }
        let num_kmers = seq.len() - kp1 + 1;
        let max_missing = (num_kmers as f64 * (1.0 - kmer_discovery_fraction)).floor() as usize;
        let min_discovered = num_kmers - max_missing;
        let mut discovered = 0usize;
        let mut missing = 0usize;
        let mut decided: Option<bool> = None;
        self.map_to_edges(
            seq,
            |edge| {
                if decided.is_some() {
                    return;
                }
                if edge == NPOS {
                    missing += 1;
                } else {
                    discovered += 1;
                }
                if discovered >= min_discovered {
                    decided = Some(true);
                } else if missing > max_missing {
                    decided = Some(false);
                }
            },
            || decided.is_some(),
        );
        decided.unwrap_or(discovered >= min_discovered)
    }

    /// Element-wise equality of `W`, `L`, `F`, `k` (representation-aware;
    /// contrast with the logical [`Self::graph_eq`]).
    pub fn equals_internally<W2: WaveletString, L2: BitSequence>(&self, other: &GraphCore<W2, L2>) -> bool {
        if self.k != other.k || self.f != other.f || self.n() != other.n() {
            return false;
        }
        for i in 0..=self.n() {
            if self.w.get(i) != other.w.get(i) {
                return false;
            }
        }
        for i in 1..=self.n() {
            if self.l.get(i) != other.l.get(i) {
                return false;
            }
        }
        true
    }

    /// Logical equality, invariant to representation: walks both graphs'
    /// non-dummy k-mer sets in lockstep rather than comparing arrays.
    pub fn graph_eq<W2: WaveletString, L2: BitSequence>(&self, other: &GraphCore<W2, L2>) -> bool {
        if self.k != other.k || self.num_nodes() != other.num_nodes() {
            return false;
        }
        for node in 2..=self.num_nodes() {
            let a = self.get_node_seq(self.select_last(node));
            let b = other.get_node_seq(other.select_last(node));
            if a != b {
                return false;
            }
            for c in 0..self.sigma() as Code {
                let ta = self.outgoing(node, c);
                let tb = other.outgoing(node, c);
                if (ta == NPOS) != (tb == NPOS) {
                    return false;
                }
            }
        }
        true
    }
}
