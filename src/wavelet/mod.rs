//! Wavelet strings over the extended alphabet (C2): a wavelet *matrix*
//! built from `ceil(log2(2*sigma))` bit-planes, used as the underlying
//! storage of the graph's `W` array (`GraphCore::rank_W`/`select_W`, §4.3).
//!
//! The public contract mirrors the raw wavelet tree `dbg_succinct.cpp`
//! builds its edge labels on: position `0` is a permanent placeholder
//! holding symbol `0`, positions `1..=len()` are the real content, and
//! `rank`/`select` count and locate symbol occurrences *inclusive* of that
//! placeholder. `GraphCore::rank_W`/`select_W` apply the `-(c==0)` /
//! `+(c==0)` correction the original performs at the call site — this type
//! stays a faithful, uncorrected wavelet tree.

mod level;

use crate::alphabet::Code;
use level::{DynLevel, LevelOps, StatLevel};
use sealed::sealed;

#[sealed]
pub trait WaveletString {
    /// Number of real positions (excludes the placeholder at `0`).
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Alphabet size this wavelet string was built for (`2*sigma`).
    fn alphabet_size(&self) -> usize;

    /// Symbol at position `i` (`0..=len()`; `get(0) == 0` always).
    fn get(&self, i: u64) -> Code;

    /// Number of occurrences of `c` among positions `[0..=i]`.
    fn rank(&self, c: Code, i: u64) -> u64;

    /// Position of the `j`-th (1-indexed) occurrence of `c`, or `len() + 1`
    /// if there is no such occurrence.
    fn select(&self, c: Code, j: u64) -> u64;
}

fn levels_for(alphabet_size: usize) -> u32 {
    let mut bits = 0u32;
    while (1usize << bits) < alphabet_size {
        bits += 1;
    }
    bits.max(1)
}

fn bit_of(c: Code, levels: u32, l: u32) -> bool {
    (c >> (levels - 1 - l)) & 1 != 0
}

/// Insertable wavelet matrix, used while a graph is under incremental
/// construction (`append_pos`/`insert_edge`, §4.4).
#[derive(Debug, Clone)]
pub struct DynWaveletString {
    levels: Vec<DynLevel>,
    alphabet_size: usize,
}

impl DynWaveletString {
    pub fn new(alphabet_size: usize) -> Self {
        let n = levels_for(alphabet_size);
        DynWaveletString {
            levels: (0..n).map(|_| DynLevel::new()).collect(),
            alphabet_size,
        }
    }

    fn zero_count(&self, l: usize) -> u64 {
        let lvl = &self.levels[l];
        lvl.len() - lvl.ones()
    }

    /// Insert symbol `c` at position `i` (`1..=len()+1`).
    pub fn insert(&mut self, i: u64, c: Code) {
        let levels = self.levels.len() as u32;
        let mut pos = i;
        for l in 0..levels as usize {
            let bit = bit_of(c, levels, l as u32);
            let z = self.zero_count(l);
            let rank_before = self.levels[l].rank1(pos);
            let next_pos = if bit { z + rank_before } else { pos - rank_before };
            self.levels[l].insert(pos, bit);
            pos = next_pos;
        }
    }

    /// Remove the symbol at position `i` (`1..=len()`).
    pub fn delete(&mut self, i: u64) {
        let levels = self.levels.len() as u32;
        let mut pos = i;
        for l in 0..levels as usize {
            let bit = self.levels[l].get(pos);
            let z = self.zero_count(l);
            let rank_before = self.levels[l].rank1(pos);
            let next_pos = if bit { z + rank_before } else { pos - rank_before };
            self.levels[l].delete(pos);
            pos = next_pos;
        }
    }

    /// Overwrite the symbol at an existing position `i` (`1..=len()`).
    pub fn set(&mut self, i: u64, c: Code) {
        if self.get(i) == c {
            return;
        }
        self.delete(i);
        self.insert(i, c);
    }

    pub fn to_static(&self) -> StatWaveletString {
        StatWaveletString {
            levels: self.levels.iter().map(|l| l.to_static()).collect(),
            alphabet_size: self.alphabet_size,
        }
    }
}

#[sealed]
impl WaveletString for DynWaveletString {
    fn len(&self) -> u64 {
        self.levels[0].len() - 1
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    fn get(&self, i: u64) -> Code {
        matrix_get(&self.levels, i)
    }

    fn rank(&self, c: Code, i: u64) -> u64 {
        matrix_rank(&self.levels, self.levels.len() as u32, c, i + 1)
    }

    fn select(&self, c: Code, j: u64) -> u64 {
        matrix_select(&self.levels, self.levels.len() as u32, c, j)
    }
}

/// Immutable wavelet matrix with block-cached per-level rank.
#[derive(Debug, Clone)]
pub struct StatWaveletString {
    levels: Vec<StatLevel>,
    alphabet_size: usize,
}

impl StatWaveletString {
    /// Build from a full sequence of symbols; `symbols[0]` must be `0` (the
    /// reserved placeholder), `symbols[1..]` the real `W` values.
    pub fn from_symbols(symbols: &[Code], alphabet_size: usize) -> Self {
        assert_eq!(symbols[0], 0, "position 0 must hold the placeholder symbol");
        let levels = levels_for(alphabet_size);
        let mut order: Vec<Code> = symbols.to_vec();
        let mut level_bits: Vec<Vec<bool>> = Vec::with_capacity(levels as usize);
        for l in 0..levels {
            let bits: Vec<bool> = order.iter().map(|&c| bit_of(c, levels, l)).collect();
            level_bits.push(bits.clone());
            let mut zeros = Vec::with_capacity(order.len());
            let mut ones = Vec::with_capacity(order.len());
            for (&c, &b) in order.iter().zip(bits.iter()) {
                if b {
                    ones.push(c);
                } else {
                    zeros.push(c);
                }
            }
            zeros.extend(ones);
            order = zeros;
        }
        let stat_levels = level_bits
            .into_iter()
            .map(|bits| {
                let len = bits.len() as u64;
                let mut words = vec![0u64; (bits.len() + 63) / 64];
                for (i, &b) in bits.iter().enumerate() {
                    if b {
                        words[i / 64] |= 1u64 << (i % 64);
                    }
                }
                StatLevel::from_words(words, len)
            })
            .collect();
        StatWaveletString { levels: stat_levels, alphabet_size }
    }

    pub fn to_dynamic(&self) -> DynWaveletString {
        DynWaveletString {
            levels: self.levels.iter().map(|l| l.to_dynamic()).collect(),
            alphabet_size: self.alphabet_size,
        }
    }
}

#[sealed]
impl WaveletString for StatWaveletString {
    fn len(&self) -> u64 {
        self.levels[0].len() - 1
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    fn get(&self, i: u64) -> Code {
        matrix_get(&self.levels, i)
    }

    fn rank(&self, c: Code, i: u64) -> u64 {
        matrix_rank(&self.levels, self.levels.len() as u32, c, i + 1)
    }

    fn select(&self, c: Code, j: u64) -> u64 {
        matrix_select(&self.levels, self.levels.len() as u32, c, j)
    }
}

fn zero_count<L: LevelOps>(levels: &[L], l: usize) -> u64 {
    levels[l].len() - levels[l].ones()
}

fn matrix_get<L: LevelOps>(levels: &[L], i: u64) -> Code {
    let n = levels.len() as u32;
    let mut pos = i;
    let mut code: Code = 0;
    for l in 0..n as usize {
        let bit = levels[l].get(pos);
        code = (code << 1) | bit as Code;
        let rank_before = levels[l].rank1(pos);
        pos = if bit { zero_count(levels, l) + rank_before } else { pos - rank_before };
    }
    code
}

fn matrix_rank<L: LevelOps>(levels: &[L], n: u32, c: Code, m: u64) -> u64 {
    let mut lo = 0u64;
    let mut hi = m;
    for l in 0..n as usize {
        let bit = bit_of(c, n, l as u32);
        if bit {
            let z = zero_count(levels, l);
            lo = z + levels[l].rank1(lo);
            hi = z + levels[l].rank1(hi);
        } else {
            lo -= levels[l].rank1(lo);
            hi -= levels[l].rank1(hi);
        }
    }
    hi - lo
}

fn matrix_select<L: LevelOps>(levels: &[L], n: u32, c: Code, j: u64) -> u64 {
    let total = matrix_rank(levels, n, c, levels[0].len());
    if j == 0 || j > total {
        return levels[0].len();
    }
    // position of the start of c's block in the fully-partitioned space
    let start = {
        let mut lo = 0u64;
        for l in 0..n as usize {
            let bit = bit_of(c, n, l as u32);
            lo = if bit { zero_count(levels, l) + levels[l].rank1(lo) } else { lo - levels[l].rank1(lo) };
        }
        lo
    };
    let mut q = start + j - 1;
    for l in (0..n as usize).rev() {
        let bit = bit_of(c, n, l as u32);
        let local_rank = if bit { q - zero_count(levels, l) } else { q };
        q = levels[l].nth(bit, local_rank + 1);
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_symbols() -> Vec<Code> {
        // alphabet_size = 8 (sigma = 4), symbols 0..=7
        vec![0, 3, 1, 7, 2, 0, 5, 3, 3, 6, 1]
    }

    #[test]
    fn static_rank_select_roundtrip() {
        let symbols = sample_symbols();
        let ws = StatWaveletString::from_symbols(&symbols, 8);
        assert_eq!(ws.len(), symbols.len() as u64 - 1);
        for i in 0..symbols.len() {
            assert_eq!(ws.get(i as u64), symbols[i]);
        }
        for c in 0..8 {
            let count = symbols.iter().filter(|&&s| s == c).count() as u64;
            assert_eq!(ws.rank(c, symbols.len() as u64 - 1), count);
            for j in 1..=count {
                let pos = ws.select(c, j);
                assert_eq!(symbols[pos as usize], c);
            }
            assert_eq!(ws.select(c, count + 1), symbols.len() as u64);
        }
    }

    #[test]
    fn dynamic_matches_static() {
        let symbols = sample_symbols();
        let mut dyn_ws = DynWaveletString::new(8);
        for (idx, &c) in symbols.iter().enumerate().skip(1) {
            dyn_ws.insert(idx as u64, c);
        }
        let stat_ws = StatWaveletString::from_symbols(&symbols, 8);
        for i in 0..symbols.len() as u64 {
            assert_eq!(dyn_ws.get(i), stat_ws.get(i));
        }
        for c in 0..8 {
            for i in 0..symbols.len() as u64 {
                assert_eq!(dyn_ws.rank(c, i), stat_ws.rank(c, i), "rank mismatch c={c} i={i}");
            }
        }
    }

    #[test]
    fn dynamic_to_static_conversion_preserves_content() {
        let symbols = sample_symbols();
        let mut dyn_ws = DynWaveletString::new(8);
        for (idx, &c) in symbols.iter().enumerate().skip(1) {
            dyn_ws.insert(idx as u64, c);
        }
        let stat_ws = dyn_ws.to_static();
        for i in 0..symbols.len() as u64 {
            assert_eq!(stat_ws.get(i), dyn_ws.get(i));
        }
    }
}
