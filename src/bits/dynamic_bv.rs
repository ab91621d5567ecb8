use super::{prefix_popcount, word_bit, word_set, words_for_bits, BitSequence, DynamicBits};
use crate::bits::small_bv::SmallBitVector;
use crate::bits::StatBitVector;

/// Mutable bit vector supporting `insert`/`delete`/`set` alongside
/// rank/select, used while a graph is being built incrementally
/// (`append_pos`, §4.4).
///
/// Rank/select here scan the word array directly rather than maintaining a
/// block-rank cache (as [`StatBitVector`] does): keeping a cache correct
/// under arbitrary-position insert/delete would require either an O(n)
/// cache rebuild per mutation or a balanced-tree block index (the
/// approach `original_source`'s `bit_vector_dyn` takes via libmaus). Given
/// this engine's incremental-construction workload interleaves many
/// mutations with comparatively few rank/select calls per edge appended,
/// scan-based queries are the simpler, still-correct choice; a production
/// deployment processing very large dynamic graphs would want the
/// balanced-tree version instead (see DESIGN.md, Open Question notes).
#[derive(Debug, Clone, Default)]
pub struct DynBitVector {
    words: Vec<u64>,
    len: u64,
}

impl DynBitVector {
    pub fn new() -> Self {
        DynBitVector { words: vec![0u64], len: 0 }
    }

    pub fn from_words(words: Vec<u64>, len: u64) -> Self {
        DynBitVector { words, len }
    }

    pub fn to_static(&self) -> StatBitVector {
        StatBitVector::from_words(self.words.clone(), self.len)
    }

    pub fn to_small(&self) -> SmallBitVector {
        SmallBitVector::from_words(self.words.clone(), self.len)
    }

    fn ensure_capacity(&mut self, n_bits: u64) {
        let needed = words_for_bits(n_bits);
        if needed > self.words.len() {
            self.words.resize(needed, 0);
        }
    }
}

#[sealed::sealed]
impl BitSequence for DynBitVector {
    fn len(&self) -> u64 {
        self.len
    }

    fn get(&self, i: u64) -> bool {
        word_bit(&self.words, i)
    }

    fn rank1(&self, i: u64) -> u64 {
        prefix_popcount(&self.words, i + 1)
    }

    fn select1(&self, j: u64) -> u64 {
        if j == 0 {
            return 0;
        }
        let mut remaining = j;
        let mut pos = 0u64;
        while pos <= self.len {
            if word_bit(&self.words, pos) {
                remaining -= 1;
                if remaining == 0 {
                    return pos;
                }
            }
            pos += 1;
        }
        self.len + 1
    }
}

#[sealed::sealed]
impl DynamicBits for DynBitVector {
    fn insert(&mut self, i: u64, bit: bool) {
        debug_assert!(i >= 1 && i <= self.len + 1);
        self.len += 1;
        self.ensure_capacity(self.len + 1);
        // Shift every position at or above `i` up by one, processing from
        // the top down so each source value is read before being
        // overwritten.
        let mut pos = self.len;
        while pos > i {
            let prev = word_bit(&self.words, pos - 1);
            word_set(&mut self.words, pos, prev);
            pos -= 1;
        }
        word_set(&mut self.words, i, bit);
    }

    fn delete(&mut self, i: u64) {
        debug_assert!(i >= 1 && i <= self.len);
        let mut pos = i;
        while pos < self.len {
            let next = word_bit(&self.words, pos + 1);
            word_set(&mut self.words, pos, next);
            pos += 1;
        }
        word_set(&mut self.words, self.len, false);
        self.len -= 1;
    }

    fn set(&mut self, i: u64, bit: bool) {
        debug_assert!(i >= 1 && i <= self.len);
        word_set(&mut self.words, i, bit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_delete_preserve_rank() {
        let mut bv = DynBitVector::new();
        // build [1,0,1,1,0] at positions 1..=5
        for (idx, &b) in [true, false, true, true, false].iter().enumerate() {
            bv.insert(idx as u64 + 1, b);
        }
        assert_eq!(bv.len(), 5);
        assert_eq!(bv.rank1(5), 3);
        assert_eq!(bv.select1(2), 3);

        bv.delete(1); // remove the leading `1` -> [0,1,1,0]
        assert_eq!(bv.len(), 4);
        assert_eq!(bv.get(1), false);
        assert_eq!(bv.rank1(4), 2);

        bv.insert(1, true); // [1,0,1,1,0]
        assert_eq!(bv.rank1(5), 3);
    }

    #[test]
    fn set_overwrites() {
        let mut bv = DynBitVector::new();
        for _ in 0..4 {
            bv.insert(bv.len() + 1, false);
        }
        bv.set(2, true);
        assert!(bv.get(2));
        assert_eq!(bv.rank1(4), 1);
    }
}
