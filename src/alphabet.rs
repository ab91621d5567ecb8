//! Runtime alphabet description.
//!
//! The original engine picks one of a handful of alphabets at compile time
//! (`_DNA_GRAPH`, `_DNA_CASE_SENSITIVE_GRAPH`, `_PROTEIN_GRAPH`); we keep the
//! same two reference alphabets (DNA, protein) but make the choice a
//! runtime value so a single build of the crate serves both.

use crate::error::RemapCounter;

/// A symbol code in `[0, sigma)`. `0` is always the sentinel `$`.
pub type Code = u8;

/// Encode/decode table for a fixed alphabet of `sigma` regular symbols plus
/// the sentinel.
#[derive(Debug, Clone)]
pub struct Alphabet {
    /// Display characters, `chars[0] == '$'`.
    chars: Vec<u8>,
    /// `encode[byte as usize]` maps an input byte to a code in `[0, sigma)`.
    encode: [Code; 256],
    /// The code substituted for any byte not in the alphabet (DNA: `N`).
    other: Code,
}

impl Alphabet {
    /// DNA alphabet: `$ A C G T N`, sigma = 6. Matches `original_source`'s
    /// `_DNA_GRAPH` table (`kCharToNucleotide`), including the catch-all
    /// remap to `N`.
    pub fn dna() -> Self {
        let chars = b"$ACGTN".to_vec();
        let mut encode = [5u8; 256]; // unseen bytes -> N
        encode[b'$' as usize] = 0;
        encode[b'A' as usize] = 1;
        encode[b'a' as usize] = 1;
        encode[b'C' as usize] = 2;
        encode[b'c' as usize] = 2;
        encode[b'G' as usize] = 3;
        encode[b'g' as usize] = 3;
        encode[b'T' as usize] = 4;
        encode[b't' as usize] = 4;
        encode[b'U' as usize] = 4;
        encode[b'u' as usize] = 4;
        encode[b'N' as usize] = 5;
        encode[b'n' as usize] = 5;
        Alphabet { chars, encode, other: 5 }
    }

    /// Amino-acid alphabet, sigma = 27 (20 standard residues + `$` + a
    /// handful of ambiguity codes, matching `_PROTEIN_GRAPH`'s 27-wide
    /// table).
    pub fn protein() -> Self {
        let residues = b"ACDEFGHIKLMNPQRSTVWYBZJUOX";
        let mut chars = vec![b'$'];
        chars.extend_from_slice(residues);
        let mut encode = [26u8; 256]; // unseen -> X (last symbol)
        encode[b'$' as usize] = 0;
        for (i, &c) in residues.iter().enumerate() {
            let code = (i + 1) as Code;
            encode[c as usize] = code;
            encode[c.to_ascii_lowercase() as usize] = code;
        }
        Alphabet { chars, encode, other: 26 }
    }

    /// Number of symbols including the sentinel.
    pub fn sigma(&self) -> usize {
        self.chars.len()
    }

    /// Encode a byte, bumping `counter` and returning the "other" code if
    /// the byte is not a recognized symbol. This is the `BadInput` recovery
    /// path of §7: never fatal, always silently remapped.
    pub fn encode(&self, byte: u8, counter: &mut RemapCounter) -> Code {
        let code = self.encode[byte as usize];
        if code == self.other && byte != self.chars[self.other as usize] {
            counter.bump();
        }
        code
    }

    pub fn encode_seq(&self, seq: &[u8], counter: &mut RemapCounter) -> Vec<Code> {
        seq.iter().map(|&b| self.encode(b, counter)).collect()
    }

    pub fn decode(&self, code: Code) -> u8 {
        self.chars[code as usize]
    }

    pub fn decode_seq(&self, codes: &[Code]) -> Vec<u8> {
        codes.iter().map(|&c| self.decode(c)).collect()
    }

    /// Reverse-complement a single code, used by canonicalization. Only
    /// meaningful for the DNA alphabet; for any other alphabet the
    /// complement of a symbol is itself (canonical mode is a DNA-only
    /// concept here, per SPEC_FULL.md §4.6 / DESIGN.md OQ4).
    pub fn complement(&self, code: Code) -> Code {
        match (self.sigma(), code) {
            (6, 0) => 0,
            (6, 1) => 4,
            (6, 2) => 3,
            (6, 3) => 2,
            (6, 4) => 1,
            (6, 5) => 5,
            _ => code,
        }
    }

    pub fn is_dna(&self) -> bool {
        self.sigma() == 6
    }
}
