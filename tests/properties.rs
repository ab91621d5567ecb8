//! Universal invariants over `GraphCore` (bit-vector/W-array/F-offset
//! consistency) checked against graphs built by repeated `add_sequence`.

use boss_graph::prelude::*;

fn build(seqs: &[&[u8]], k: usize) -> DynGraphCore {
    let alphabet = Alphabet::dna();
    let mut g = DynGraphCore::empty(k, alphabet.clone());
    let mut counter = RemapCounter::default();
    for s in seqs {
        let codes = alphabet.encode_seq(s, &mut counter);
        let mut padded = vec![0u8; k];
        padded.extend_from_slice(&codes);
        g.add_sequence(&padded, false);
    }
    g
}

#[test]
fn p1_last_bit_matches_rank_delta() {
    let g = build(&[b"ACGTACGT", b"ACGA", b"CCGT"], 3);
    for i in 1..=g.n() {
        let delta = g.rank_last(i) - g.rank_last(i - 1);
        assert!(delta == 0 || delta == 1);
        assert_eq!(delta == 1, g.get_last(i));
    }
}

#[test]
fn p2_bwd_of_fwd_is_first_edge_of_source() {
    let g = build(&[b"ACGTACGT", b"ACGA"], 3);
    for i in 1..=g.n() {
        let target = g.fwd(i);
        if target == 0 || target > g.n() {
            continue;
        }
        let node = g.get_source_node(target);
        let first_edge = g.select_last(node) - g.outdegree(node) + 1;
        assert_eq!(g.bwd(target), first_edge, "bwd(fwd({i})) mismatch");
    }
}

#[test]
fn p3_outgoing_edges_are_a_contiguous_range() {
    let g = build(&[b"ACGTACGT", b"ACGA", b"CCGT"], 3);
    for node in 1..=g.num_nodes() {
        let last = g.select_last(node);
        let d = g.outdegree(node);
        let first = last - d + 1;
        assert!(g.get_last(last));
        for i in first..last {
            assert!(!g.get_last(i));
        }
    }
}

#[test]
fn p4_f_matches_target_symbol_counts() {
    let g = build(&[b"ACGTACGT", b"ACGA", b"CCGT"], 3);
    let sigma = g.sigma();
    for c in 0..sigma {
        let count = (1..=g.n())
            .filter(|&edge| {
                let target = g.fwd(edge);
                if target == 0 || target > g.n() {
                    return false;
                }
                let node = g.get_source_node(target);
                (g.get_node_last_value(g.select_last(node)) as usize) < c
            })
            .count() as u64;
        assert_eq!(g.f()[c], count, "F[{c}] mismatch");
    }
}

#[test]
fn p5_map_to_edges_on_freshly_built_sequence_has_no_npos() {
    let alphabet = Alphabet::dna();
    let mut g = DynGraphCore::empty(3, alphabet.clone());
    let mut counter = RemapCounter::default();
    let codes = alphabet.encode_seq(b"ACGTACGT", &mut counter);
    let mut padded = vec![0u8; 3];
    padded.extend_from_slice(&codes);
    g.add_sequence(&padded, false);

    let mut edges = Vec::new();
    g.map_to_edges(&padded, |e| edges.push(e), || false);
    assert!(!edges.is_empty());
    for &e in &edges {
        assert_ne!(e, NPOS);
        assert!(e >= 2 && e <= g.n());
    }
}

#[test]
fn r2_dyn_stat_dyn_round_trip_preserves_representation() {
    let g = build(&[b"ACGTACGT", b"ACGA", b"CCGT"], 3);
    let stat = g.to_static();
    let back = stat.to_dynamic();
    assert!(g.equals_internally(&back));
}

#[test]
fn r4_recovered_kmer_matches_source_node_sequence() {
    let alphabet = Alphabet::dna();
    let mut counter = RemapCounter::default();
    let codes = alphabet.encode_seq(b"ACGT", &mut counter);
    let k = 3;
    let mut padded = vec![0u8; k];
    padded.extend_from_slice(&codes);
    let mut g = DynGraphCore::empty(k, alphabet.clone());
    g.add_sequence(&padded, false);

    let mut edges = Vec::new();
    g.map_to_edges(&padded, |e| edges.push(e), || false);
    for &e in &edges {
        if e == NPOS {
            continue;
        }
        let node = g.get_source_node(e);
        let mut seq = g.get_node_seq(g.select_last(node));
        seq.push(g.get_w(e) % g.sigma() as u8);
        assert_eq!(seq.len(), k + 1);
    }
}

#[test]
fn b1_empty_graph_has_one_sentinel_edge() {
    let g = DynGraphCore::empty(3, Alphabet::dna());
    assert_eq!(g.n(), 1);
    assert_eq!(g.get_w(1), 0);
    assert!(g.get_last(1));
    assert_eq!(g.num_nodes(), 1);
    assert_eq!(g.index(&[1, 2, 3]), NPOS);
}

#[test]
fn b2_short_sequence_add_sequence_is_a_noop() {
    let alphabet = Alphabet::dna();
    let mut g = DynGraphCore::empty(3, alphabet.clone());
    let before_n = g.n();
    let mut counter = RemapCounter::default();
    let codes = alphabet.encode_seq(b"AC", &mut counter); // shorter than k+1 even after padding check
    g.add_sequence(&codes, false);
    assert_eq!(g.n(), before_n);

    let mut edges = Vec::new();
    g.map_to_edges(&codes, |e| edges.push(e), || false);
    assert!(edges.is_empty());
}

#[test]
fn b3_all_n_sequence_never_creates_a_dummy_sink() {
    let alphabet = Alphabet::dna();
    let mut counter = RemapCounter::default();
    let codes = alphabet.encode_seq(b"NNNN", &mut counter);
    let k = 3;
    let mut padded = vec![0u8; k];
    padded.extend_from_slice(&codes);
    let mut g = DynGraphCore::empty(k, alphabet.clone());
    g.add_sequence(&padded, false);

    for i in 1..=g.n() {
        if g.get_w(i) == 0 {
            let node = g.get_source_node(i);
            assert_eq!(node, 1, "no dummy sink other than the root should appear");
        }
    }
}

#[test]
fn s1_single_sequence_node_and_edge_counts() {
    let g = build(&[b"ACGT"], 3);
    assert_eq!(g.num_nodes(), 5);
    assert_eq!(g.num_edges(), 5);
}

#[test]
fn s2_shared_source_gets_two_sorted_outgoing_edges() {
    let g = build(&[b"ACGT", b"ACGA"], 3);
    let alphabet = Alphabet::dna();
    let mut counter = RemapCounter::default();
    let acg = alphabet.encode_seq(b"ACG", &mut counter);
    let node = g.index(&acg);
    assert_ne!(node, NPOS);
    assert_eq!(g.outdegree(node), 2);
    let last = g.select_last(node);
    let first = last - g.outdegree(node) + 1;
    assert!(!g.get_last(first));
    assert!(g.get_last(last));
    assert!(g.get_w(first) < g.get_w(last));
}

#[test]
fn s3_shared_target_has_two_incoming_sources() {
    let g = build(&[b"ACGT", b"CCGT"], 3);
    let alphabet = Alphabet::dna();
    let mut counter = RemapCounter::default();
    let cgt = alphabet.encode_seq(b"CGT", &mut counter);
    let node = g.index(&cgt);
    assert_ne!(node, NPOS);
    assert_eq!(g.indegree(node), 2);
}

#[test]
fn s4_repeated_sequence_is_one_unitig() {
    let g = build(&[b"ACGTACGT"], 3);
    let mut unitigs = Vec::new();
    g.call_unitigs(1, false, |s| unitigs.push(s.to_vec()));
    assert!(unitigs.iter().any(|u| u.windows(8).count() > 0 && u.len() >= 8));
}

#[test]
fn s5_erase_redundant_dummy_edges_preserves_real_lookups() {
    let alphabet = Alphabet::dna();
    let mut g = DynGraphCore::empty(3, alphabet.clone());
    let mut counter = RemapCounter::default();
    for s in [&b"ACGT"[..], &b"CGTA"[..]] {
        let codes = alphabet.encode_seq(s, &mut counter);
        let mut padded = vec![0u8; 3];
        padded.extend_from_slice(&codes);
        g.add_sequence(&padded, false);
    }
    let acgt = alphabet.encode_seq(b"ACGT", &mut counter);
    let mut padded = vec![0u8; 3];
    padded.extend_from_slice(&acgt);
    let mut before = Vec::new();
    g.map_to_edges(&padded, |e| before.push(e != NPOS), || false);

    g.erase_redundant_dummy_edges();

    let mut after = Vec::new();
    g.map_to_edges(&padded, |e| after.push(e != NPOS), || false);
    assert_eq!(before, after);
}

#[test]
fn r1_serialize_load_serialize_is_byte_identical() {
    let g = build(&[b"ACGTACGT", b"ACGA", b"CCGT"], 3).to_static();
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.boss");
    let path_b = dir.path().join("b.boss");
    boss_graph::io::save(&g, &path_a).unwrap();
    let loaded = boss_graph::io::load(&path_a, Alphabet::dna()).unwrap();
    boss_graph::io::save(&loaded, &path_b).unwrap();
    assert_eq!(std::fs::read(&path_a).unwrap(), std::fs::read(&path_b).unwrap());
}

#[test]
fn s6_fuzzy_search_finds_one_mismatch_hit() {
    let g = build(&[b"ACGT", b"ACCA"], 3);
    let alphabet = Alphabet::dna();
    let mut counter = RemapCounter::default();
    let query = alphabet.encode_seq(b"ACGA", &mut counter);
    let hits = g.index_fuzzy(&query, 1);
    assert!(hits.iter().any(|h| h.distance == 1 && h.cigar.iter().filter(|&&op| op == CigarOp::Mismatch).count() == 1));
}
