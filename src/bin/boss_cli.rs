//! Minimal illustrative front end over the library's `build`/`extend`/
//! `transform`/`stats` surface (§6). Flag parsing is explicitly out of
//! scope (§1); this binary exists only to give the ambient logging/error
//! stack a realistic call site, kept as a thin wrapper around the library.

use anyhow::{Context, Result};
use boss_graph::prelude::*;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "stats".to_string());

    match command.as_str() {
        "build" => build(args.collect()),
        "stats" => stats(args.collect()),
        other => {
            eprintln!("ERROR: unknown command {other:?} (expected one of: build, stats)");
            std::process::exit(1);
        }
    }
}

fn build(files: Vec<String>) -> Result<()> {
    if files.is_empty() {
        eprintln!("ERROR: build requires at least one input FASTA/plain-text file");
        std::process::exit(1);
    }
    let config = BuildConfig::new(3, Alphabet::dna());
    let mut builder = BulkBuilder::new(config);
    for path in &files {
        let contents = std::fs::read(path).with_context(|| format!("reading {path}"))?;
        for line in contents.split(|&b| b == b'\n') {
            if !line.is_empty() {
                builder.add_sequence(line)?;
            }
        }
    }
    let graph = builder.finalize()?;
    log::info!(
        "built graph: {} nodes, {} edges, {} remapped symbols",
        graph.num_nodes(),
        graph.num_edges(),
        builder.remapped_symbols()
    );
    let out = PathBuf::from("graph.boss");
    boss_graph::io::save(&graph, &out)?;
    println!("wrote {}", out.display());
    Ok(())
}

fn stats(files: Vec<String>) -> Result<()> {
    let Some(path) = files.into_iter().next() else {
        eprintln!("ERROR: stats requires a graph file path");
        std::process::exit(1);
    };
    let graph = boss_graph::io::load(&path, Alphabet::dna())?;
    println!("n = {}", graph.n());
    println!("nodes = {}", graph.num_nodes());
    println!("edges = {}", graph.num_edges());
    println!("k = {}", graph.k());
    println!("F = {:?}", graph.f());
    Ok(())
}
