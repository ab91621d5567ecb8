//! The seams the core exposes to collaborators explicitly out of scope
//! (§1): the annotation matrix and the taxonomy classifier. Only the
//! interface the graph core invokes is specified here — no concrete
//! column-compressed/BRWT/row-flat/rainbowfish representation, no LCA/RMQ
//! classifier.
//!
//! Grounded on `original_source/metagraph/src/cli/transform_annotation.cpp`
//! (edge-index-keyed label attachment) and
//! `src/annotation/taxonomy/tax_classifier.cpp` (taxid lookup by edge) for
//! the *shape* only.

use crate::error::Result;

/// Stable, non-owning handle an [`AnnotationSink`]/[`LabelSource`] uses to
/// address a graph edge without extending the graph's lifetime (Design
/// Note: "the graph exposes a stable numeric handle ... annotations hold a
/// weak reference for decoding").
pub type EdgeHandle = u64;

/// What the graph core requires of an external annotation column store:
/// the ability to mark that an edge carries a label, and later query which
/// labels an edge carries. A concrete column-compressed/BRWT/rainbowfish
/// implementation lives outside this crate; this trait is the contract it
/// must satisfy to receive labels as the graph is built or extended.
pub trait AnnotationSink {
    /// Record that `edge` carries `label`. Called once per (edge, label)
    /// pair discovered during bulk build or incremental extension.
    fn annotate(&mut self, edge: EdgeHandle, label: &str) -> Result<()>;

    /// All labels known to this sink, in a stable order (column index
    /// order once frozen).
    fn labels(&self) -> &[String];

    /// Freeze the column into its final compressed representation. After
    /// this call, [`Self::annotate`] may no longer be called.
    fn finalize(&mut self) -> Result<()>;
}

/// What the graph core requires of an external taxonomic classifier: a
/// way to resolve a label to a taxonomic id and recover an LCA over a set
/// of ids. The RMQ/DFS-linearization machinery that computes the LCA lives
/// outside this crate.
pub trait LabelSource {
    /// The taxonomic id associated with a label, if any.
    fn taxid(&self, label: &str) -> Option<u64>;

    /// The lowest common ancestor of a set of taxonomic ids.
    fn lca(&self, taxids: &[u64]) -> Option<u64>;
}

/// A trivial in-memory [`AnnotationSink`] used by tests and by
/// `bin/boss_cli.rs`'s illustrative `stats` path; not a production
/// annotation matrix (those are out of scope per §1).
#[derive(Debug, Default)]
pub struct MemorySink {
    labels: Vec<String>,
    rows: std::collections::HashMap<EdgeHandle, Vec<usize>>,
    frozen: bool,
}

impl AnnotationSink for MemorySink {
    fn annotate(&mut self, edge: EdgeHandle, label: &str) -> Result<()> {
        debug_assert!(!self.frozen, "annotate called after finalize");
        let idx = match self.labels.iter().position(|l| l == label) {
            Some(i) => i,
            None => {
                self.labels.push(label.to_string());
                self.labels.len() - 1
            }
        };
        let row = self.rows.entry(edge).or_default();
        if !row.contains(&idx) {
            row.push(idx);
        }
        Ok(())
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn finalize(&mut self) -> Result<()> {
        self.frozen = true;
        Ok(())
    }
}

impl MemorySink {
    pub fn labels_of(&self, edge: EdgeHandle) -> Vec<&str> {
        self.rows.get(&edge).map(|idxs| idxs.iter().map(|&i| self.labels[i].as_str()).collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_dedups_labels_per_edge() {
        let mut sink = MemorySink::default();
        sink.annotate(5, "sample_a").unwrap();
        sink.annotate(5, "sample_a").unwrap();
        sink.annotate(5, "sample_b").unwrap();
        assert_eq!(sink.labels_of(5).len(), 2);
        sink.finalize().unwrap();
        assert_eq!(sink.labels().len(), 2);
    }
}
