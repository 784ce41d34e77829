use serde::{Deserialize, Serialize};

/// 1-based, dense, monotone document identifier assigned at ingest.
pub type DocId = u32;

/// Opaque per-document metadata carried through to query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub path: String,
    pub url: String,
}

/// A single `(doc_id, score)` entry in a term's posting list.
///
/// `score = 2 + log10(weighted_tf)`. The additive `2` does not change
/// ranking but is part of the on-disk contract, so it is kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub score: f64,
}

/// One line of a partial doc-map run file: `[doc_id, [path, url]]`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PartialDocLine(pub DocId, pub DocMeta);

/// One line of a partial posting run file: `[term, [[doc_id, score], ...]]`.
///
/// Partial posting run files are sorted ascending by term.
#[derive(Debug, Serialize, Deserialize)]
pub struct PartialPostingLine(pub String, pub Vec<Posting>);

/// One line of the final posting file: `[term, postings, idf]`.
///
/// `postings` is truncated to the 250 highest-score entries; `idf` is
/// computed from the untruncated posting count, before truncation.
#[derive(Debug, Serialize, Deserialize)]
pub struct FinalPostingLine(pub String, pub Vec<Posting>, pub f64);
