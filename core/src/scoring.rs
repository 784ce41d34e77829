//! Pure scoring functions shared by the final writer (C5) and the query
//! evaluator (C6). Kept free of any persistence or I/O concerns.

/// Terms appearing in at least 90% of the corpus are treated as stop-words
/// during query-time idf pruning: `log10(10/9)`.
pub const IDF_STOPWORD_THRESHOLD: f64 = 0.045_757_490_560_675_13;

/// `score = 2 + log10(weighted_tf)`. Preserved verbatim from the source
/// system; the `2` is rank-irrelevant but part of the on-disk contract.
pub fn tf_score(weighted_tf: f64) -> f64 {
    2.0 + weighted_tf.log10()
}

/// `idf = log10(N / df)`.
pub fn idf(total_docs: u32, doc_freq: usize) -> f64 {
    (total_docs as f64 / doc_freq as f64).log10()
}
