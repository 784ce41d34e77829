//! C6: query evaluation over a finalized index — tokenize, look up,
//! idf-prune, lnc.ltc cosine rank.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{IndexError, Result};
use crate::model::{DocId, DocMeta, FinalPostingLine, Posting};
use crate::paths::IndexPaths;
use crate::scoring::IDF_STOPWORD_THRESHOLD;
use crate::tokenizer::tokenize_unique;

/// Number of ranked hits returned per query.
pub const TOP_K: usize = 50;

/// One ranked hit: the resolved document metadata and its final score.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
    pub meta: DocMeta,
}

/// A term found in the index, with its posting list and idf loaded.
struct Survivor {
    postings: Vec<Posting>,
    idf: f64,
}

/// Holds the loaded offset map and doc map for one finalized index, and
/// reopens the final posting file per lookup (cheap, and avoids sharing
/// one seekable handle across concurrent queries).
#[derive(Debug)]
pub struct SearchEngine {
    doc_map: HashMap<DocId, DocMeta>,
    offsets: HashMap<String, u64>,
    index_path: PathBuf,
}

impl SearchEngine {
    /// Verifies all three final artifacts exist and loads the offset map
    /// and doc map into memory. Fails fast if any artifact is missing.
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let index_path = paths.final_search_index();
        if !index_path.is_file() {
            return Err(IndexError::MissingArtifact(index_path));
        }

        let word_index_path = paths.final_word_index();
        let word_index_file = File::open(&word_index_path)
            .map_err(|_| IndexError::MissingArtifact(word_index_path.clone()))?;
        let offsets: HashMap<String, u64> = serde_json::from_reader(word_index_file)?;

        let doc_index_path = paths.final_doc_index();
        let doc_index_file = File::open(&doc_index_path)
            .map_err(|_| IndexError::MissingArtifact(doc_index_path.clone()))?;
        let raw_doc_map: HashMap<String, DocMeta> = serde_json::from_reader(doc_index_file)?;
        let mut doc_map = HashMap::with_capacity(raw_doc_map.len());
        for (id, meta) in raw_doc_map {
            let doc_id: DocId = id
                .parse()
                .map_err(|_| IndexError::MalformedDocument(format!("non-numeric doc_id key {id}")))?;
            doc_map.insert(doc_id, meta);
        }

        info!(
            terms = offsets.len(),
            docs = doc_map.len(),
            "opened search engine"
        );
        Ok(Self {
            doc_map,
            offsets,
            index_path,
        })
    }

    pub fn total_docs(&self) -> u32 {
        self.doc_map.len() as u32
    }

    /// Seeks to `term`'s recorded offset, reads one line, and verifies the
    /// parsed term matches the lookup key. Returns `Ok(None)` for a term
    /// absent from the offset map (contributes nothing, per the documented
    /// "missing term" edge case — not an error).
    fn lookup_term(&self, term: &str) -> Result<Option<Survivor>> {
        let Some(&offset) = self.offsets.get(term) else {
            return Ok(None);
        };

        let mut file = File::open(&self.index_path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(file);
        let mut line = String::new();
        reader.read_line(&mut line)?;

        let FinalPostingLine(found_term, postings, idf) = serde_json::from_str(line.trim())?;
        if found_term != term {
            return Err(IndexError::Corrupted {
                expected: term.to_string(),
                found: found_term,
            });
        }

        Ok(Some(Survivor { postings, idf }))
    }

    /// Runs one query end to end: tokenize, dedup, look up, idf-prune,
    /// score, and resolve the top `TOP_K` hits through the doc map.
    pub fn search(&self, query: &str) -> Result<Vec<Hit>> {
        let stems = tokenize_unique(query);
        if stems.is_empty() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for stem in &stems {
            match self.lookup_term(stem)? {
                Some(survivor) => found.push((stem.clone(), survivor)),
                None => warn!(term = stem.as_str(), "query term not in index, skipping"),
            }
        }
        if found.is_empty() {
            return Ok(Vec::new());
        }

        let pruned: Vec<&(String, Survivor)> = found
            .iter()
            .filter(|(_, s)| s.idf >= IDF_STOPWORD_THRESHOLD)
            .collect();
        let survivors: Vec<&(String, Survivor)> = if pruned.is_empty() {
            found.iter().collect()
        } else {
            pruned
        };

        let ranked = if survivors.len() == 1 {
            self.rank_single_term(&survivors[0].1)
        } else {
            self.rank_cosine(&survivors)
        };

        Ok(self.resolve(ranked))
    }

    /// The documented degenerate path: one surviving term returns its raw
    /// stored tf scores directly, with no idf weighting or normalization.
    fn rank_single_term(&self, survivor: &Survivor) -> Vec<(DocId, f64)> {
        let mut scored: Vec<(DocId, f64)> =
            survivor.postings.iter().map(|p| (p.doc_id, p.score)).collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(TOP_K);
        scored
    }

    /// lnc.ltc cosine: document vector is the stored per-term tf scores
    /// (no further normalization beyond the cosine denominator), query
    /// vector is the idf of each surviving term (query tf is implicitly 1,
    /// since query terms are deduplicated).
    fn rank_cosine(&self, survivors: &[&(String, Survivor)]) -> Vec<(DocId, f64)> {
        let mut dot: HashMap<DocId, f64> = HashMap::new();
        let mut tf_sumsq: HashMap<DocId, f64> = HashMap::new();
        let mut idf_sumsq = 0.0;

        for (_, survivor) in survivors {
            idf_sumsq += survivor.idf * survivor.idf;
            for posting in &survivor.postings {
                *dot.entry(posting.doc_id).or_insert(0.0) += posting.score * survivor.idf;
                *tf_sumsq.entry(posting.doc_id).or_insert(0.0) += posting.score * posting.score;
            }
        }

        let idf_norm = idf_sumsq.sqrt();
        let mut scored: Vec<(DocId, f64)> = dot
            .into_iter()
            .map(|(doc_id, d)| {
                let tf_norm = tf_sumsq.get(&doc_id).copied().unwrap_or(0.0).sqrt();
                let score = if tf_norm > 0.0 && idf_norm > 0.0 {
                    d / (tf_norm * idf_norm)
                } else {
                    0.0
                };
                (doc_id, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(TOP_K);
        scored
    }

    fn resolve(&self, ranked: Vec<(DocId, f64)>) -> Vec<Hit> {
        ranked
            .into_iter()
            .filter_map(|(doc_id, score)| {
                self.doc_map.get(&doc_id).map(|meta| Hit {
                    doc_id,
                    score,
                    meta: meta.clone(),
                })
            })
            .collect()
    }
}
