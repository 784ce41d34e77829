//! C4: k-way merge of sorted partial posting run files into one
//! lexicographically-ordered stream, by term.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::model::{PartialPostingLine, Posting};

struct HeapEntry {
    term: String,
    source: usize,
    postings: Vec<Posting>,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term && self.source == other.source
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // `BinaryHeap` is a max-heap; reverse the comparison so it pops the
    // lexicographically smallest (term, source) pair first. Compare on
    // (term, source) only — postings have no natural total order and
    // comparing them would be wasted work besides.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .term
            .cmp(&self.term)
            .then_with(|| other.source.cmp(&self.source))
    }
}

fn read_entry(reader: &mut BufReader<File>, source: usize) -> Result<Option<HeapEntry>> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Ok(None);
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let PartialPostingLine(term, postings) = serde_json::from_str(trimmed)?;
    Ok(Some(HeapEntry {
        term,
        source,
        postings,
    }))
}

/// Streams the merge: one `(term, merged_postings)` per distinct term, in
/// ascending term order, with all partials' postings for that term
/// concatenated in heap-pop order. Every source file handle lives in
/// `sources` and closes via ordinary drop — on a normal `for` loop
/// exhausting the iterator, an early `break`, or an `Err` short-circuiting
/// the caller with `?`, the `MergeIter` (and its files) are dropped the
/// same way.
pub struct MergeIter {
    sources: Vec<BufReader<File>>,
    heap: BinaryHeap<HeapEntry>,
}

impl MergeIter {
    pub fn open(partial_files: &[impl AsRef<Path>]) -> Result<Self> {
        let mut sources = Vec::with_capacity(partial_files.len());
        for p in partial_files {
            sources.push(BufReader::new(File::open(p)?));
        }
        let mut heap = BinaryHeap::new();
        for idx in 0..sources.len() {
            if let Some(entry) = read_entry(&mut sources[idx], idx)? {
                heap.push(entry);
            }
        }
        Ok(Self { sources, heap })
    }

    fn refill_from(&mut self, source: usize) -> Result<()> {
        if let Some(entry) = read_entry(&mut self.sources[source], source)? {
            self.heap.push(entry);
        }
        Ok(())
    }
}

impl Iterator for MergeIter {
    type Item = Result<(String, Vec<Posting>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.heap.pop()?;
        let term = first.term;
        let source = first.source;
        let mut merged = first.postings;

        if let Err(e) = self.refill_from(source) {
            return Some(Err(e));
        }

        while let Some(top) = self.heap.peek() {
            if top.term != term {
                break;
            }
            let next_entry = self.heap.pop().expect("peeked entry must pop");
            merged.extend(next_entry.postings);
            if let Err(e) = self.refill_from(next_entry.source) {
                return Some(Err(e));
            }
        }

        Some(Ok((term, merged)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_run(dir: &std::path::Path, name: &str, lines: &[(&str, Vec<Posting>)]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        for (term, postings) in lines {
            let line = PartialPostingLine(term.to_string(), postings.clone());
            writeln!(f, "{}", serde_json::to_string(&line).unwrap()).unwrap();
        }
        path
    }

    #[test]
    fn merges_and_groups_equal_terms_in_term_order() {
        let dir = tempfile::tempdir().unwrap();
        let run_a = write_run(
            dir.path(),
            "a.txt",
            &[
                ("alpha", vec![Posting { doc_id: 1, score: 2.0 }]),
                ("gamma", vec![Posting { doc_id: 1, score: 2.0 }]),
            ],
        );
        let run_b = write_run(
            dir.path(),
            "b.txt",
            &[
                ("alpha", vec![Posting { doc_id: 2, score: 2.1 }]),
                ("beta", vec![Posting { doc_id: 2, score: 2.2 }]),
            ],
        );

        let merge = MergeIter::open(&[run_a, run_b]).unwrap();
        let out: Vec<(String, Vec<Posting>)> = merge.map(|r| r.unwrap()).collect();
        let terms: Vec<&str> = out.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, vec!["alpha", "beta", "gamma"]);
        assert_eq!(out[0].1.len(), 2); // alpha merged from both runs
    }
}
