use std::path::{Path, PathBuf};

/// Layout of the on-disk artifacts, rooted at a working directory: a
/// `helper_indexes/` tree for partial and final doc maps, and a
/// `main_indexes/` tree for partial and final posting files.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn helper_dir(&self) -> PathBuf {
        self.root.join("helper_indexes")
    }

    pub fn main_dir(&self) -> PathBuf {
        self.root.join("main_indexes")
    }

    /// Partial doc-map run file for one spill, keyed by a monotone
    /// timestamp so runs sort naturally.
    pub fn partial_doc_index(&self, timestamp: &str) -> PathBuf {
        self.helper_dir().join(format!("{timestamp}_doc_index.txt"))
    }

    /// Partial posting run file for one spill.
    pub fn partial_search_index(&self, timestamp: &str) -> PathBuf {
        self.main_dir().join(format!("{timestamp}_search_index.txt"))
    }

    pub fn final_doc_index(&self) -> PathBuf {
        self.helper_dir().join("final_doc_index.txt")
    }

    pub fn final_word_index(&self) -> PathBuf {
        self.helper_dir().join("final_word_index.txt")
    }

    pub fn final_search_index(&self) -> PathBuf {
        self.main_dir().join("final_search_index.txt")
    }
}
