//! Disk-backed level store for product- and remainder-tree nodes.
//!
//! One entry per (tree, level, slot), each a single bignum, persisted as a
//! file under the working directory. File names are derived from the key
//! alone, so a worker that wrote a slot and another worker that later reads
//! it share no in-memory index. Writes go to a temp file in the same
//! directory and are renamed into place, so a concurrent reader sees either
//! the complete value or not-found, never a partial payload.
//!
//! The payload is the raw little-endian magnitude of the value; the store
//! owns this format and nothing else reads the files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use tempfile::NamedTempFile;

use crate::error::{EngineError, Phase, StoreOp};

/// Which of the two trees an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tree {
    Product,
    Remainder,
}

impl Tree {
    fn prefix(self) -> &'static str {
        match self {
            Tree::Product => "p",
            Tree::Remainder => "r",
        }
    }
}

/// Store rooted at a working directory. Cheap to share by reference across
/// worker threads; all methods take `&self`.
#[derive(Debug)]
pub struct LevelStore {
    root: PathBuf,
}

impl LevelStore {
    /// Open a store under `root`, creating the directory if needed. The
    /// directory is assumed to be empty at the start of a run; stale entries
    /// from previous runs are neither detected nor cleaned.
    pub fn open(root: &Path) -> Result<Self, EngineError> {
        fs::create_dir_all(root)?;
        Ok(LevelStore {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, tree: Tree, level: usize, slot: usize) -> PathBuf {
        self.root
            .join(format!("{}{}_{}.num", tree.prefix(), level, slot))
    }

    /// Persist one value. Atomic against concurrent readers of the same slot.
    pub fn put(
        &self,
        phase: Phase,
        tree: Tree,
        level: usize,
        slot: usize,
        value: &BigUint,
    ) -> Result<(), EngineError> {
        self.write_entry(tree, level, slot, value)
            .map_err(|source| EngineError::Store {
                phase,
                op: StoreOp::Write,
                level,
                slot,
                source,
            })
    }

    fn write_entry(
        &self,
        tree: Tree,
        level: usize,
        slot: usize,
        value: &BigUint,
    ) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&value.to_bytes_le())?;
        tmp.persist(self.entry_path(tree, level, slot))
            .map_err(|e| e.error)?;
        Ok(())
    }

    /// Load one value. The level barriers guarantee the entry exists by the
    /// time anyone reads it, so a miss is reported as a scheduler bug rather
    /// than retried.
    pub fn get(
        &self,
        phase: Phase,
        tree: Tree,
        level: usize,
        slot: usize,
    ) -> Result<BigUint, EngineError> {
        match fs::read(self.entry_path(tree, level, slot)) {
            Ok(bytes) => Ok(BigUint::from_bytes_le(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(EngineError::MissingEntry {
                phase,
                level,
                slot,
            }),
            Err(source) => Err(EngineError::Store {
                phase,
                op: StoreOp::Read,
                level,
                slot,
                source,
            }),
        }
    }

    /// Release one entry. Idempotent: removing an already-removed entry is
    /// not an error.
    pub fn remove(
        &self,
        phase: Phase,
        tree: Tree,
        level: usize,
        slot: usize,
    ) -> Result<(), EngineError> {
        match fs::remove_file(self.entry_path(tree, level, slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(EngineError::Store {
                phase,
                op: StoreOp::Remove,
                level,
                slot,
                source,
            }),
        }
    }

    /// Release every entry of a level once its last reader has passed.
    pub fn remove_level(
        &self,
        phase: Phase,
        tree: Tree,
        level: usize,
        len: usize,
    ) -> Result<(), EngineError> {
        for slot in 0..len {
            self.remove(phase, tree, level, slot)?;
        }
        Ok(())
    }

    /// Whether an entry is currently present. Used by tests to check the
    /// store lifecycle; the engine itself never polls.
    pub fn contains(&self, tree: Tree, level: usize, slot: usize) -> bool {
        self.entry_path(tree, level, slot).exists()
    }
}
