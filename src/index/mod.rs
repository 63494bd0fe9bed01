// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index lifecycle: generations, mutation, persistence, recovery.
//!
//! ```text
//!             snapshot()                       upsert / remove / rebuild
//!   readers ─────────────┐                    ┌──────────────────────────
//!                        ▼                    ▼
//!          RwLock<Arc<Generation>> ◀── swap ── gate (Mutex, try_lock)
//!                 gen N  →  gen N+1             build gen N+1 off to the side
//! ```
//!
//! Readers take the read lock only long enough to clone the `Arc`; the query
//! then runs against that snapshot with no lock held. A writer derives the
//! next generation from the current one, validates it in debug builds, and
//! publishes it with a single pointer swap. Queries already running finish on
//! the generation they started with.
//!
//! Only one mutation runs at a time. A second caller does not queue; it gets
//! `IndexUnavailable` immediately and may retry.

mod generation;

pub use generation::Generation;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::binary::{decode_generation, encode_generation};
use crate::config::{Bm25Params, EngineConfig, FieldTables};
use crate::contracts::check_generation_well_formed;
use crate::error::{EngineError, Result};
use crate::types::Document;

#[derive(Debug)]
pub struct IndexManager {
    current: RwLock<Arc<Generation>>,
    gate: Mutex<()>,
    params: Bm25Params,
    tables: FieldTables,
}

impl IndexManager {
    /// Manager over an empty generation 0.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let tables = config.field_tables()?;
        Ok(Self::with_generation(
            config.bm25,
            tables,
            Generation::empty(config.bm25, tables),
        ))
    }

    fn with_generation(params: Bm25Params, tables: FieldTables, generation: Generation) -> Self {
        Self {
            current: RwLock::new(Arc::new(generation)),
            gate: Mutex::new(()),
            params,
            tables,
        }
    }

    /// The current generation. Hold it for the whole query.
    pub fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&self.current.read())
    }

    pub fn generation(&self) -> u64 {
        self.current.read().number()
    }

    fn publish(&self, next: Generation) -> u64 {
        check_generation_well_formed(&next);
        let number = next.number();
        *self.current.write() = Arc::new(next);
        number
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert or replace one document. Returns the new generation number.
    pub fn upsert(&self, doc: Document) -> Result<u64> {
        self.upsert_batch(vec![doc])
    }

    /// Insert or replace several documents as one generation.
    ///
    /// All documents are validated before any is applied; one bad document
    /// rejects the whole batch.
    pub fn upsert_batch(&self, docs: Vec<Document>) -> Result<u64> {
        for doc in &docs {
            doc.validate()?;
        }
        let _guard = self.gate.try_lock().ok_or(EngineError::IndexUnavailable)?;

        let current = self.snapshot();
        if docs.is_empty() {
            return Ok(current.number());
        }
        let mut next = current.successor();
        let count = docs.len();
        for doc in docs {
            next.apply_upsert(doc);
        }
        let number = self.publish(next);
        tracing::debug!(generation = number, documents = count, "upserted documents");
        Ok(number)
    }

    /// Remove a document. Removing an absent id changes nothing and returns
    /// `Ok(false)`.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.gate.try_lock().ok_or(EngineError::IndexUnavailable)?;

        let current = self.snapshot();
        if current.document(id).is_none() {
            return Ok(false);
        }
        let mut next = current.successor();
        next.apply_remove(id);
        let number = self.publish(next);
        tracing::debug!(generation = number, id, "removed document");
        Ok(true)
    }

    /// Replace the whole corpus. Queries keep seeing the old generation
    /// until the new one is complete.
    pub fn rebuild(&self, docs: Vec<Document>) -> Result<u64> {
        for doc in &docs {
            doc.validate()?;
        }
        let _guard = self.gate.try_lock().ok_or(EngineError::IndexUnavailable)?;
        self.rebuild_locked(docs)
    }

    fn rebuild_locked(&self, docs: Vec<Document>) -> Result<u64> {
        let number = self.generation() + 1;
        let count = docs.len();
        let next = Generation::build(number, self.params, self.tables, docs);
        next.validate()?;
        let number = self.publish(next);
        tracing::info!(
            generation = number,
            documents = count,
            "rebuilt lexical index"
        );
        Ok(number)
    }

    // ------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------

    /// Check the current generation's invariants.
    pub fn verify(&self) -> Result<()> {
        self.snapshot().validate()
    }

    /// Rebuild from the current generation's own document store.
    pub fn recover(&self) -> Result<u64> {
        let _guard = self.gate.try_lock().ok_or(EngineError::IndexUnavailable)?;
        let docs: Vec<Document> = self
            .snapshot()
            .sorted_documents()
            .into_iter()
            .cloned()
            .collect();
        tracing::warn!(documents = docs.len(), "forcing rebuild from document store");
        self.rebuild_locked(docs)
    }

    /// Verify, and rebuild if the index is corrupt.
    ///
    /// Returns `Some(generation)` when a rebuild happened.
    pub fn verify_or_recover(&self) -> Result<Option<u64>> {
        match self.verify() {
            Ok(()) => Ok(None),
            Err(e @ EngineError::CorruptIndexState(_)) => {
                tracing::error!(error = %e, "index failed verification");
                self.recover().map(Some)
            }
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist the current generation: write to a temp file, then rename.
    pub fn save(&self, path: impl AsRef<Path>, compress: bool) -> Result<u64> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        let bytes = encode_generation(&snapshot, compress)?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        // Atomic write: write to temp, then rename
        fs::write(tmp_path, &bytes)?;
        fs::rename(tmp_path, path)?;

        tracing::info!(
            path = %path.display(),
            generation = snapshot.number(),
            documents = snapshot.len(),
            bytes = bytes.len(),
            "saved index"
        );
        Ok(snapshot.number())
    }

    /// Load a persisted generation.
    pub fn open(path: impl AsRef<Path>, config: &EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        let tables = config.field_tables()?;
        let bytes = fs::read(path)?;
        let generation = decode_generation(&bytes, config.bm25, tables)?;
        tracing::info!(
            path = %path.display(),
            generation = generation.number(),
            documents = generation.len(),
            "loaded index"
        );
        Ok(Self::with_generation(config.bm25, tables, generation))
    }

    /// Load a persisted generation, or rebuild from `fallback` when the file
    /// is missing or fails validation.
    pub fn open_or_rebuild<F>(path: impl AsRef<Path>, config: &EngineConfig, fallback: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Vec<Document>>,
    {
        let path = path.as_ref();
        match Self::open(path, config) {
            Ok(manager) => Ok(manager),
            Err(e) if e.needs_rebuild() || is_not_found(&e) => {
                tracing::warn!(path = %path.display(), error = %e, "rebuilding index from source documents");
                let manager = Self::new(config)?;
                manager.rebuild(fallback()?)?;
                Ok(manager)
            }
            Err(e) => Err(e),
        }
    }
}

fn is_not_found(e: &EngineError) -> bool {
    matches!(e, EngineError::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
}
