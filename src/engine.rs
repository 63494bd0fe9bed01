// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The engine facade: configuration, text analysis and the index in one
//! `Send + Sync` handle.
//!
//! ```ignore
//! let engine = Engine::new(EngineConfig::default())?;
//! engine.upsert_text("c-1", &[(FieldRole::Name, "Aria")], 120)?;
//! let page = engine.search(&SearchRequest::new("aria"), &[])?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{EngineConfig, FieldTables};
use crate::error::Result;
use crate::index::{Generation, IndexManager};
use crate::search::{QueryPipeline, SearchRequest};
use crate::synonyms::SynonymTable;
use crate::tokenize::Tokenizer;
use crate::types::{Document, FieldRole, SearchResponse, SemanticHit};

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    tables: FieldTables,
    tokenizer: Tokenizer,
    synonyms: SynonymTable,
    index: IndexManager,
}

/// Size summary of the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexStats {
    pub generation: u64,
    pub documents: usize,
    pub terms: usize,
    pub slots: usize,
    pub avg_doc_length: f64,
}

impl Engine {
    /// Engine over an empty index.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let index = IndexManager::new(&config)?;
        Self::assemble(config, index)
    }

    /// Engine over a persisted index.
    pub fn open(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let index = IndexManager::open(path, &config)?;
        Self::assemble(config, index)
    }

    /// Engine over a persisted index, rebuilt from `fallback` when the file is
    /// missing or corrupt.
    pub fn open_or_rebuild<F>(path: impl AsRef<Path>, config: EngineConfig, fallback: F) -> Result<Self>
    where
        F: FnOnce(&Tokenizer) -> Result<Vec<Document>>,
    {
        config.validate()?;
        let tokenizer = Tokenizer::new(config.min_token_chars);
        let index = IndexManager::open_or_rebuild(path, &config, || fallback(&tokenizer))?;
        Self::assemble(config, index)
    }

    fn assemble(config: EngineConfig, index: IndexManager) -> Result<Self> {
        let tables = config.field_tables()?;
        let mut synonyms = SynonymTable::bundled();
        if let Some(path) = &config.synonyms_path {
            let extra = SynonymTable::from_path(path)?;
            tracing::info!(path = %path.display(), entries = extra.len(), "merged synonym file");
            synonyms.merge(&extra);
        }
        Ok(Self {
            tokenizer: Tokenizer::new(config.min_token_chars),
            tables,
            synonyms,
            index,
            config,
        })
    }

    /// Replace the synonym table (the bundled table is not kept).
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    pub fn snapshot(&self) -> Arc<Generation> {
        self.index.snapshot()
    }

    /// Rank one page. The query runs against a single generation even if a
    /// mutation publishes a newer one meanwhile.
    pub fn search(&self, request: &SearchRequest, semantic: &[SemanticHit]) -> Result<SearchResponse> {
        let generation = self.index.snapshot();
        self.pipeline().run(&generation, request, semantic)
    }

    fn pipeline(&self) -> QueryPipeline<'_> {
        QueryPipeline {
            config: &self.config,
            tables: &self.tables,
            tokenizer: &self.tokenizer,
            synonyms: &self.synonyms,
        }
    }

    pub fn upsert(&self, doc: Document) -> Result<u64> {
        self.index.upsert(doc)
    }

    pub fn upsert_batch(&self, docs: Vec<Document>) -> Result<u64> {
        self.index.upsert_batch(docs)
    }

    /// Tokenize raw field text with this engine's tokenizer and upsert.
    pub fn upsert_text(&self, id: &str, fields: &[(FieldRole, &str)], popularity: u64) -> Result<u64> {
        let doc = fields
            .iter()
            .fold(Document::builder(id), |b, (role, text)| b.field(*role, *text))
            .popularity(popularity)
            .build(&self.tokenizer)?;
        self.index.upsert(doc)
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        self.index.remove(id)
    }

    pub fn rebuild(&self, docs: Vec<Document>) -> Result<u64> {
        self.index.rebuild(docs)
    }

    /// Persist the current generation, compressed per `compress_sections`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.index.save(path, self.config.compress_sections)
    }

    pub fn stats(&self) -> IndexStats {
        let generation = self.index.snapshot();
        let lexical = generation.lexical();
        IndexStats {
            generation: generation.number(),
            documents: generation.len(),
            terms: lexical.term_count(),
            slots: lexical.slot_count(),
            avg_doc_length: lexical.avg_doc_length(),
        }
    }
}
