// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hybrid ranking engine for multilingual character profiles.
//!
//! A query is matched lexically (BM25 over normalized Korean, English and
//! Japanese terms, widened by a cross-lingual synonym table), fused with an
//! externally computed semantic ranking by Reciprocal Rank Fusion, boosted by
//! field-weighted keyword matches and popularity, filtered, and paginated.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐
//! │ tokenize   │───▶│ inverted   │───▶│ fusion     │◀── semantic ranking
//! │ synonyms   │    │ (BM25)     │    │ (RRF)      │
//! └────────────┘    └────────────┘    └────────────┘
//!        │                 ▲                 │
//!        │          ┌────────────┐           ▼
//!        │          │ index      │    ┌────────────┐
//!        │          │ generations│    │ scoring    │  keyword, popularity,
//!        │          └────────────┘    │ search     │  filter, sort, page
//!        │                 ▲          └────────────┘
//!        ▼                 │
//! ┌────────────┐    ┌────────────┐
//! │ build      │───▶│ binary     │  .rstr persistence
//! │ (catalog)  │    │            │
//! └────────────┘    └────────────┘
//! ```
//!
//! | Module      | Role                                                |
//! |-------------|-----------------------------------------------------|
//! | `tokenize`  | normalization and script-aware splitting            |
//! | `synonyms`  | symmetric one-level term equivalence                |
//! | `inverted`  | BM25 lexical index with copy-on-write postings      |
//! | `scoring`   | keyword boost, popularity boost, final composition  |
//! | `fusion`    | Reciprocal Rank Fusion                              |
//! | `search`    | query pipeline, filters, pagination                 |
//! | `index`     | generation lifecycle, atomic swap, recovery         |
//! | `binary`    | persisted index format                              |
//! | `build`     | JSONL catalog ingestion                             |
//! | `engine`    | the `Send + Sync` facade over all of the above      |
//!
//! # Usage
//!
//! ```ignore
//! use roster::{Engine, EngineConfig, FieldRole, SearchRequest, SemanticHit};
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! engine.upsert_text("c-1", &[(FieldRole::Tags, "fantasy yandere")], 10_000)?;
//!
//! let semantic = SemanticHit::from_ordered(["c-1"]);
//! let page = engine.search(&SearchRequest::new("판타지 얀데레"), &semantic)?;
//! ```

pub mod binary;
pub mod build;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod index;
pub mod inverted;
pub mod scoring;
pub mod search;
pub mod synonyms;
pub mod testing;
pub mod tokenize;
pub mod types;
mod utils;

pub use config::{Bm25Params, EngineConfig, FieldMatch, FieldTables, PopularityParams, ScoreWeights};
pub use engine::{Engine, IndexStats};
pub use error::{EngineError, Result};
pub use fusion::{prepare_semantic, reciprocal_rank_fusion, FusedCandidate, RRF_K};
pub use index::{Generation, IndexManager};
pub use inverted::{LexicalHit, LexicalIndex};
pub use scoring::{final_score, parse_download_count, popularity_boost, KeywordScore, KeywordScorer};
pub use search::{Filters, SearchRequest};
pub use synonyms::SynonymTable;
pub use tokenize::Tokenizer;
pub use types::{
    ContentRating, ContributingScores, DocId, Document, DocumentBuilder, Field, FieldRole, Gender,
    Language, RankedHit, SearchResponse, SemanticHit,
};
pub use utils::normalize;
