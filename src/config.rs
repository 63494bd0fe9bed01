// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Engine configuration.
//!
//! Every tunable of the ranking function lives here, with `Default` carrying
//! the production tuning. Configs load from JSON; missing keys fall back to the
//! defaults, so a file only needs to name what it changes.
//!
//! # Default tuning
//!
//! ```text
//! BM25              k1 = 1.2   b = 0.75
//! RRF               k  = 60
//! Field weights     summary 0.8  tags 0.5  name 0.4  description 0.3  other 0.2
//! Lexical repeats   summary x3   tags x2   others x1
//! Popularity        min(1.0, log10(p + 10) / 10)
//! Final score       fusion-dominant-v2: 10.0*fusion + 0.3*keyword + 0.2*popularity
//! ```
//!
//! Field tables are declarative maps keyed by role. `validate` rejects a table
//! that omits a role, so adding a `FieldRole` variant without updating the
//! defaults fails at load time rather than scoring silently as zero.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::FieldRole;

// ============================================================================
// PARAMETER GROUPS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// `boost = min(cap, log10(popularity + offset) / divisor)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopularityParams {
    pub offset: f64,
    pub divisor: f64,
    pub cap: f64,
}

impl Default for PopularityParams {
    fn default() -> Self {
        Self {
            offset: 10.0,
            divisor: 10.0,
            cap: 1.0,
        }
    }
}

/// Named, versioned coefficients of the final score.
///
/// Changing a coefficient changes every ranking, so presets carry a version
/// suffix and custom weights carry whatever name the operator gives them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub name: String,
    pub fusion: f64,
    pub keyword: f64,
    pub popularity: f64,
}

impl ScoreWeights {
    pub const FUSION_DOMINANT: &'static str = "fusion-dominant-v2";
    pub const KEYWORD_DOMINANT: &'static str = "keyword-dominant-v1";

    /// Fusion scores sit around 0.03; the x10 lifts them to the same order as
    /// the keyword boost.
    pub fn fusion_dominant() -> Self {
        Self {
            name: Self::FUSION_DOMINANT.to_string(),
            fusion: 10.0,
            keyword: 0.3,
            popularity: 0.2,
        }
    }

    pub fn keyword_dominant() -> Self {
        Self {
            name: Self::KEYWORD_DOMINANT.to_string(),
            fusion: 1.0,
            keyword: 1.0,
            popularity: 0.1,
        }
    }

    pub fn preset(name: &str) -> Result<Self> {
        match name {
            Self::FUSION_DOMINANT | "fusion-dominant" => Ok(Self::fusion_dominant()),
            Self::KEYWORD_DOMINANT | "keyword-dominant" => Ok(Self::keyword_dominant()),
            other => Err(EngineError::Config(format!(
                "unknown score preset {:?} (expected {} or {})",
                other,
                Self::FUSION_DOMINANT,
                Self::KEYWORD_DOMINANT
            ))),
        }
    }

    pub fn custom(name: impl Into<String>, fusion: f64, keyword: f64, popularity: f64) -> Self {
        Self {
            name: name.into(),
            fusion,
            keyword,
            popularity,
        }
    }

    #[inline]
    pub fn combine(&self, fusion: f64, keyword: f64, popularity: f64) -> f64 {
        self.fusion * fusion + self.keyword * keyword + self.popularity * popularity
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::fusion_dominant()
    }
}

/// How the keyword scorer decides that a field contains a query term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMatch {
    /// Exact term equality against the field's tokens.
    #[default]
    Token,
    /// Query term occurs inside one of the field's tokens.
    Substring,
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bm25: Bm25Params,
    pub rrf_k: f64,
    pub field_weights: BTreeMap<FieldRole, f64>,
    pub lexical_repeats: BTreeMap<FieldRole, u32>,
    pub popularity: PopularityParams,
    pub score_weights: ScoreWeights,
    pub field_match: FieldMatch,
    /// Page size used when a request does not name one.
    pub default_limit: usize,
    /// Requested limits above this are clamped.
    pub max_limit: usize,
    /// Lexical pool is `max((offset + limit) * candidate_multiplier, min_candidate_pool)`.
    pub candidate_multiplier: usize,
    pub min_candidate_pool: usize,
    /// Semantic rankings longer than this are truncated.
    pub max_semantic_hits: usize,
    pub min_token_chars: usize,
    /// Extra synonym pairs merged over the bundled table.
    pub synonyms_path: Option<PathBuf>,
    /// Blank queries list filter-passing documents by popularity.
    pub browse_on_empty_query: bool,
    /// Brotli-compress sections when saving.
    pub compress_sections: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let field_weights = BTreeMap::from([
            (FieldRole::Summary, 0.8),
            (FieldRole::Tags, 0.5),
            (FieldRole::Name, 0.4),
            (FieldRole::Description, 0.3),
            (FieldRole::Other, 0.2),
        ]);
        let lexical_repeats = BTreeMap::from([
            (FieldRole::Summary, 3),
            (FieldRole::Tags, 2),
            (FieldRole::Name, 1),
            (FieldRole::Description, 1),
            (FieldRole::Other, 1),
        ]);
        Self {
            bm25: Bm25Params::default(),
            rrf_k: 60.0,
            field_weights,
            lexical_repeats,
            popularity: PopularityParams::default(),
            score_weights: ScoreWeights::default(),
            field_match: FieldMatch::Token,
            default_limit: 10,
            max_limit: 100,
            candidate_multiplier: 3,
            min_candidate_pool: 100,
            max_semantic_hits: 100,
            min_token_chars: 1,
            synonyms_path: None,
            browse_on_empty_query: true,
            compress_sections: false,
        }
    }
}

/// Per-role tables resolved from a validated config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTables {
    pub weights: [f64; FieldRole::COUNT],
    pub repeats: [u32; FieldRole::COUNT],
}

impl FieldTables {
    #[inline]
    pub fn weight(&self, role: FieldRole) -> f64 {
        self.weights[role.index()]
    }

    #[inline]
    pub fn repeat(&self, role: FieldRole) -> u32 {
        self.repeats[role.index()]
    }
}

impl Default for FieldTables {
    fn default() -> Self {
        // Default config always validates.
        EngineConfig::default()
            .field_tables()
            .unwrap_or(FieldTables {
                weights: [0.8, 0.5, 0.4, 0.3, 0.2],
                repeats: [3, 2, 1, 1, 1],
            })
    }
}

fn finite_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "{} must be finite and >= 0, got {}",
            name, value
        )))
    }
}

impl EngineConfig {
    /// Load a JSON config and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), preset = %config.score_weights.name, "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        finite_non_negative("bm25.k1", self.bm25.k1)?;
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(EngineError::Config(format!(
                "bm25.b must be within [0, 1], got {}",
                self.bm25.b
            )));
        }
        finite_non_negative("rrf_k", self.rrf_k)?;

        let p = &self.popularity;
        if !(p.offset.is_finite() && p.offset >= 1.0) {
            return Err(EngineError::Config(format!(
                "popularity.offset must be >= 1, got {}",
                p.offset
            )));
        }
        if !(p.divisor.is_finite() && p.divisor > 0.0) {
            return Err(EngineError::Config(format!(
                "popularity.divisor must be > 0, got {}",
                p.divisor
            )));
        }
        if !(p.cap.is_finite() && p.cap > 0.0) {
            return Err(EngineError::Config(format!(
                "popularity.cap must be > 0, got {}",
                p.cap
            )));
        }

        let w = &self.score_weights;
        finite_non_negative("score_weights.fusion", w.fusion)?;
        finite_non_negative("score_weights.keyword", w.keyword)?;
        finite_non_negative("score_weights.popularity", w.popularity)?;

        if self.max_limit == 0 {
            return Err(EngineError::Config("max_limit must be >= 1".into()));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(EngineError::Config(format!(
                "default_limit must be within 1..={}, got {}",
                self.max_limit, self.default_limit
            )));
        }
        if self.candidate_multiplier == 0 {
            return Err(EngineError::Config("candidate_multiplier must be >= 1".into()));
        }
        if self.max_semantic_hits == 0 {
            return Err(EngineError::Config("max_semantic_hits must be >= 1".into()));
        }
        if self.min_token_chars == 0 {
            return Err(EngineError::Config("min_token_chars must be >= 1".into()));
        }

        self.field_tables().map(|_| ())
    }

    /// Resolve the per-role tables, failing on any missing role.
    pub fn field_tables(&self) -> Result<FieldTables> {
        let mut weights = [0.0; FieldRole::COUNT];
        let mut repeats = [0u32; FieldRole::COUNT];
        for role in FieldRole::ALL {
            let weight = *self.field_weights.get(&role).ok_or_else(|| {
                EngineError::Config(format!("field_weights is missing role {:?}", role.as_str()))
            })?;
            finite_non_negative(&format!("field_weights.{}", role), weight)?;
            weights[role.index()] = weight;

            let repeat = *self.lexical_repeats.get(&role).ok_or_else(|| {
                EngineError::Config(format!(
                    "lexical_repeats is missing role {:?}",
                    role.as_str()
                ))
            })?;
            if repeat == 0 {
                return Err(EngineError::Config(format!(
                    "lexical_repeats.{} must be >= 1",
                    role
                )));
            }
            repeats[role.index()] = repeat;
        }
        Ok(FieldTables { weights, repeats })
    }

    /// Size of the lexical candidate pool for a page request.
    pub fn candidate_pool(&self, offset: usize, limit: usize) -> usize {
        offset
            .saturating_add(limit)
            .saturating_mul(self.candidate_multiplier)
            .max(self.min_candidate_pool)
    }
}
