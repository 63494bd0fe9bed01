// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a ranked query.
//!
//! Documents arrive with their text already split into typed fields. Only the
//! normalized terms survive; the engine never stores raw profile text.
//!
//! # Invariants
//!
//! - **Document**: non-empty `id` and at least one field with at least one term.
//!   `Document::new` enforces both; there is no other public constructor.
//!
//! - **SemanticHit**: `rank >= 1`. Ranks are 1-based so a hit at rank 1
//!   contributes `1/(k+1)` to the fused score.
//!
//! - **RankedHit**: `final_score` is the weighted sum of the three entries in
//!   `scores`. The breakdown exists so callers can explain a ranking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::tokenize::Tokenizer;

// =============================================================================
// NEWTYPES
// =============================================================================

/// Dense internal document slot.
///
/// External ids are strings; postings store this 4-byte slot instead. Slots
/// are reused when a document is re-upserted and left vacant on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DocId(pub u32);

impl DocId {
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

// =============================================================================
// FIELD ROLES
// =============================================================================

/// Semantic role of a profile field.
///
/// Role decides two things: how many times the field is repeated in the BM25
/// document (see `EngineConfig::lexical_repeats`) and how much a query term
/// found there contributes to the keyword boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Summary,
    Tags,
    Name,
    Description,
    Other,
}

impl FieldRole {
    pub const COUNT: usize = 5;

    pub const ALL: [FieldRole; Self::COUNT] = [
        FieldRole::Summary,
        FieldRole::Tags,
        FieldRole::Name,
        FieldRole::Description,
        FieldRole::Other,
    ];

    /// Position in per-role tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Summary => "summary",
            FieldRole::Tags => "tags",
            FieldRole::Name => "name",
            FieldRole::Description => "description",
            FieldRole::Other => "other",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed field of a profile, as normalized terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub role: FieldRole,
    pub terms: Vec<String>,
}

impl Field {
    pub fn new(role: FieldRole, terms: Vec<String>) -> Self {
        Self { role, terms }
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}

/// `term` tokenizes to itself and nothing else.
fn is_index_term(term: &str) -> bool {
    let tokens = Tokenizer::default().tokenize(term);
    tokens.len() == 1 && tokens[0] == term
}

// =============================================================================
// CATEGORICAL ATTRIBUTES
// =============================================================================

/// Categorical attribute with a fixed, lowercase wire vocabulary.
///
/// Each variant has a stable code used by the persisted format; codes are
/// never reused across variants.
macro_rules! attribute_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal = $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant,)+
            #[default]
            Unknown,
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+ $name::Unknown];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Unknown => "unknown",
                }
            }

            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code,)+
                    $name::Unknown => 0,
                }
            }

            pub fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    0 => Some($name::Unknown),
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self> {
                let lowered = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == lowered)
                    .ok_or_else(|| {
                        EngineError::invalid(format!(
                            "unknown {} value {:?}",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

attribute_enum! {
    /// Content rating of a profile.
    ContentRating {
        Sfw => "sfw" = 1,
        Nsfw => "nsfw" = 2,
    }
}

attribute_enum! {
    /// Gender of the character a profile describes.
    Gender {
        Female => "female" = 1,
        Male => "male" = 2,
        Multiple => "multiple" = 3,
        Other => "other" = 4,
    }
}

attribute_enum! {
    /// Primary language of the profile text.
    Language {
        Korean => "korean" = 1,
        English => "english" = 2,
        Japanese => "japanese" = 3,
        Multilingual => "multilingual" = 4,
        Other => "other" = 5,
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// A searchable character profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Vec<Field>,
    pub popularity: u64,
    #[serde(default)]
    pub rating: ContentRating,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub language: Language,
}

impl Document {
    /// Create a document, rejecting empty ids and profiles with no terms.
    ///
    /// Fields with no terms are dropped.
    pub fn new(id: impl Into<String>, fields: Vec<Field>, popularity: u64) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EngineError::invalid("document id must not be empty"));
        }
        let fields: Vec<Field> = fields.into_iter().filter(|f| !f.terms.is_empty()).collect();
        if fields.is_empty() {
            return Err(EngineError::invalid(format!(
                "document {:?} has no non-empty field",
                id
            )));
        }
        Ok(Self {
            id,
            fields,
            popularity,
            rating: ContentRating::Unknown,
            gender: Gender::Unknown,
            language: Language::Unknown,
        })
    }

    /// Re-check the constructor invariants, and that every term is exactly
    /// what the tokenizer would emit for it. A term like `"Aria"` or
    /// `"demon lord"` could never match a query.
    ///
    /// Fields are public and documents also arrive through serde, so the
    /// index re-validates before accepting one.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::invalid("document id must not be empty"));
        }
        if self.fields.iter().all(|f| f.terms.is_empty()) {
            return Err(EngineError::invalid(format!(
                "document {:?} has no non-empty field",
                self.id
            )));
        }
        if self.terms().any(str::is_empty) {
            return Err(EngineError::invalid(format!(
                "document {:?} contains an empty term",
                self.id
            )));
        }
        if let Some(term) = self.terms().find(|t| !is_index_term(t)) {
            return Err(EngineError::invalid(format!(
                "document {:?} term {:?} is not a normalized single token",
                self.id, term
            )));
        }
        Ok(())
    }

    /// Start building a document from raw field text.
    pub fn builder(id: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(id)
    }

    pub fn with_rating(mut self, rating: ContentRating) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Every term of every field, in field order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .flat_map(|f| f.terms.iter().map(String::as_str))
    }

    /// Fields with the given role (a profile may carry several).
    pub fn fields_with_role(&self, role: FieldRole) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.role == role)
    }

    /// Total term count across fields, before lexical repetition.
    pub fn term_count(&self) -> usize {
        self.fields.iter().map(|f| f.terms.len()).sum()
    }
}

/// Builds a [`Document`] from raw field text via a [`Tokenizer`].
///
/// ```ignore
/// let doc = Document::builder("c-1")
///     .field(FieldRole::Name, "Aria")
///     .field(FieldRole::Summary, "얀데레 fantasy heroine")
///     .popularity(1200)
///     .build(&tokenizer)?;
/// ```
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    id: String,
    fields: Vec<(FieldRole, String)>,
    popularity: u64,
    rating: ContentRating,
    gender: Gender,
    language: Language,
}

impl DocumentBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            popularity: 0,
            rating: ContentRating::Unknown,
            gender: Gender::Unknown,
            language: Language::Unknown,
        }
    }

    pub fn field(mut self, role: FieldRole, text: impl Into<String>) -> Self {
        self.fields.push((role, text.into()));
        self
    }

    pub fn popularity(mut self, popularity: u64) -> Self {
        self.popularity = popularity;
        self
    }

    pub fn rating(mut self, rating: ContentRating) -> Self {
        self.rating = rating;
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn build(self, tokenizer: &Tokenizer) -> Result<Document> {
        let fields = self
            .fields
            .iter()
            .map(|(role, text)| Field::new(*role, tokenizer.tokenize(text)))
            .collect();
        Ok(Document::new(self.id, fields, self.popularity)?
            .with_rating(self.rating)
            .with_gender(self.gender)
            .with_language(self.language))
    }
}

// =============================================================================
// QUERY-SIDE TYPES
// =============================================================================

/// One entry of the externally computed semantic ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticHit {
    pub id: String,
    /// 1-based rank within the semantic ranking.
    pub rank: usize,
}

impl SemanticHit {
    pub fn new(id: impl Into<String>, rank: usize) -> Self {
        Self { id: id.into(), rank }
    }

    /// Build hits from ids in ranked order (first id gets rank 1).
    pub fn from_ordered<I, S>(ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| Self::new(id, i + 1))
            .collect()
    }
}

/// Per-component scores behind a ranked result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContributingScores {
    pub fusion: f64,
    pub keyword: f64,
    pub popularity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical_rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_rank: Option<usize>,
}

/// One row of a result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    pub id: String,
    pub final_score: f64,
    pub scores: ContributingScores,
}

/// A result page plus the post-filter candidate count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<RankedHit>,
    /// Candidates that passed filtering, before pagination.
    pub total: usize,
    /// Generation the query ran against.
    pub generation: u64,
}

impl SearchResponse {
    pub fn empty(generation: u64) -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            generation,
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.id.as_str()).collect()
    }
}
