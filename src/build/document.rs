// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Catalog records as the scraper and tagger emit them, one JSON object per
//! line, and their mapping onto indexable fields.
//!
//! | Record field                          | Role          |
//! |---------------------------------------|---------------|
//! | `name`                                | Name          |
//! | `llm_tags.summary`                    | Summary       |
//! | `tags[]`                              | Tags          |
//! | `llm_tags.description`                | Description   |
//! | `authorname`, `llm_tags.source[]`, `desc` (first 500 chars) | Other |
//! | `llm_tags.genres[]`, `llm_tags.character_traits[]` | Other   |

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scoring::parse_download_count;
use crate::tokenize::Tokenizer;
use crate::types::{ContentRating, Document, FieldRole};
use crate::utils::truncate_chars;

/// Only this much of the free-form description is indexed.
pub const DESC_INDEX_CHARS: usize = 500;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct CatalogRecord {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub authorname: String,
    #[serde(default)]
    pub desc: String,
    /// Display counter such as `"12.3k"`; some exports write a bare number.
    #[serde(default)]
    pub download: DownloadCount,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Catalog-side adult flag, used when the tagger gave no rating.
    #[serde(default)]
    pub nsfw: Option<bool>,
    #[serde(default)]
    pub llm_tags: Option<LlmTags>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum DownloadCount {
    Number(u64),
    Text(String),
}

impl Default for DownloadCount {
    fn default() -> Self {
        DownloadCount::Number(0)
    }
}

impl DownloadCount {
    pub fn value(&self) -> u64 {
        match self {
            DownloadCount::Number(n) => *n,
            DownloadCount::Text(s) => parse_download_count(s),
        }
    }
}

/// Tagger output attached to a record.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct LlmTags {
    pub content_rating: Option<String>,
    pub character_gender: Option<String>,
    pub language: Option<String>,
    pub summary: String,
    pub description: String,
    pub source: Sources,
    /// Free-form genre labels such as `dark_fantasy` or `isekai`.
    pub genres: Vec<String>,
    pub character_traits: Vec<String>,
}

/// `source` is a list of titles, a single title, or absent.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Sources {
    Many(Vec<String>),
    One(String),
}

impl Default for Sources {
    fn default() -> Self {
        Sources::Many(Vec::new())
    }
}

impl Sources {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Sources::Many(v) => v,
            Sources::One(s) => std::slice::from_ref(s),
        };
        items.iter().map(String::as_str).filter(|s| !s.trim().is_empty())
    }
}

impl CatalogRecord {
    pub fn to_document(&self, tokenizer: &Tokenizer) -> Result<Document> {
        let tags = self.llm_tags.clone().unwrap_or_default();

        let mut other = Vec::with_capacity(3 + tags.genres.len() + tags.character_traits.len());
        if !self.authorname.trim().is_empty() {
            other.push(self.authorname.as_str());
        }
        other.extend(tags.source.iter());
        other.extend(tags.genres.iter().map(String::as_str));
        other.extend(tags.character_traits.iter().map(String::as_str));
        other.push(truncate_chars(&self.desc, DESC_INDEX_CHARS));

        let mut builder = Document::builder(self.uuid.trim())
            .field(FieldRole::Name, self.name.as_str())
            .field(FieldRole::Summary, tags.summary.as_str())
            .field(FieldRole::Description, tags.description.as_str())
            .field(FieldRole::Other, other.join(" "))
            .popularity(self.download.value())
            .rating(self.rating(&tags))
            .gender(lenient(tags.character_gender.as_deref()))
            .language(lenient(tags.language.as_deref()));
        for tag in &self.tags {
            builder = builder.field(FieldRole::Tags, tag.as_str());
        }
        builder.build(tokenizer)
    }

    fn rating(&self, tags: &LlmTags) -> ContentRating {
        match lenient(tags.content_rating.as_deref()) {
            ContentRating::Unknown => match self.nsfw {
                Some(true) => ContentRating::Nsfw,
                Some(false) => ContentRating::Sfw,
                None => ContentRating::Unknown,
            },
            known => known,
        }
    }
}

/// Parse a tagger attribute; anything unrecognized becomes `Unknown`.
fn lenient<T>(value: Option<&str>) -> T
where
    T: std::str::FromStr + Default,
{
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}
