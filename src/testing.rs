//! Test utilities shared across unit tests, integration tests, benches and
//! fuzz targets.
//!
//! Always compiled but hidden from documentation.

#![doc(hidden)]

use crate::config::{EngineConfig, ScoreWeights};
use crate::engine::Engine;
use crate::error::Result;
use crate::tokenize::Tokenizer;
use crate::types::{ContentRating, Document, Field, FieldRole, Gender, Language};

/// Document with one field of already-normalized terms.
pub fn make_doc(id: &str, role: FieldRole, terms: &[&str], popularity: u64) -> Document {
    make_doc_fields(id, &[(role, terms)], popularity)
}

/// Document with several fields of already-normalized terms.
pub fn make_doc_fields(id: &str, fields: &[(FieldRole, &[&str])], popularity: u64) -> Document {
    let fields = fields
        .iter()
        .map(|(role, terms)| Field::new(*role, terms.iter().map(|t| t.to_string()).collect()))
        .collect();
    match Document::new(id, fields, popularity) {
        Ok(doc) => doc,
        Err(e) => panic!("test document {:?} is invalid: {}", id, e),
    }
}

/// Document from raw field text, tokenized with the default tokenizer.
pub fn text_doc(id: &str, fields: &[(FieldRole, &str)], popularity: u64) -> Document {
    let builder = fields
        .iter()
        .fold(Document::builder(id), |b, (role, text)| b.field(*role, *text));
    match builder.popularity(popularity).build(&Tokenizer::default()) {
        Ok(doc) => doc,
        Err(e) => panic!("test document {:?} is invalid: {}", id, e),
    }
}

/// The three-profile scenario: a bilingual query for "fantasy yandere"
/// should rank d2 (both terms in tags) over d1 (yandere in the summary)
/// over d3 (fantasy in the name).
pub fn three_profiles() -> Vec<Document> {
    vec![
        text_doc("d1", &[(FieldRole::Summary, "yandere school girl")], 100),
        text_doc("d2", &[(FieldRole::Tags, "fantasy yandere")], 10_000),
        text_doc("d3", &[(FieldRole::Name, "fantasy mage")], 0),
    ]
}

/// A small mixed-language corpus with attributes, ids sorted.
pub fn sample_corpus() -> Vec<Document> {
    let rows: [(&str, &str, &str, &str, u64, ContentRating, Gender, Language); 8] = [
        ("aria", "Aria", "엘프 궁수 소녀", "elf archer fantasy", 5_200, ContentRating::Sfw, Gender::Female, Language::Korean),
        ("brin", "Brin", "떠돌이 기사", "knight fantasy", 830, ContentRating::Sfw, Gender::Male, Language::Korean),
        ("chiyo", "千代", "学校の先生", "teacher school", 12_000, ContentRating::Sfw, Gender::Female, Language::Japanese),
        ("dara", "Dara", "yandere classmate", "yandere school romance", 40_000, ContentRating::Nsfw, Gender::Female, Language::English),
        ("eun", "은하", "우주 해적 선장", "pirate scifi", 150, ContentRating::Sfw, Gender::Female, Language::Korean),
        ("finn", "Finn", "vampire noble", "vampire horror", 2_400, ContentRating::Nsfw, Gender::Male, Language::English),
        ("gyeol", "결", "츤데레 소꿉친구", "tsundere romance", 9_100, ContentRating::Sfw, Gender::Female, Language::Korean),
        ("haru", "Haru & Aki", "twin mages", "fantasy mage twins", 600, ContentRating::Sfw, Gender::Multiple, Language::Multilingual),
    ];
    rows.iter()
        .map(|(id, name, summary, tags, pop, rating, gender, language)| {
            text_doc(
                id,
                &[
                    (FieldRole::Name, *name),
                    (FieldRole::Summary, *summary),
                    (FieldRole::Tags, *tags),
                ],
                *pop,
            )
            .with_rating(*rating)
            .with_gender(*gender)
            .with_language(*language)
        })
        .collect()
}

/// Engine with default config over `docs`.
pub fn engine_with(docs: Vec<Document>) -> Result<Engine> {
    engine_with_weights(docs, ScoreWeights::default())
}

pub fn engine_with_weights(docs: Vec<Document>, weights: ScoreWeights) -> Result<Engine> {
    let config = EngineConfig {
        score_weights: weights,
        ..EngineConfig::default()
    };
    let engine = Engine::new(config)?;
    engine.rebuild(docs)?;
    Ok(engine)
}
