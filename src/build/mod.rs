// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Catalog ingestion: JSONL records to documents to a persisted index.

pub mod document;
pub mod parallel;

use std::fs;
use std::path::Path;

#[cfg(feature = "parallel")]
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::tokenize::Tokenizer;
use crate::types::Document;

pub use document::*;
pub use parallel::*;

/// Documents parsed from a catalog plus the lines that were rejected.
#[derive(Debug)]
pub struct CatalogLoad {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedLine>,
}

/// Outcome of `run_index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildSummary {
    pub generation: u64,
    pub documents: usize,
    pub skipped: usize,
    pub terms: usize,
    pub bytes: u64,
}

#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

/// Read a JSONL catalog. Malformed or empty records are skipped and logged.
pub fn load_catalog(path: impl AsRef<Path>, tokenizer: &Tokenizer) -> Result<CatalogLoad> {
    #[cfg(feature = "parallel")]
    let pb = ProgressBar::hidden();
    load_catalog_inner(
        path.as_ref(),
        tokenizer,
        #[cfg(feature = "parallel")]
        &pb,
    )
}

fn load_catalog_inner(
    path: &Path,
    tokenizer: &Tokenizer,
    #[cfg(feature = "parallel")] pb: &ProgressBar,
) -> Result<CatalogLoad> {
    let raw = fs::read_to_string(path)?;
    let lines: Vec<&str> = raw.lines().collect();

    #[cfg(feature = "parallel")]
    pb.set_length(lines.len() as u64);

    let (documents, skipped) = parse_lines_with_progress(
        &lines,
        tokenizer,
        #[cfg(feature = "parallel")]
        pb,
    );
    for skip in &skipped {
        tracing::warn!(path = %path.display(), line = skip.line, error = %skip.error, "skipped catalog record");
    }
    tracing::info!(
        path = %path.display(),
        documents = documents.len(),
        skipped = skipped.len(),
        "loaded catalog"
    );
    Ok(CatalogLoad { documents, skipped })
}

/// Build an index from a catalog file and write it to `output`.
pub fn run_index(input: &Path, output: &Path, config: EngineConfig) -> Result<BuildSummary> {
    #[cfg(feature = "parallel")]
    let multi = MultiProgress::new();

    let engine = Engine::new(config)?;

    // 1. Parse records in parallel
    #[cfg(feature = "parallel")]
    let load_pb = multi.add(ProgressBar::new(0));
    #[cfg(feature = "parallel")]
    load_pb.set_style(create_progress_style());
    #[cfg(feature = "parallel")]
    load_pb.set_prefix("Parsing");

    let load = load_catalog_inner(
        input,
        engine.tokenizer(),
        #[cfg(feature = "parallel")]
        &load_pb,
    )?;

    #[cfg(feature = "parallel")]
    load_pb.finish_with_message(format!("{} records", load.documents.len()));

    // 2. Build one generation
    #[cfg(feature = "parallel")]
    let build_pb = multi.add(ProgressBar::new_spinner());
    #[cfg(feature = "parallel")]
    build_pb.set_prefix("Indexing");

    let documents = load.documents.len();
    let generation = engine.rebuild(load.documents)?;

    #[cfg(feature = "parallel")]
    build_pb.finish_with_message(format!("generation {}", generation));

    // 3. Persist
    engine.save(output)?;
    let bytes = fs::metadata(output)?.len();
    let stats = engine.stats();

    Ok(BuildSummary {
        generation,
        documents,
        skipped: load.skipped.len(),
        terms: stats.terms,
        bytes,
    })
}
