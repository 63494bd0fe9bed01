// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Parallel record parsing.
//!
//! Parsing and tokenizing catalog lines dominates index construction, and
//! every line is independent. Rayon spreads the lines over all cores; the
//! progress bar is shared and bumped from every worker.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;

use crate::error::{EngineError, Result};
use crate::tokenize::Tokenizer;
use crate::types::Document;

use super::CatalogRecord;

/// A line that could not be turned into a document.
#[derive(Debug)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub error: EngineError,
}

/// Parse one JSONL line into a document.
pub fn parse_line(line: &str, tokenizer: &Tokenizer) -> Result<Document> {
    let record: CatalogRecord = serde_json::from_str(line)?;
    record.to_document(tokenizer)
}

/// Parse non-blank lines, preserving input order among successes.
pub fn parse_lines_with_progress(
    lines: &[&str],
    tokenizer: &Tokenizer,
    #[cfg(feature = "parallel")] pb: &ProgressBar,
) -> (Vec<Document>, Vec<SkippedLine>) {
    let parse = |(i, line): (usize, &&str)| {
        let result = if line.trim().is_empty() {
            None
        } else {
            Some(parse_line(line, tokenizer).map_err(|error| SkippedLine { line: i + 1, error }))
        };
        #[cfg(feature = "parallel")]
        pb.inc(1);
        result
    };

    #[cfg(feature = "parallel")]
    let results: Vec<Option<std::result::Result<Document, SkippedLine>>> =
        lines.par_iter().enumerate().map(parse).collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Option<std::result::Result<Document, SkippedLine>>> =
        lines.iter().enumerate().map(parse).collect();

    let mut documents = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for result in results.into_iter().flatten() {
        match result {
            Ok(doc) => documents.push(doc),
            Err(skip) => skipped.push(skip),
        }
    }
    (documents, skipped)
}
