// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions and command handlers for the roster binary.
//!
//! `index` builds a `.rstr` file from a JSONL catalog, `search` ranks a query
//! against one (optionally fused with a semantic ranking read from JSON),
//! `inspect` prints the file layout, and `upsert` / `remove` edit a persisted
//! index in place through the same generation machinery the library uses.

pub mod display;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use roster::binary::{read_header, verify_checksum, RosterFooter, RosterHeader};
use roster::build::{load_catalog, run_index};
use roster::{Engine, EngineConfig, ScoreWeights, SearchRequest, SearchResponse, SemanticHit};

use display::*;

#[derive(Parser)]
#[command(
    name = "roster",
    about = "Hybrid lexical + semantic ranking for character profiles",
    version
)]
pub struct Cli {
    /// Engine configuration (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a JSONL catalog
    Index {
        /// Catalog file, one record per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output .rstr file
        #[arg(short, long)]
        output: PathBuf,

        /// Brotli-compress the index sections
        #[arg(long)]
        compress: bool,
    },

    /// Rank a query against an index
    Search {
        /// Path to .rstr file
        file: PathBuf,

        /// Query text; empty lists profiles by popularity
        #[arg(default_value = "")]
        query: String,

        /// Semantic ranking: JSON array of ids in rank order, or of {id, rank}
        #[arg(long)]
        semantic: Option<PathBuf>,

        /// Content rating filter (repeatable; "all" for none)
        #[arg(long = "rating")]
        ratings: Vec<String>,

        /// Gender filter (repeatable)
        #[arg(long = "gender")]
        genders: Vec<String>,

        /// Language filter (repeatable)
        #[arg(long = "language")]
        languages: Vec<String>,

        #[arg(short, long)]
        limit: Option<i64>,

        #[arg(long, default_value = "0")]
        offset: i64,

        /// Score preset name (fusion-dominant-v2, keyword-dominant-v1)
        #[arg(long)]
        preset: Option<String>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect a .rstr file
    Inspect {
        /// Path to .rstr file
        file: PathBuf,
    },

    /// Insert or replace the records of a JSONL catalog in an index
    Upsert {
        /// Path to .rstr file (created when missing)
        file: PathBuf,

        /// Catalog file with the records to apply
        records: PathBuf,
    },

    /// Remove documents by id
    Remove {
        /// Path to .rstr file
        file: PathBuf,

        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Semantic ranking file shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum SemanticFile {
    Ranked(Vec<SemanticHit>),
    Ordered(Vec<String>),
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Index {
            input,
            output,
            compress,
        } => cmd_index(&input, &output, compress, config),
        Commands::Search {
            file,
            query,
            semantic,
            ratings,
            genders,
            languages,
            limit,
            offset,
            preset,
            json,
        } => {
            let request = SearchRequest::from_params(&query, offset, limit, &ratings, &genders, &languages)?;
            let mut config = config;
            if let Some(name) = preset {
                config.score_weights = ScoreWeights::preset(&name)?;
            }
            cmd_search(&file, &request, semantic.as_deref(), config, json)
        }
        Commands::Inspect { file } => cmd_inspect(&file),
        Commands::Upsert { file, records } => cmd_upsert(&file, &records, config),
        Commands::Remove { file, ids } => cmd_remove(&file, &ids, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_index(input: &Path, output: &Path, compress: bool, mut config: EngineConfig) -> Result<()> {
    config.compress_sections |= compress;
    let summary = run_index(input, output, config)
        .with_context(|| format!("indexing {}", input.display()))?;

    eprintln!();
    eprintln!("✅ Index built");
    eprintln!(
        "   {} documents │ {} skipped │ {} terms │ {} │ generation {}",
        summary.documents,
        summary.skipped,
        summary.terms,
        format_size(summary.bytes),
        summary.generation
    );
    Ok(())
}

fn read_semantic(path: &Path) -> Result<Vec<SemanticHit>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: SemanticFile =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(match file {
        SemanticFile::Ranked(hits) => hits,
        SemanticFile::Ordered(ids) => SemanticHit::from_ordered(ids),
    })
}

fn cmd_search(
    file: &Path,
    request: &SearchRequest,
    semantic: Option<&Path>,
    config: EngineConfig,
    json: bool,
) -> Result<()> {
    let semantic = semantic.map(read_semantic).transpose()?.unwrap_or_default();
    let engine = Engine::open(file, config).with_context(|| format!("opening {}", file.display()))?;
    let response = engine.search(request, &semantic)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    print_results(&engine, request, &response);
    Ok(())
}

fn print_results(engine: &Engine, request: &SearchRequest, response: &SearchResponse) {
    let generation = engine.snapshot();
    let label = if request.query.trim().is_empty() {
        "BROWSE".to_string()
    } else {
        format!("\"{}\"", truncate_cells(&request.query, 40))
    };
    section_top(&label);
    row(&format!(
        "  {} of {} results │ offset {} │ generation {} │ preset {}",
        response.results.len(),
        response.total,
        request.offset,
        response.generation,
        engine.config().score_weights.name
    ));
    section_mid("RESULTS");
    if response.results.is_empty() {
        row(&themed(GRAY, &[], "  no matches"));
    }
    for (i, hit) in response.results.iter().enumerate() {
        let rating = generation
            .document(&hit.id)
            .map(|d| d.rating.as_str())
            .unwrap_or("unknown");
        row(&format!(
            "  {} {} {} {} │ f {:.4} k {:.3} p {:.3}",
            pad_left(&(request.offset + i + 1).to_string(), 3),
            score_value(hit.final_score),
            pad_right(&truncate_cells(&hit.id, 24), 24),
            rating_badge(rating),
            hit.scores.fusion,
            hit.scores.keyword,
            hit.scores.popularity,
        ));
        row(&format!("      {}", rank_badge(hit.scores.lexical_rank, hit.scores.semantic_rank)));
    }
    section_bot();
}

fn cmd_inspect(file: &Path) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let header: RosterHeader = read_header(&bytes)?;
    let checksum = verify_checksum(&bytes);

    banner(&file.display().to_string());
    section_top("HEADER");
    row(&format!("  version      {}", header.version));
    row(&format!(
        "  compression  {}",
        if header.flags.has_brotli() { "brotli" } else { "none" }
    ));
    row(&format!("  generation   {}", header.generation));
    row(&format!(
        "  documents    {} live / {} slots",
        header.doc_count, header.slot_count
    ));
    row(&format!("  terms        {}", header.term_count));
    section_mid("SECTIONS");
    row(&format!("  header       {:>10}", format_size(RosterHeader::SIZE as u64)));
    row(&format!("  docs         {:>10}", format_size(u64::from(header.docs_len))));
    row(&format!("  postings     {:>10}", format_size(u64::from(header.postings_len))));
    row(&format!("  footer       {:>10}", format_size(RosterFooter::SIZE as u64)));
    row(&format!("  total        {:>10}", format_size(bytes.len() as u64)));
    section_mid("INTEGRITY");
    match &checksum {
        Ok(()) => row(&format!("  crc32        {}", themed(GREEN, &[BOLD], "ok"))),
        Err(e) => row(&format!("  crc32        {}", themed(RED, &[BOLD], &e.to_string()))),
    }
    section_bot();

    if let Err(e) = checksum {
        bail!("{}: {}", file.display(), e);
    }
    Ok(())
}

fn cmd_upsert(file: &Path, records: &Path, config: EngineConfig) -> Result<()> {
    let engine = if file.exists() {
        Engine::open(file, config).with_context(|| format!("opening {}", file.display()))?
    } else {
        Engine::new(config)?
    };
    let load = load_catalog(records, engine.tokenizer())
        .with_context(|| format!("reading {}", records.display()))?;
    let count = load.documents.len();
    let generation = engine.upsert_batch(load.documents)?;
    engine.save(file)?;
    eprintln!(
        "✅ Upserted {} documents ({} skipped) │ generation {}",
        count,
        load.skipped.len(),
        generation
    );
    Ok(())
}

fn cmd_remove(file: &Path, ids: &[String], config: EngineConfig) -> Result<()> {
    let engine = Engine::open(file, config).with_context(|| format!("opening {}", file.display()))?;
    let mut removed = 0usize;
    for id in ids {
        if engine.remove(id)? {
            removed += 1;
        } else {
            eprintln!("⚠️  {} not in index", id);
        }
    }
    if removed > 0 {
        engine.save(file)?;
    }
    eprintln!("✅ Removed {} of {} │ generation {}", removed, ids.len(), engine.stats().generation);
    Ok(())
}
