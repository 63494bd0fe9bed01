// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring and ranking: how fused candidates get their numbers.
//!
//! Three signals feed the final score:
//!
//! | Signal     | Source                 | Typical range |
//! |------------|------------------------|---------------|
//! | fusion     | RRF over two rankings  | 0 .. 2/(k+1)  |
//! | keyword    | field-weighted matches | 0 .. 2.2·n    |
//! | popularity | log10 of usage count   | 0 .. 1        |
//!
//! Their coefficients come from a named `ScoreWeights` preset. Every component
//! enters with a non-negative coefficient, so raising any one of them never
//! lowers a candidate's final score.

pub mod keyword;
pub mod popularity;
pub mod ranking;

pub use keyword::{KeywordScore, KeywordScorer};
pub use popularity::{parse_download_count, popularity_boost};
pub use ranking::{compare_hits, final_score};
