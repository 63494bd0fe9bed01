// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Logarithmic popularity boost.
//!
//! ```text
//! boost = min(cap, log10(popularity + offset) / divisor)
//! ```
//!
//! With the defaults (offset 10, divisor 10, cap 1.0) an unused profile gets
//! 0.1 and the boost only reaches the cap at ten billion uses. The log keeps a
//! viral profile from burying a relevant obscure one.

use crate::config::PopularityParams;

/// Popularity boost for a raw usage count.
///
/// Finite and non-negative for every `u64` given validated params
/// (`offset >= 1`, `divisor > 0`).
#[inline]
pub fn popularity_boost(popularity: u64, params: &PopularityParams) -> f64 {
    ((popularity as f64 + params.offset).log10() / params.divisor).min(params.cap)
}

/// Parse a catalog download counter such as `"623.9k"`, `"1.2M"` or `"1,234"`.
///
/// Unparseable or negative input yields 0.
pub fn parse_download_count(raw: &str) -> u64 {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();

    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix('k') {
        (n, 1e3)
    } else if let Some(n) = cleaned.strip_suffix('m') {
        (n, 1e6)
    } else if let Some(n) = cleaned.strip_suffix('b') {
        (n, 1e9)
    } else {
        (cleaned.as_str(), 1.0)
    };

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            let scaled = (value * multiplier).round();
            if scaled >= u64::MAX as f64 {
                u64::MAX
            } else {
                scaled as u64
            }
        }
        _ => 0,
    }
}
