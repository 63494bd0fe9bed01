// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the ranking engine.
//!
//! Three kinds matter to callers:
//!
//! | Variant              | Caller action                                  |
//! |----------------------|------------------------------------------------|
//! | `InvalidInput`       | Reject the request; nothing was touched        |
//! | `IndexUnavailable`   | Retry later; another mutation holds the gate   |
//! | `CorruptIndexState`  | Force a rebuild from the document store        |
//!
//! A missing semantic ranking is not an error. The query pipeline degrades to
//! lexical-only fusion and logs it at debug level.

use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed query parameters, documents, or semantic hits.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A mutation is already in progress.
    #[error("index unavailable: a mutation is already in progress")]
    IndexUnavailable,

    /// The lexical index violates one of its structural invariants.
    #[error("corrupt index state: {0}")]
    CorruptIndexState(String),

    /// Malformed persisted bytes (bad magic, truncated section, CRC mismatch).
    #[error("format error: {0}")]
    Format(String),

    /// Configuration failed validation or could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptIndexState(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// True when a rebuild from stored documents is the right recovery.
    pub fn needs_rebuild(&self) -> bool {
        matches!(self, Self::CorruptIndexState(_) | Self::Format(_))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidInput(format!("json: {}", e))
    }
}
