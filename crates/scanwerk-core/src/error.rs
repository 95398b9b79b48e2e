// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Geometry --
    #[error("linear system is singular: corner configuration is degenerate")]
    SingularSystem,

    // -- Image codec --
    #[error("image decode failed: {0}")]
    DecodeFailure(String),

    #[error("image encode failed: {0}")]
    EncodeFailure(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    // -- Caller preconditions --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -- Storage / persistence (callers only) --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
