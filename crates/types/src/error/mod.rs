// Path: crates/types/src/error/mod.rs
//! Core error types for the hkv workspace.

use crate::token::Token;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised while deriving or parsing tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The innermost counter (or the chain depth) is exhausted. This is a
    /// structural limit of the token chain and is not recoverable.
    #[error("Token counter exhausted at depth {depth}")]
    Overflow {
        /// The nesting depth whose counter overflowed.
        depth: usize,
    },
    /// The textual form of a token could not be parsed.
    #[error("Malformed token: '{0}'")]
    Parse(String),
}

impl ErrorCode for TokenError {
    fn code(&self) -> &'static str {
        match self {
            Self::Overflow { .. } => "TOKEN_OVERFLOW",
            Self::Parse(_) => "TOKEN_PARSE_FAILED",
        }
    }
}

/// Errors surfaced by byte-sequence implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ByteSeqError {
    /// The implementation does not provide the requested capability.
    #[error("Byte sequence '{kind}' does not support {capability}")]
    Unsupported {
        /// A short name of the implementation.
        kind: &'static str,
        /// The capability that was requested (e.g. "copy").
        capability: &'static str,
    },
    /// A slice range fell outside the sequence.
    #[error("Range {start}..{end} out of bounds for length {len}")]
    OutOfBounds {
        /// Requested start offset.
        start: usize,
        /// Requested end offset (exclusive).
        end: usize,
        /// Length of the sequence.
        len: usize,
    },
}

impl ErrorCode for ByteSeqError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unsupported { .. } => "BYTES_UNSUPPORTED",
            Self::OutOfBounds { .. } => "BYTES_OUT_OF_BOUNDS",
        }
    }
}

/// Errors surfaced across the boundary of a key/value or history store.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The version visible at `requested` has already been collected: the
    /// oldest version still retained for the key is newer than the request.
    #[error("Expired read of key '{}' at {requested}: oldest retained version is {oldest}", String::from_utf8_lossy(.key))]
    ExpiredRead {
        /// The (fully qualified) key that was read.
        key: Vec<u8>,
        /// The token the caller asked for.
        requested: Token,
        /// The oldest token still retained for the key.
        oldest: Token,
    },
    /// Deriving a token failed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    /// A collaborator does not provide a required capability.
    #[error("Unsupported capability: {0}")]
    Unsupported(String),
    /// The store configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// An internal resource of the store could not be acquired.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<ByteSeqError> for HistoryError {
    fn from(e: ByteSeqError) -> Self {
        Self::Unsupported(e.to_string())
    }
}

impl ErrorCode for HistoryError {
    fn code(&self) -> &'static str {
        match self {
            Self::ExpiredRead { .. } => "HISTORY_EXPIRED_READ",
            Self::Token(e) => e.code(),
            Self::Unsupported(_) => "HISTORY_UNSUPPORTED",
            Self::InvalidConfig(_) => "HISTORY_INVALID_CONFIG",
            Self::Backend(_) => "HISTORY_BACKEND_ERROR",
        }
    }
}

impl HistoryError {
    /// Whether the caller can recover by retrying with a fresher token.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExpiredRead { .. })
    }
}
