// Path: crates/api/src/pending/clock.rs

//! A monotonic allocator of root-level tokens.

use hkv_types::error::TokenError;
use hkv_types::Token;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing root tokens to concurrent callers.
#[derive(Debug, Default)]
pub struct TokenClock {
    // The root of the next token to hand out.
    next: AtomicU64,
}

impl TokenClock {
    /// A clock whose first token is `Token::ZERO`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that resumes after `last`, e.g. after reloading from a durable store.
    pub fn starting_after(last: &Token) -> Result<Self, TokenError> {
        let next = last
            .root()
            .checked_add(1)
            .ok_or(TokenError::Overflow { depth: 0 })?;
        Ok(Self {
            next: AtomicU64::new(next),
        })
    }

    /// Allocates the next root token.
    pub fn next(&self) -> Result<Token, TokenError> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
            .map(Token::new)
            .map_err(|_| TokenError::Overflow { depth: 0 })
    }

    /// The most recently allocated token, if any.
    pub fn current(&self) -> Option<Token> {
        self.next
            .load(Ordering::Acquire)
            .checked_sub(1)
            .map(Token::new)
    }
}
