// Path: crates/types/src/token.rs
//! The hierarchical logical clock used to stamp every version in the store.
//!
//! A `Token` is a root counter plus an optional chain of nested indices. Tokens
//! compare by root first; within equal roots a token with a chain is greater
//! than one without, and chains compare element by element with the deeper
//! chain winning when one is a strict prefix of the other.
//!
//! ```text
//!   3  <  3.0  <  3.0.0  <  3.0.1  <  3.1  <  4
//! ```

use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The deepest chain a token may carry.
pub const MAX_DEPTH: usize = 255;

/// An immutable, totally ordered logical timestamp with nested scopes.
///
/// The field order matters: the derived `Ord` compares `root` and then the
/// chain lexicographically, where an empty chain sorts first and a strict
/// prefix sorts before its extensions.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawToken")]
pub struct Token {
    root: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    chain: Vec<u32>,
}

/// The wire shape of a [`Token`], checked by [`Token::with_chain`].
#[derive(Deserialize)]
struct RawToken {
    root: u64,
    #[serde(default)]
    chain: Vec<u32>,
}

impl TryFrom<RawToken> for Token {
    type Error = TokenError;

    fn try_from(raw: RawToken) -> Result<Self, Self::Error> {
        Token::with_chain(raw.root, raw.chain)
    }
}

impl Token {
    /// The first root token.
    pub const ZERO: Token = Token {
        root: 0,
        chain: Vec::new(),
    };

    /// Creates a root-level token.
    pub const fn new(root: u64) -> Self {
        Self {
            root,
            chain: Vec::new(),
        }
    }

    /// Creates a token with an explicit nested chain.
    pub fn with_chain(root: u64, chain: Vec<u32>) -> Result<Self, TokenError> {
        if chain.len() > MAX_DEPTH {
            return Err(TokenError::Overflow { depth: chain.len() });
        }
        Ok(Self { root, chain })
    }

    /// The root segment.
    #[inline]
    pub fn root(&self) -> u64 {
        self.root
    }

    /// The nested indices below the root, outermost first.
    #[inline]
    pub fn chain(&self) -> &[u32] {
        &self.chain
    }

    /// Nesting depth: 0 for a root-level token.
    #[inline]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Returns the next token at the same nesting depth.
    ///
    /// Fails with [`TokenError::Overflow`] if the innermost counter is exhausted.
    pub fn advance_sibling(&self) -> Result<Self, TokenError> {
        let mut next = self.clone();
        match next.chain.last_mut() {
            Some(last) => {
                *last = last.checked_add(1).ok_or(TokenError::Overflow {
                    depth: self.chain.len(),
                })?;
            }
            None => {
                next.root = next
                    .root
                    .checked_add(1)
                    .ok_or(TokenError::Overflow { depth: 0 })?;
            }
        }
        Ok(next)
    }

    /// Returns a token one level deeper, starting a fresh zero index.
    pub fn descend(&self) -> Result<Self, TokenError> {
        if self.chain.len() >= MAX_DEPTH {
            return Err(TokenError::Overflow {
                depth: self.chain.len(),
            });
        }
        let mut next = self.clone();
        next.chain.push(0);
        Ok(next)
    }

    /// The enclosing scope, or `None` for a root-level token.
    pub fn parent(&self) -> Option<Self> {
        let (_, outer) = self.chain.split_last()?;
        Some(Self {
            root: self.root,
            chain: outer.to_vec(),
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for index in &self.chain {
            write!(f, ".{}", index)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self)
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('.');
        let root = segments
            .next()
            .and_then(|seg| seg.parse::<u64>().ok())
            .ok_or_else(|| TokenError::Parse(s.to_string()))?;
        let chain = segments
            .map(|seg| seg.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| TokenError::Parse(s.to_string()))?;
        Self::with_chain(root, chain)
    }
}
