// Path: crates/api/src/pending/mod.rs
//! The retention horizon and the registry of in-flight operations that defines it.
//!
//! A history store never removes a version that a pending operation might
//! still read. Operations register the oldest token they may query; the
//! minimum over the registry is the collection horizon.

use hkv_types::Token;

mod clock;
mod registry;

pub use clock::TokenClock;
pub use registry::{PendingGuard, PendingOperations};

/// A read-only oracle for the oldest token any live operation may still read.
///
/// The store only ever queries the minimum. Implementations must tolerate
/// concurrent registration and removal while being polled.
pub trait PendingRegistry: Send + Sync {
    /// The oldest registered token, or `None` if nothing is pending.
    fn oldest(&self) -> Option<Token>;
}

impl<F> PendingRegistry for F
where
    F: Fn() -> Option<Token> + Send + Sync,
{
    fn oldest(&self) -> Option<Token> {
        self()
    }
}

/// The boundary below which history may be collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Horizon {
    /// Nothing is pending and collection is permitted without constraint.
    Unbounded,
    /// The oldest token a pending operation may read.
    At(Token),
}

impl Horizon {
    /// Computes the horizon from a registry.
    ///
    /// With nothing pending, returns `Unbounded` if `collect_when_idle` is set
    /// and `None` (no horizon, collect nothing) otherwise.
    pub fn resolve(registry: &dyn PendingRegistry, collect_when_idle: bool) -> Option<Self> {
        match registry.oldest() {
            Some(token) => Some(Self::At(token)),
            None if collect_when_idle => Some(Self::Unbounded),
            None => None,
        }
    }

    /// True if `token` is strictly older than the horizon, so a version
    /// stamped with it is invisible to every pending operation once a newer
    /// version or a whole-key removal supersedes it.
    pub fn admits(&self, token: &Token) -> bool {
        match self {
            Self::Unbounded => true,
            Self::At(horizon) => token < horizon,
        }
    }

    /// True if `token` is at or below the horizon. A version followed by one
    /// stamped with such a token can no longer be the floor of any pending read.
    pub fn covers(&self, token: &Token) -> bool {
        match self {
            Self::Unbounded => true,
            Self::At(horizon) => token <= horizon,
        }
    }
}
