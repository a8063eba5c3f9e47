// Path: crates/storage/src/versions.rs

//! The per-key version list and the retention rules applied to it.

use hkv_api::kv::StateVal;
use hkv_api::pending::Horizon;
use hkv_types::Token;

/// One recorded version. `None` is a tombstone.
#[derive(Debug, Clone)]
pub(crate) struct VersionEntry {
    pub(crate) token: Token,
    pub(crate) value: Option<StateVal>,
}

/// The outcome of a floor lookup.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Floor {
    /// The list holds no versions.
    Absent,
    /// Every retained version is newer than the request.
    Expired { oldest: Token },
    /// The visible version's value.
    Found(Option<StateVal>),
}

/// The history of one key, ascending by token.
///
/// A list is `retired` once it has been chosen for removal from the map.
/// Writers that find a retired list must not append to it.
#[derive(Debug, Default)]
pub(crate) struct VersionList {
    versions: Vec<VersionEntry>,
    pub(crate) retired: bool,
}

impl VersionList {
    /// Records `value` at `token`. Returns false if a version at `token`
    /// already existed and was overwritten.
    pub(crate) fn insert(&mut self, token: &Token, value: Option<StateVal>) -> bool {
        let pos = self.versions.partition_point(|v| &v.token < token);
        match self.versions.get_mut(pos) {
            Some(existing) if existing.token == *token => {
                existing.value = value;
                false
            }
            _ => {
                self.versions.insert(
                    pos,
                    VersionEntry {
                        token: token.clone(),
                        value,
                    },
                );
                true
            }
        }
    }

    /// The version with the greatest token not above `token`.
    pub(crate) fn floor(&self, token: &Token) -> Floor {
        let Some(oldest) = self.versions.first() else {
            return Floor::Absent;
        };
        if oldest.token > *token {
            return Floor::Expired {
                oldest: oldest.token.clone(),
            };
        }
        if oldest.token == *token || self.versions.len() == 1 {
            return Floor::Found(oldest.value.clone());
        }
        let idx = self.versions.partition_point(|v| &v.token <= token);
        match idx.checked_sub(1).and_then(|i| self.versions.get(i)) {
            Some(entry) => Floor::Found(entry.value.clone()),
            None => Floor::Absent,
        }
    }

    /// True if the whole key may be dropped: its newest version is a
    /// tombstone (or `purge` is set) and strictly older than the horizon.
    pub(crate) fn collectible(&self, horizon: &Horizon, purge: bool) -> bool {
        match self.versions.last() {
            Some(newest) => (newest.value.is_none() || purge) && horizon.admits(&newest.token),
            None => true,
        }
    }

    /// Drops the oldest version if a newer one at or below the horizon
    /// already shadows it for every pending reader. Returns true if a version
    /// was dropped.
    pub(crate) fn trim_oldest(&mut self, horizon: &Horizon) -> bool {
        match self.versions.get(1) {
            Some(second) if horizon.covers(&second.token) => {
                self.versions.remove(0);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.versions.len()
    }

    pub(crate) fn oldest(&self) -> Option<&Token> {
        self.versions.first().map(|v| &v.token)
    }

    pub(crate) fn newest(&self) -> Option<&Token> {
        self.versions.last().map(|v| &v.token)
    }
}
