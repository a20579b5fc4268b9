// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending-check state: individual markers or the check-everything sentinel.

use hashbrown::HashSet;

use declutter_index::MarkerKey;

/// What the next batched pass must cover.
///
/// The two variants are mutually exclusive by construction: once
/// [`request_all`](Self::request_all) has been called, individual requests
/// are already covered by the full pass and are not tracked separately until
/// [`take`](Self::take) resets the state.
///
/// # Example
///
/// ```
/// use declutter_resolver::Pending;
///
/// let mut pending = Pending::new();
/// assert!(pending.is_idle());
/// pending.request_all();
/// assert!(!pending.is_idle());
/// assert!(matches!(pending.take(), Pending::All));
/// assert!(pending.is_idle());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pending {
    /// Markers awaiting a targeted pass. Empty means nothing is scheduled.
    Markers(HashSet<MarkerKey>),
    /// Everything must be rechecked; absorbs individual requests.
    All,
}

impl Default for Pending {
    fn default() -> Self {
        Self::new()
    }
}

impl Pending {
    /// Creates the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::Markers(HashSet::new())
    }

    /// Schedule one marker. Absorbed silently when a full pass is pending.
    pub fn request(&mut self, key: MarkerKey) {
        if let Self::Markers(set) = self {
            set.insert(key);
        }
    }

    /// Schedule a full pass, superseding any individual requests.
    pub fn request_all(&mut self) {
        *self = Self::All;
    }

    /// Drop a marker from the pending set, if individually tracked.
    pub fn discard(&mut self, key: MarkerKey) {
        if let Self::Markers(set) = self {
            set.remove(&key);
        }
    }

    /// True when no pass is scheduled.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Markers(set) if set.is_empty())
    }

    /// Whether the next pass will cover `key`.
    #[must_use]
    pub fn covers(&self, key: MarkerKey) -> bool {
        match self {
            Self::Markers(set) => set.contains(&key),
            Self::All => true,
        }
    }

    /// Take the accumulated state, leaving idle behind.
    #[must_use]
    pub fn take(&mut self) -> Self {
        core::mem::replace(self, Self::new())
    }
}
