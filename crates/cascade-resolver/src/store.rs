//! Per-level state table.
//!
//! One [`Mutable`] slot per level, so the owning form can observe each
//! level's `{ options, loading, loaded }` slice independently through
//! `futures-signals`. The store never calls into network code; it is
//! mutated only by the fetch coordinator and the dependency watcher,
//! always while the resolver's inner lock is held.

use cascade_core::{LevelKey, LevelState, SelectOption};
use futures_signals::signal::{Mutable, MutableSignalCloned};
use std::collections::HashMap;

/// Holds [`LevelState`] for every level of one chain.
pub(crate) struct LevelStore {
    slots: Vec<Mutable<LevelState>>,
    index: HashMap<LevelKey, usize>,
}

impl LevelStore {
    /// Create a store with one empty slot per level key, in chain order.
    pub fn new(keys: impl IntoIterator<Item = LevelKey>) -> Self {
        let index: HashMap<LevelKey, usize> = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| (key, i))
            .collect();
        let slots = (0..index.len())
            .map(|_| Mutable::new(LevelState::empty()))
            .collect();
        Self { slots, index }
    }

    /// Chain position of a level key.
    pub fn index_of(&self, key: &LevelKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Read-only snapshot of a level's state.
    pub fn snapshot(&self, level: usize) -> LevelState {
        self.slots[level].get_cloned()
    }

    /// Signal of a level's state, for observation by the owning form.
    pub fn watch(&self, level: usize) -> MutableSignalCloned<LevelState> {
        self.slots[level].signal_cloned()
    }

    /// Commit fetched options: replaces options, sets `loaded`, ends
    /// `loading`.
    pub fn set_options(&self, level: usize, options: Vec<SelectOption>) {
        self.slots[level].set(LevelState::with_options(options));
    }

    /// Flip a level's loading flag.
    pub fn set_loading(&self, level: usize, loading: bool) {
        let mut state = self.slots[level].lock_mut();
        state.loading = loading;
    }

    /// Reset a level to the empty state.
    pub fn clear(&self, level: usize) {
        self.slots[level].set(LevelState::empty());
    }

    /// Reset a level and every deeper level.
    pub fn clear_from(&self, level: usize) {
        for i in level..self.slots.len() {
            self.clear(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LevelStore {
        LevelStore::new(["company".into(), "customer".into(), "project".into()])
    }

    #[test]
    fn test_slots_start_empty() {
        let store = store();
        for level in 0..3 {
            assert_eq!(store.snapshot(level), LevelState::empty());
        }
    }

    #[test]
    fn test_set_options_flips_flags() {
        let store = store();
        store.set_loading(1, true);
        store.set_options(1, vec![SelectOption::new("c-1", "Customer One")]);
        let state = store.snapshot(1);
        assert!(state.loaded);
        assert!(!state.loading);
        assert_eq!(state.options.len(), 1);
    }

    #[test]
    fn test_clear_from_resets_descendants_only() {
        let store = store();
        store.set_options(0, vec![SelectOption::new("acme", "Acme")]);
        store.set_options(1, vec![SelectOption::new("c-1", "Customer One")]);
        store.set_options(2, vec![SelectOption::new("p-1", "Project One")]);

        store.clear_from(1);
        assert!(store.snapshot(0).loaded);
        assert_eq!(store.snapshot(1), LevelState::empty());
        assert_eq!(store.snapshot(2), LevelState::empty());
    }

    #[test]
    fn test_index_of() {
        let store = store();
        assert_eq!(store.index_of(&"project".into()), Some(2));
        assert_eq!(store.index_of(&"warehouse".into()), None);
    }
}
