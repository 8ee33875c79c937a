//! Per-level observable state.

use crate::keys::SelectOption;
use serde::{Deserialize, Serialize};

/// State of one level, owned exclusively by the resolver.
///
/// The surrounding form reads option lists from here and writes its
/// `Selection` elsewhere; it never mutates `LevelState` directly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    /// Options currently valid for this level's ancestor selection.
    pub options: Vec<SelectOption>,
    /// A fetch for this level is in flight.
    pub loading: bool,
    /// This level has completed at least one successful fetch since it
    /// was last cleared.
    pub loaded: bool,
}

impl LevelState {
    /// The empty state: no options, not loading, never loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Committed options after a successful fetch.
    pub fn with_options(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            loading: false,
            loaded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_flags() {
        let state = LevelState::empty();
        assert!(state.options.is_empty());
        assert!(!state.loading);
        assert!(!state.loaded);
    }

    #[test]
    fn test_with_options_marks_loaded() {
        let state = LevelState::with_options(vec![SelectOption::new("a", "A")]);
        assert!(state.loaded);
        assert!(!state.loading);
        assert_eq!(state.options.len(), 1);
    }

    #[test]
    fn test_state_serde_round_trip() {
        let state = LevelState::with_options(vec![SelectOption::new("w-1", "Main warehouse")]);
        let json = serde_json::to_string(&state).unwrap();
        let back: LevelState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
