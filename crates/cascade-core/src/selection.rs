//! The form-owned selection.
//!
//! `Selection` is written by the surrounding form (the thing rendering
//! the selects) and only *read* by the resolver, which reacts to changes
//! in it and produces option lists in return. It carries the chosen
//! option per level plus any non-level fetch parameters (filter flags
//! and the like) that levels declare as dependencies.

use crate::keys::{LevelKey, OptionId, ParamKey, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current choices across a chain, plus fetch parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    levels: HashMap<LevelKey, OptionId>,
    params: HashMap<ParamKey, ParamValue>,
}

impl Selection {
    /// An empty selection: nothing chosen, all params unset.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutators (form side)
    // =========================================================================

    /// Choose an option at a level.
    pub fn select(&mut self, level: impl Into<LevelKey>, id: impl Into<OptionId>) -> &mut Self {
        self.levels.insert(level.into(), id.into());
        self
    }

    /// Clear the choice at a level.
    pub fn unselect(&mut self, level: &LevelKey) -> &mut Self {
        self.levels.remove(level);
        self
    }

    /// Set a fetch parameter.
    pub fn set_param(&mut self, key: impl Into<ParamKey>, value: impl Into<ParamValue>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Drop the choices at the given levels. Forms use this with
    /// [`ChainSpec::keys_below`](crate::chain::ChainSpec::keys_below) to
    /// discard child selections when a parent changes.
    pub fn clear_levels<'a>(&mut self, levels: impl IntoIterator<Item = &'a LevelKey>) -> &mut Self {
        for level in levels {
            self.levels.remove(level);
        }
        self
    }

    // =========================================================================
    // Accessors (resolver side)
    // =========================================================================

    /// The chosen option at a level, if any.
    pub fn get(&self, level: &LevelKey) -> Option<&OptionId> {
        self.levels.get(level)
    }

    /// The value of a fetch parameter. Unset params read as empty.
    pub fn param(&self, key: &ParamKey) -> ParamValue {
        self.params.get(key).cloned().unwrap_or_default()
    }

    /// Whether nothing is chosen at any level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_get() {
        let mut sel = Selection::new();
        sel.select("company", "acme");
        assert_eq!(sel.get(&"company".into()), Some(&"acme".into()));
        assert_eq!(sel.get(&"customer".into()), None);
    }

    #[test]
    fn test_unset_param_reads_empty() {
        let mut sel = Selection::new();
        assert_eq!(sel.param(&"include_out_of_stock".into()), ParamValue::default());
        sel.set_param("include_out_of_stock", true);
        assert_eq!(sel.param(&"include_out_of_stock".into()).as_str(), "true");
    }

    #[test]
    fn test_clear_levels() {
        let mut sel = Selection::new();
        sel.select("company", "acme")
            .select("customer", "c-1")
            .select("project", "p-1");
        let below = ["customer".into(), "project".into()];
        sel.clear_levels(below.iter());
        assert_eq!(sel.get(&"company".into()), Some(&"acme".into()));
        assert_eq!(sel.get(&"customer".into()), None);
        assert_eq!(sel.get(&"project".into()), None);
    }
}
