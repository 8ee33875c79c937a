//! Dependency change detection.
//!
//! The watcher keeps the last-observed dependency tuple per level and
//! turns each `sync` of the form-owned [`Selection`] into a minimal set
//! of cascade actions. It is deliberately pure: it mutates nothing but
//! its own memory, so the decision logic is testable without a runtime,
//! a store, or fetchers.
//!
//! A level's dependency tuple is the full ancestor-selection tuple
//! (every shallower level's chosen option, in chain order) plus the
//! values of the level's declared fetch parameters. Comparing whole
//! tuples is what makes `sync` idempotent under re-render: a call with
//! an unchanged selection produces no actions at all.

use cascade_core::{ChainSpec, LevelDescriptor, FetchRequest, OptionId, ParamValue, Selection};

// ─────────────────────────────────────────────────────────────────────────────
// Dependency tuples
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of everything a level's option set depends on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DepTuple {
    /// Chosen option at each shallower level, root first. `None` = unset.
    ancestors: Vec<Option<OptionId>>,
    /// Declared fetch parameter values, in declaration order.
    params: Vec<ParamValue>,
}

impl DepTuple {
    /// The all-unset tuple for a level with the given shape. This is
    /// what a freshly constructed watcher compares against, so that an
    /// initial `sync` with an empty selection is a no-op.
    pub fn unset(ancestor_count: usize, param_count: usize) -> Self {
        Self {
            ancestors: vec![None; ancestor_count],
            params: vec![ParamValue::default(); param_count],
        }
    }

    /// Read the current tuple for chain position `level` out of a
    /// selection.
    pub fn observe<Ctx>(chain: &ChainSpec<Ctx>, level: usize, selection: &Selection) -> Self {
        let ancestors = chain.levels()[..level]
            .iter()
            .map(|ancestor| selection.get(ancestor.key()).cloned())
            .collect();
        let params = chain
            .level(level)
            .params()
            .iter()
            .map(|param| selection.param(param))
            .collect();
        Self { ancestors, params }
    }

    /// Whether every ancestor level has a value, i.e. a fetch keyed to
    /// this tuple may be issued.
    pub fn complete(&self) -> bool {
        self.ancestors.iter().all(Option::is_some)
    }

    /// Build the fetch request for this tuple. Must only be called on a
    /// complete tuple.
    pub fn to_request<Ctx>(&self, descriptor: &LevelDescriptor<Ctx>) -> FetchRequest {
        let ancestors = self
            .ancestors
            .iter()
            .filter_map(|value| value.clone())
            .collect();
        let params = descriptor
            .params()
            .iter()
            .cloned()
            .zip(self.params.iter().cloned())
            .collect();
        FetchRequest { ancestors, params }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cascade actions
// ─────────────────────────────────────────────────────────────────────────────

/// One step of a cascade, to be applied in order by the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CascadeAction {
    /// Clear this level and every deeper level, synchronously, before
    /// any fetch for the boundary resolves.
    Invalidate { level: usize },
    /// Issue a fetch for this level, keyed to the tuple.
    Fetch { level: usize, tuple: DepTuple },
}

// ─────────────────────────────────────────────────────────────────────────────
// Watcher
// ─────────────────────────────────────────────────────────────────────────────

/// Detects *real* changes in each level's dependency tuple, as opposed
/// to mere re-observations of an unchanged selection.
pub(crate) struct DependencyWatcher {
    last_observed: Vec<DepTuple>,
}

impl DependencyWatcher {
    pub fn new<Ctx>(chain: &ChainSpec<Ctx>) -> Self {
        Self {
            last_observed: Self::initial(chain),
        }
    }

    fn initial<Ctx>(chain: &ChainSpec<Ctx>) -> Vec<DepTuple> {
        chain
            .levels()
            .iter()
            .enumerate()
            .map(|(level, descriptor)| DepTuple::unset(level, descriptor.params().len()))
            .collect()
    }

    /// The last-observed tuple for a level. This is the "current"
    /// dependency state a fetch token is validated against on
    /// completion.
    pub fn current(&self, level: usize) -> &DepTuple {
        &self.last_observed[level]
    }

    /// Forget everything, as part of a full resolver reset.
    pub fn reset<Ctx>(&mut self, chain: &ChainSpec<Ctx>) {
        self.last_observed = Self::initial(chain);
    }

    /// Compare the selection against the last-observed tuples and emit
    /// the resulting cascade actions.
    ///
    /// Every boundary from level 1 down is examined in order: an
    /// unchanged tuple contributes nothing (and in particular, an
    /// ancestor re-set to the same non-empty value never re-triggers a
    /// fetch), while a changed tuple invalidates the level and its
    /// descendants and, if every ancestor is set, requests a fetch. A
    /// changed tuple with an unset ancestor stops at the invalidation;
    /// the level legitimately stays empty.
    pub fn observe<Ctx>(&mut self, chain: &ChainSpec<Ctx>, selection: &Selection) -> Vec<CascadeAction> {
        let mut actions = Vec::new();
        for level in 1..chain.len() {
            let tuple = DepTuple::observe(chain, level, selection);
            if tuple == self.last_observed[level] {
                continue;
            }
            self.last_observed[level] = tuple.clone();
            actions.push(CascadeAction::Invalidate { level });
            if tuple.complete() {
                actions.push(CascadeAction::Fetch { level, tuple });
            }
        }
        actions
    }
}
