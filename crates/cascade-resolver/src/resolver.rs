//! The chain resolver: composition of store, watcher, and coordinator.
//!
//! One `ChainResolver` instance corresponds to one mounted form. The
//! form owns the [`Selection`] and calls [`sync`](ChainResolver::sync)
//! whenever it may have changed (calling it redundantly is free); the
//! resolver owns every level's `{ options, loading, loaded }` state and
//! exposes it as snapshots and as `futures-signals` signals.
//!
//! The root level is lazy: nothing is fetched at construction. The form
//! calls [`load_root`](ChainResolver::load_root) when the user first
//! opens the root select, and that trigger is idempotent.

use crate::coordinator::{self, ErrorSink};
use crate::store::LevelStore;
use crate::watcher::{CascadeAction, DependencyWatcher};
use cascade_core::{ChainSpec, LevelKey, LevelState, Selection};
use futures_signals::signal::MutableSignalCloned;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Shared internals
// ─────────────────────────────────────────────────────────────────────────────

/// State shared between the resolver handle and its spawned fetch
/// tasks. Tasks hold a `Weak` to this, so dropping the resolver turns
/// every pending commit into a no-op.
pub(crate) struct Shared<Ctx> {
    pub(crate) chain: ChainSpec<Ctx>,
    pub(crate) ctx: Ctx,
    pub(crate) store: LevelStore,
    pub(crate) errors: Arc<dyn ErrorSink>,
    pub(crate) runtime: tokio::runtime::Handle,
    pub(crate) inner: Mutex<Inner>,
}

/// Mutable resolver state. All mutation happens under this lock,
/// between suspension points; the only awaits are the external fetches
/// inside spawned tasks.
pub(crate) struct Inner {
    /// Bumped by [`ChainResolver::reset`]; invalidates every in-flight
    /// fetch token at once.
    pub(crate) epoch: u64,
    pub(crate) watcher: DependencyWatcher,
    /// Last-spawned fetch task per level, for best-effort abort.
    pub(crate) tasks: Vec<Option<JoinHandle<()>>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Per-mount resolver for one chain of dependent selects.
pub struct ChainResolver<Ctx> {
    shared: Arc<Shared<Ctx>>,
}

impl<Ctx> ChainResolver<Ctx>
where
    Ctx: Clone + Send + Sync + 'static,
{
    /// Create a resolver for a chain.
    ///
    /// `ctx` is the explicit fetch environment (auth token, API base,
    /// feature flags) handed to every [`LevelFetcher`] call; keeping it
    /// explicit keeps the resolver free of ambient globals.
    ///
    /// Captures the current tokio runtime for fetch tasks, so it must
    /// be constructed within one; `sync`, `load_root`, and retries may
    /// then be called from non-async code.
    ///
    /// [`LevelFetcher`]: cascade_core::LevelFetcher
    pub fn new(chain: ChainSpec<Ctx>, ctx: Ctx, errors: Arc<dyn ErrorSink>) -> Self {
        let store = LevelStore::new(chain.levels().iter().map(|l| l.key().clone()));
        let watcher = DependencyWatcher::new(&chain);
        let tasks = (0..chain.len()).map(|_| None).collect();
        Self {
            shared: Arc::new(Shared {
                chain,
                ctx,
                store,
                errors,
                runtime: tokio::runtime::Handle::current(),
                inner: Mutex::new(Inner {
                    epoch: 0,
                    watcher,
                    tasks,
                }),
            }),
        }
    }

    /// The chain this resolver serves.
    pub fn chain(&self) -> &ChainSpec<Ctx> {
        &self.shared.chain
    }

    // =========================================================================
    // Observation surface
    // =========================================================================

    /// Snapshot of a level's state. `None` for unknown keys.
    pub fn state(&self, key: &LevelKey) -> Option<LevelState> {
        self.shared
            .store
            .index_of(key)
            .map(|level| self.shared.store.snapshot(level))
    }

    /// Signal of a level's state, for reactive rendering.
    pub fn watch(&self, key: &LevelKey) -> Option<MutableSignalCloned<LevelState>> {
        self.shared
            .store
            .index_of(key)
            .map(|level| self.shared.store.watch(level))
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    /// Load the root level's options if they were never requested.
    ///
    /// Deferred to first user interaction by design: opening the form
    /// without touching the root select costs zero fetches. The call is
    /// idempotent while the root is loading or loaded; a failed load
    /// leaves the root unloaded so a later call retries.
    pub fn load_root(&self) {
        let mut inner = self.shared.inner.lock();
        let root = self.shared.store.snapshot(0);
        if root.loaded || root.loading {
            return;
        }
        let tuple = inner.watcher.current(0).clone();
        coordinator::issue(&self.shared, &mut inner, 0, tuple);
    }

    /// React to the current selection.
    ///
    /// Walks every level boundary and, for each boundary whose
    /// dependency tuple actually changed, synchronously clears the
    /// level and its descendants before issuing the replacement fetch.
    /// Calling this with an unchanged selection does nothing, so the
    /// form may call it on every render.
    pub fn sync(&self, selection: &Selection) {
        let mut inner = self.shared.inner.lock();
        let actions = inner.watcher.observe(&self.shared.chain, selection);
        for action in actions {
            match action {
                CascadeAction::Invalidate { level } => {
                    debug!(level, "invalidating level and descendants");
                    self.shared.store.clear_from(level);
                }
                CascadeAction::Fetch { level, tuple } => {
                    coordinator::issue(&self.shared, &mut inner, level, tuple);
                }
            }
        }
    }

    /// Full reset, as when the owning form closes and reopens: every
    /// in-flight fetch is invalidated (and aborted best-effort), every
    /// level including the root regresses to never-loaded, and all
    /// change-detection memory is forgotten.
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        inner.epoch += 1;
        for task in inner.tasks.iter_mut() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
        inner.watcher.reset(&self.shared.chain);
        self.shared.store.clear_from(0);
    }
}

impl<Ctx> Drop for ChainResolver<Ctx> {
    fn drop(&mut self) {
        // Unmount: abort in-flight fetches best-effort. Tasks that
        // escape the abort fail their Weak upgrade and commit nothing.
        let mut inner = self.shared.inner.lock();
        for task in inner.tasks.iter_mut() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}
