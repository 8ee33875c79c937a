//! Fetch coordination: token discipline, task spawning, retry handles.
//!
//! Every fetch is tagged with a [`FetchToken`] snapshotting the resolver
//! epoch and the level's dependency tuple at issue time. On completion
//! the token is compared against the *current* epoch and tuple; a
//! mismatch means a newer cascade owns the level and the result is
//! discarded silently, including its `loading` reset, which belongs to
//! the newer cascade. Task abort on supersession is a best-effort
//! optimization only; correctness rests entirely on the token check.

use crate::resolver::{Inner, Shared};
use crate::watcher::DepTuple;
use cascade_core::{FetchError, LevelKey, SelectOption};
use std::sync::Arc;
use tracing::{debug, error, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Error surface
// ─────────────────────────────────────────────────────────────────────────────

/// External error-reporting collaborator (toast layer, log panel, ...).
///
/// Invoked on every unrecovered fetch failure, always with a retry
/// handle that replays the identical fetch. Never invoked for stale
/// results or for levels whose cascade has moved on.
pub trait ErrorSink: Send + Sync {
    /// A level's fetch failed and its dependency tuple is still current.
    fn fetch_failed(&self, level: &LevelKey, display_name: &str, error: &FetchError, retry: RetryHandle);
}

/// Replays a failed fetch with its original dependency tuple.
///
/// Firing a handle after the level's dependencies changed is a no-op:
/// the failed operation no longer exists to be retried, and touching
/// `loading` would corrupt the cascade that now owns the level.
#[derive(Clone)]
pub struct RetryHandle {
    op: Arc<dyn Fn() + Send + Sync>,
}

impl RetryHandle {
    fn new(op: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self { op }
    }

    /// Re-issue the original fetch. Safe to call from non-async code.
    pub fn retry(&self) {
        (self.op)();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// Issue-time snapshot validating a fetch result's continued relevance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FetchToken {
    epoch: u64,
    tuple: DepTuple,
}

impl FetchToken {
    /// Whether this token still describes the level's current
    /// dependency state.
    fn is_current(&self, inner: &Inner, level: usize) -> bool {
        self.epoch == inner.epoch && self.tuple == *inner.watcher.current(level)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Issue / complete
// ─────────────────────────────────────────────────────────────────────────────

/// Issue the fetch for a level. The caller holds the inner lock, so
/// everything up to the spawn (including the `loading` flip) happens
/// synchronously, before any suspension point.
pub(crate) fn issue<Ctx>(shared: &Arc<Shared<Ctx>>, inner: &mut Inner, level: usize, tuple: DepTuple)
where
    Ctx: Clone + Send + Sync + 'static,
{
    if !tuple.complete() {
        // InvalidCascadeState: the watcher guards against this; a fetch
        // for a level with an unset ancestor is a logic error.
        debug_assert!(false, "fetch issued for level {level} with unset ancestor");
        error!(level, "fetch issued for level with unset ancestor; dropping");
        return;
    }

    let descriptor = shared.chain.level(level);
    let request = tuple.to_request(descriptor);
    let token = FetchToken {
        epoch: inner.epoch,
        tuple,
    };
    debug!(level, key = %descriptor.key(), "issuing level fetch");

    shared.store.set_loading(level, true);
    // Best-effort abort of the superseded in-flight fetch.
    if let Some(task) = inner.tasks[level].take() {
        task.abort();
    }

    let weak = Arc::downgrade(shared);
    let fetcher = Arc::clone(descriptor.fetcher());
    let ctx = shared.ctx.clone();
    let handle = shared.runtime.spawn(async move {
        let result = fetcher.fetch(&ctx, &request).await;
        // Unmount guard: a dropped resolver makes the commit a no-op.
        let Some(shared) = weak.upgrade() else { return };
        complete(&shared, level, token, result);
    });
    inner.tasks[level] = Some(handle);
}

/// Validate a completed fetch against the current dependency state and
/// commit, surface, or discard accordingly.
fn complete<Ctx>(
    shared: &Arc<Shared<Ctx>>,
    level: usize,
    token: FetchToken,
    result: Result<Vec<SelectOption>, FetchError>,
) where
    Ctx: Clone + Send + Sync + 'static,
{
    let failure = {
        let inner = shared.inner.lock();
        if !token.is_current(&inner, level) {
            debug!(
                level,
                key = %shared.chain.level(level).key(),
                "discarding stale fetch result"
            );
            return;
        }
        match result {
            Ok(options) => {
                shared.store.set_options(level, options);
                None
            }
            Err(err) => {
                shared.store.set_loading(level, false);
                Some(err)
            }
        }
        // Lock released here so the sink may call retry reentrantly.
    };

    if let Some(err) = failure {
        let descriptor = shared.chain.level(level);
        warn!(
            level,
            key = %descriptor.key(),
            retryable = err.retryable,
            "level fetch failed: {}",
            err.message
        );
        let retry = retry_handle(shared, level, token);
        shared
            .errors
            .fetch_failed(descriptor.key(), descriptor.display_name(), &err, retry);
    }
}

/// Build the retry closure for a failed fetch: replays the identical
/// operation, guarded so it only fires while its tuple is still the
/// current one.
fn retry_handle<Ctx>(shared: &Arc<Shared<Ctx>>, level: usize, token: FetchToken) -> RetryHandle
where
    Ctx: Clone + Send + Sync + 'static,
{
    let weak = Arc::downgrade(shared);
    RetryHandle::new(Arc::new(move || {
        let Some(shared) = weak.upgrade() else { return };
        let mut inner = shared.inner.lock();
        if token.is_current(&inner, level) {
            issue(&shared, &mut inner, level, token.tuple.clone());
        } else {
            debug!(level, "retry dropped; dependencies changed since failure");
        }
    }))
}
