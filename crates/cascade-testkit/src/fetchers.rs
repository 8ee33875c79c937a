//! Scripted level fetchers with test-controlled resolution order.

use async_trait::async_trait;
use cascade_core::{FetchError, FetchRequest, LevelFetcher, SelectOption};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Build an option list from `(id, label)` pairs.
pub fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
    pairs
        .iter()
        .map(|(id, label)| SelectOption::new(*id, *label))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Gates
// ─────────────────────────────────────────────────────────────────────────────

/// Awaitable latch a held fetch blocks on.
#[derive(Clone)]
pub struct Gate {
    rx: watch::Receiver<bool>,
}

impl Gate {
    /// Create a closed gate and its control handle.
    pub fn pair() -> (Gate, GateControl) {
        let (tx, rx) = watch::channel(false);
        (Gate { rx }, GateControl { tx })
    }

    /// Wait until the gate is released. A dropped [`GateControl`]
    /// counts as released, so an abandoned gate never hangs a test.
    pub async fn opened(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|open| *open).await;
    }
}

/// Releases a held fetch. Cloneable; releasing twice is harmless.
#[derive(Clone)]
pub struct GateControl {
    tx: watch::Sender<bool>,
}

impl GateControl {
    /// Let every fetch waiting on this gate proceed.
    pub fn release(&self) {
        let _ = self.tx.send(true);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted fetcher
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
enum Script {
    Respond(Vec<SelectOption>),
    Fail(FetchError),
    Hold {
        gate: Gate,
        result: Result<Vec<SelectOption>, FetchError>,
    },
}

/// A [`LevelFetcher`] whose behavior is scripted per dependency tuple.
///
/// Scripts are keyed by the request's ancestor ids followed by its
/// param values, e.g. `["w-1", "true"]` for warehouse `w-1` with a flag
/// param of `"true"`. Unscripted tuples resolve immediately with an
/// empty option list. Every call is recorded for assertion.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<Vec<String>, Script>>,
    calls: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    /// Create a fetcher with no scripts.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn key_of(request: &FetchRequest) -> Vec<String> {
        request
            .ancestors
            .iter()
            .map(|id| id.as_str().to_string())
            .chain(request.params.iter().map(|(_, v)| v.as_str().to_string()))
            .collect()
    }

    fn key(deps: &[&str]) -> Vec<String> {
        deps.iter().map(|d| d.to_string()).collect()
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Resolve the given dependency tuple immediately with options.
    pub fn respond(&self, deps: &[&str], options: Vec<SelectOption>) {
        self.scripts
            .lock()
            .insert(Self::key(deps), Script::Respond(options));
    }

    /// Reject the given dependency tuple immediately.
    pub fn fail(&self, deps: &[&str], error: FetchError) {
        self.scripts
            .lock()
            .insert(Self::key(deps), Script::Fail(error));
    }

    /// Hold fetches for the given dependency tuple until the returned
    /// control is released, then resolve with `result`. This is how
    /// tests interleave out-of-order responses deterministically.
    pub fn hold(&self, deps: &[&str], result: Result<Vec<SelectOption>, FetchError>) -> GateControl {
        let (gate, control) = Gate::pair();
        self.scripts
            .lock()
            .insert(Self::key(deps), Script::Hold { gate, result });
        control
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Every request this fetcher has received, in order.
    pub fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().clone()
    }

    /// Total number of fetch calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of calls for one dependency tuple.
    pub fn calls_for(&self, deps: &[&str]) -> usize {
        let key = Self::key(deps);
        self.calls
            .lock()
            .iter()
            .filter(|req| Self::key_of(req) == key)
            .count()
    }
}

#[async_trait]
impl<Ctx> LevelFetcher<Ctx> for ScriptedFetcher
where
    Ctx: Send + Sync,
{
    async fn fetch(&self, _ctx: &Ctx, request: &FetchRequest) -> Result<Vec<SelectOption>, FetchError> {
        let script = {
            let mut calls = self.calls.lock();
            calls.push(request.clone());
            self.scripts.lock().get(&Self::key_of(request)).cloned()
        };
        match script {
            None => Ok(Vec::new()),
            Some(Script::Respond(options)) => Ok(options),
            Some(Script::Fail(error)) => Err(error),
            Some(Script::Hold { gate, result }) => {
                gate.opened().await;
                result
            }
        }
    }
}
