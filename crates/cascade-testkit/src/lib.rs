//! Cascade testing infrastructure.
//!
//! Deterministic doubles for the external collaborators the resolver
//! consumes: scripted level fetchers whose resolution order the test
//! controls explicitly (so out-of-order network races are reproducible,
//! not flaky), and a collecting error sink that captures surfaced
//! failures together with their retry handles.
//!
//! ```rust,no_run
//! use cascade_testkit::{options, ScriptedFetcher};
//!
//! let customers = ScriptedFetcher::new();
//! customers.respond(&["acme"], options(&[("c-1", "Customer One")]));
//! let release = customers.hold(&["globex"], Ok(options(&[("c-9", "Customer Nine")])));
//! // ... drive the resolver, then decide when the held fetch resolves:
//! release.release();
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fetchers;
pub mod sink;

pub use fetchers::{options, Gate, GateControl, ScriptedFetcher};
pub use sink::{CollectingErrorSink, ReportedError};
