//! # Cascade Resolver
//!
//! Client-side, in-memory resolver for chains of dependent selects:
//! Company → Customer → Project → WorkOrder, Warehouse → CatalogItems,
//! or any other ordered chain where each level's valid options are a
//! function of the ancestor selection.
//!
//! The resolver reacts to a form-owned [`Selection`], detects *real*
//! dependency changes (not mere re-renders), synchronously invalidates
//! descendant levels before any async work, fetches replacements
//! through external [`LevelFetcher`]s, and discards out-of-order stale
//! responses via fetch-token comparison. The root level is loaded
//! lazily on first interaction.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cascade_resolver::{
//!     fetch_fn, ChainResolver, ChainSpec, ErrorSink, FetchError,
//!     LevelDescriptor, LevelKey, RetryHandle, Selection,
//! };
//!
//! #[derive(Clone)]
//! struct Api { base_url: String, auth_token: String }
//!
//! struct Toasts;
//! impl ErrorSink for Toasts {
//!     fn fetch_failed(&self, _key: &LevelKey, name: &str, err: &FetchError, _retry: RetryHandle) {
//!         eprintln!("failed to load {name}: {err}");
//!     }
//! }
//!
//! # async fn get_companies(_: Api) -> Result<Vec<cascade_resolver::SelectOption>, FetchError> { Ok(vec![]) }
//! # async fn demo() {
//! let chain = ChainSpec::builder()
//!     .level(LevelDescriptor::new("company", "Company", fetch_fn(
//!         |api: Api, _req| get_companies(api),
//!     )))
//!     // ... customer, project, work_order ...
//!     .build()
//!     .unwrap();
//!
//! let api = Api { base_url: "https://example".into(), auth_token: "...".into() };
//! let resolver = ChainResolver::new(chain, api, Arc::new(Toasts));
//!
//! resolver.load_root(); // user opened the Company select
//!
//! let mut selection = Selection::new();
//! selection.select("company", "acme");
//! resolver.sync(&selection); // fetches customers for "acme"
//! # }
//! ```

mod coordinator;
mod resolver;
mod store;
mod watcher;

pub use coordinator::{ErrorSink, RetryHandle};
pub use resolver::ChainResolver;

// Re-export the data model so consumers depend on one crate.
pub use cascade_core::{
    fetch_fn, ChainSpec, ChainSpecBuilder, ChainSpecError, FetchError, FetchRequest,
    LevelDescriptor, LevelFetcher, LevelKey, LevelState, OptionId, ParamKey, ParamValue,
    SelectOption, Selection,
};
