//! # Cascade Core
//!
//! Data model and external contracts for the cascading dependent-selection
//! resolver: chains of selects where each level's valid option set depends
//! on the value chosen at the level above (Company → Customer → Project →
//! WorkOrder, or Warehouse → CatalogItems).
//!
//! This crate is pure: it defines identifiers, the form-owned [`Selection`],
//! per-level [`LevelState`], chain descriptors, and the [`LevelFetcher`]
//! boundary to the external data layer. All orchestration (change detection,
//! fetch coordination, staleness guards) lives in `cascade-resolver`.

pub mod chain;
pub mod errors;
pub mod keys;
pub mod selection;
pub mod state;

pub use chain::{fetch_fn, ChainSpec, ChainSpecBuilder, FetchRequest, LevelDescriptor, LevelFetcher};
pub use errors::{ChainSpecError, FetchError};
pub use keys::{LevelKey, OptionId, ParamKey, ParamValue, SelectOption};
pub use selection::Selection;
pub use state::LevelState;
