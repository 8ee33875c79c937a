//! Chain descriptors and the external fetch boundary.
//!
//! A chain is an ordered list of levels (0 = root). Each level's valid
//! option set is a function of the full ancestor-selection tuple plus
//! any fetch parameters the level declares. The concrete data source
//! behind each level is abstracted as a [`LevelFetcher`]: a pure async
//! function from ancestor identifiers to options. REST endpoints, auth
//! headers, and transport concerns all live behind that trait.

use crate::errors::{ChainSpecError, FetchError};
use crate::keys::{LevelKey, OptionId, ParamKey, ParamValue, SelectOption};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Fetch boundary
// ─────────────────────────────────────────────────────────────────────────────

/// The dependency tuple a fetch was issued for: the chosen option at
/// every shallower level, in chain order, plus the level's declared
/// fetch parameters at issue time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Ancestor option ids, root first. Empty for the root level.
    pub ancestors: Vec<OptionId>,
    /// Declared fetch parameters and their values at issue time.
    pub params: Vec<(ParamKey, ParamValue)>,
}

impl FetchRequest {
    /// The immediate parent's option id, if this is not the root level.
    pub fn parent(&self) -> Option<&OptionId> {
        self.ancestors.last()
    }

    /// Value of a declared fetch parameter.
    pub fn param(&self, key: &ParamKey) -> Option<&ParamValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// External data source for one level.
///
/// Implementations receive the explicit environment `Ctx` (auth token,
/// API base, feature flags) on every call rather than reading ambient
/// globals, and must be side-effect free with respect to resolver state:
/// the resolver alone decides whether a result is committed.
#[async_trait]
pub trait LevelFetcher<Ctx>: Send + Sync
where
    Ctx: Send + Sync,
{
    /// Fetch the options valid under the given dependency tuple.
    async fn fetch(&self, ctx: &Ctx, request: &FetchRequest) -> Result<Vec<SelectOption>, FetchError>;
}

struct FnFetcher<F> {
    f: F,
}

#[async_trait]
impl<Ctx, F, Fut> LevelFetcher<Ctx> for FnFetcher<F>
where
    Ctx: Clone + Send + Sync,
    F: Fn(Ctx, FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<SelectOption>, FetchError>> + Send + 'static,
{
    async fn fetch(&self, ctx: &Ctx, request: &FetchRequest) -> Result<Vec<SelectOption>, FetchError> {
        (self.f)(ctx.clone(), request.clone()).await
    }
}

/// Wrap a plain async closure as a [`LevelFetcher`].
pub fn fetch_fn<Ctx, F, Fut>(f: F) -> Arc<dyn LevelFetcher<Ctx>>
where
    Ctx: Clone + Send + Sync + 'static,
    F: Fn(Ctx, FetchRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<SelectOption>, FetchError>> + Send + 'static,
{
    Arc::new(FnFetcher { f })
}

// ─────────────────────────────────────────────────────────────────────────────
// Level descriptors
// ─────────────────────────────────────────────────────────────────────────────

/// One level of a chain: key, display name, declared fetch parameters,
/// and the data source behind it.
pub struct LevelDescriptor<Ctx> {
    key: LevelKey,
    display_name: String,
    params: Vec<ParamKey>,
    fetcher: Arc<dyn LevelFetcher<Ctx>>,
}

impl<Ctx> LevelDescriptor<Ctx> {
    /// Create a descriptor with no fetch parameters.
    pub fn new(
        key: impl Into<LevelKey>,
        display_name: impl Into<String>,
        fetcher: Arc<dyn LevelFetcher<Ctx>>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            params: Vec::new(),
            fetcher,
        }
    }

    /// Declare a fetch parameter this level depends on. Changing the
    /// parameter's value invalidates and refetches the level exactly
    /// like an ancestor change.
    pub fn with_param(mut self, key: impl Into<ParamKey>) -> Self {
        self.params.push(key.into());
        self
    }

    /// Stable level key.
    pub fn key(&self) -> &LevelKey {
        &self.key
    }

    /// Human-readable name, used in surfaced errors.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Declared fetch parameters.
    pub fn params(&self) -> &[ParamKey] {
        &self.params
    }

    /// The data source behind this level.
    pub fn fetcher(&self) -> &Arc<dyn LevelFetcher<Ctx>> {
        &self.fetcher
    }
}

impl<Ctx> Clone for LevelDescriptor<Ctx> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            display_name: self.display_name.clone(),
            params: self.params.clone(),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

// Hand-written: the fetcher is an opaque trait object.
impl<Ctx> fmt::Debug for LevelDescriptor<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelDescriptor")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chain spec
// ─────────────────────────────────────────────────────────────────────────────

/// A validated, ordered chain of level descriptors (0 = root).
pub struct ChainSpec<Ctx> {
    levels: Vec<LevelDescriptor<Ctx>>,
}

impl<Ctx> ChainSpec<Ctx> {
    /// Start building a chain.
    pub fn builder() -> ChainSpecBuilder<Ctx> {
        ChainSpecBuilder { levels: Vec::new() }
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the chain has no levels. Always false for a validated
    /// chain; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Descriptor at a chain position.
    pub fn level(&self, index: usize) -> &LevelDescriptor<Ctx> {
        &self.levels[index]
    }

    /// All descriptors in chain order.
    pub fn levels(&self) -> &[LevelDescriptor<Ctx>] {
        &self.levels
    }

    /// Chain position of a level key.
    pub fn index_of(&self, key: &LevelKey) -> Option<usize> {
        self.levels.iter().position(|l| l.key() == key)
    }

    /// Keys of every level strictly below the given one, in chain
    /// order. Empty if the key is unknown or is the deepest level.
    pub fn keys_below<'a>(&'a self, key: &LevelKey) -> impl Iterator<Item = &'a LevelKey> {
        let start = self.index_of(key).map(|i| i + 1).unwrap_or(self.levels.len());
        self.levels[start..].iter().map(|l| l.key())
    }
}

impl<Ctx> Clone for ChainSpec<Ctx> {
    fn clone(&self) -> Self {
        Self {
            levels: self.levels.clone(),
        }
    }
}

impl<Ctx> fmt::Debug for ChainSpec<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSpec").field("levels", &self.levels).finish()
    }
}

/// Builder for [`ChainSpec`]. Levels are appended root-first.
pub struct ChainSpecBuilder<Ctx> {
    levels: Vec<LevelDescriptor<Ctx>>,
}

impl<Ctx> ChainSpecBuilder<Ctx> {
    /// Append a level.
    pub fn level(mut self, descriptor: LevelDescriptor<Ctx>) -> Self {
        self.levels.push(descriptor);
        self
    }

    /// Validate and build the chain.
    pub fn build(self) -> Result<ChainSpec<Ctx>, ChainSpecError> {
        if self.levels.is_empty() {
            return Err(ChainSpecError::EmptyChain);
        }
        let mut seen = HashSet::new();
        for (index, level) in self.levels.iter().enumerate() {
            if !seen.insert(level.key().clone()) {
                return Err(ChainSpecError::DuplicateLevel(level.key().to_string()));
            }
            if index == 0 && !level.params().is_empty() {
                return Err(ChainSpecError::RootWithParams(level.key().to_string()));
            }
            let mut params = HashSet::new();
            for param in level.params() {
                if !params.insert(param) {
                    return Err(ChainSpecError::DuplicateParam {
                        level: level.key().to_string(),
                        param: param.to_string(),
                    });
                }
            }
        }
        Ok(ChainSpec { levels: self.levels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn noop<Ctx: Clone + Send + Sync + 'static>() -> Arc<dyn LevelFetcher<Ctx>> {
        fetch_fn(|_ctx: Ctx, _req| async { Ok(Vec::new()) })
    }

    #[test]
    fn test_empty_chain_rejected() {
        let result = ChainSpec::<()>::builder().build();
        assert_matches!(result, Err(ChainSpecError::EmptyChain));
    }

    #[test]
    fn test_duplicate_level_rejected() {
        let result = ChainSpec::<()>::builder()
            .level(LevelDescriptor::new("company", "Company", noop()))
            .level(LevelDescriptor::new("company", "Company", noop()))
            .build();
        assert_matches!(result, Err(ChainSpecError::DuplicateLevel(key)) if key == "company");
    }

    #[test]
    fn test_root_params_rejected() {
        let result = ChainSpec::<()>::builder()
            .level(LevelDescriptor::new("warehouse", "Warehouse", noop()).with_param("flag"))
            .build();
        assert_matches!(result, Err(ChainSpecError::RootWithParams(_)));
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let result = ChainSpec::<()>::builder()
            .level(LevelDescriptor::new("warehouse", "Warehouse", noop()))
            .level(
                LevelDescriptor::new("catalog_item", "Catalog Item", noop())
                    .with_param("include_out_of_stock")
                    .with_param("include_out_of_stock"),
            )
            .build();
        assert_matches!(result, Err(ChainSpecError::DuplicateParam { .. }));
    }

    #[test]
    fn test_keys_below() {
        let chain = ChainSpec::<()>::builder()
            .level(LevelDescriptor::new("company", "Company", noop()))
            .level(LevelDescriptor::new("customer", "Customer", noop()))
            .level(LevelDescriptor::new("project", "Project", noop()))
            .build()
            .unwrap();
        let below: Vec<_> = chain.keys_below(&"company".into()).map(|k| k.as_str()).collect();
        assert_eq!(below, ["customer", "project"]);
        assert_eq!(chain.keys_below(&"project".into()).count(), 0);
        assert_eq!(chain.keys_below(&"unknown".into()).count(), 0);
    }

    #[test]
    fn test_debug_elides_fetcher() {
        let chain = ChainSpec::<()>::builder()
            .level(LevelDescriptor::new("warehouse", "Warehouse", noop()))
            .level(
                LevelDescriptor::new("catalog_item", "Catalog Item", noop())
                    .with_param("include_out_of_stock"),
            )
            .build();
        let rendered = format!("{chain:?}");
        assert!(rendered.contains("warehouse"));
        assert!(rendered.contains("include_out_of_stock"));
        assert!(!rendered.contains("fetcher"));
    }

    #[test]
    fn test_fetch_request_accessors() {
        let request = FetchRequest {
            ancestors: vec!["acme".into(), "c-1".into()],
            params: vec![("flag".into(), "true".into())],
        };
        assert_eq!(request.parent(), Some(&"c-1".into()));
        assert_eq!(request.param(&"flag".into()), Some(&"true".into()));
        assert_eq!(request.param(&"other".into()), None);
    }
}
