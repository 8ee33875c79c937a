//! Shared harnesses for resolver integration tests.

#![allow(dead_code)]

use cascade_resolver::{
    ChainResolver, ChainSpec, ErrorSink, LevelDescriptor, LevelFetcher, LevelKey, LevelState,
    Selection,
};
use cascade_testkit::{CollectingErrorSink, ScriptedFetcher};
use std::sync::Arc;

/// Opt-in log capture for debugging a failing test:
/// `RUST_LOG=cascade_resolver=debug cargo test -p cascade-resolver`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Explicit fetch environment, standing in for auth token / API base
/// configuration real fetchers would carry.
#[derive(Clone, Default)]
pub struct TestCtx {
    #[allow(dead_code)]
    pub auth_token: String,
}

pub struct Harness {
    pub companies: Arc<ScriptedFetcher>,
    pub customers: Arc<ScriptedFetcher>,
    pub projects: Arc<ScriptedFetcher>,
    pub work_orders: Arc<ScriptedFetcher>,
    pub sink: Arc<CollectingErrorSink>,
    pub resolver: ChainResolver<TestCtx>,
}

impl Harness {
    pub fn state(&self, key: &str) -> LevelState {
        self.resolver.state(&LevelKey::from(key)).unwrap()
    }
}

fn as_fetcher(f: &Arc<ScriptedFetcher>) -> Arc<dyn LevelFetcher<TestCtx>> {
    Arc::clone(f) as Arc<dyn LevelFetcher<TestCtx>>
}

/// The borrow/purchase-form chain: Company → Customer → Project → WorkOrder.
pub fn four_level_harness() -> Harness {
    init_tracing();
    let companies = ScriptedFetcher::new();
    let customers = ScriptedFetcher::new();
    let projects = ScriptedFetcher::new();
    let work_orders = ScriptedFetcher::new();
    let chain = ChainSpec::builder()
        .level(LevelDescriptor::new("company", "Company", as_fetcher(&companies)))
        .level(LevelDescriptor::new("customer", "Customer", as_fetcher(&customers)))
        .level(LevelDescriptor::new("project", "Project", as_fetcher(&projects)))
        .level(LevelDescriptor::new("work_order", "Work Order", as_fetcher(&work_orders)))
        .build()
        .unwrap();
    let sink = CollectingErrorSink::new();
    let resolver = ChainResolver::new(chain, TestCtx::default(), sink.clone() as Arc<dyn ErrorSink>);
    Harness {
        companies,
        customers,
        projects,
        work_orders,
        sink,
        resolver,
    }
}

pub struct WarehouseHarness {
    pub warehouses: Arc<ScriptedFetcher>,
    pub catalog_items: Arc<ScriptedFetcher>,
    #[allow(dead_code)]
    pub sink: Arc<CollectingErrorSink>,
    pub resolver: ChainResolver<TestCtx>,
}

impl WarehouseHarness {
    pub fn state(&self, key: &str) -> LevelState {
        self.resolver.state(&LevelKey::from(key)).unwrap()
    }
}

/// The shorter parallel chain: Warehouse → CatalogItems, with an
/// include-out-of-stock fetch parameter on the item level.
pub fn warehouse_harness() -> WarehouseHarness {
    init_tracing();
    let warehouses = ScriptedFetcher::new();
    let catalog_items = ScriptedFetcher::new();
    let chain = ChainSpec::builder()
        .level(LevelDescriptor::new("warehouse", "Warehouse", as_fetcher(&warehouses)))
        .level(
            LevelDescriptor::new("catalog_item", "Catalog Item", as_fetcher(&catalog_items))
                .with_param("include_out_of_stock"),
        )
        .build()
        .unwrap();
    let sink = CollectingErrorSink::new();
    let resolver = ChainResolver::new(chain, TestCtx::default(), sink.clone() as Arc<dyn ErrorSink>);
    WarehouseHarness {
        warehouses,
        catalog_items,
        sink,
        resolver,
    }
}

/// Let spawned fetch tasks run to completion on the current-thread
/// runtime. Held fetches stay parked on their gates.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Shorthand for building a selection in one expression.
pub fn selection(levels: &[(&str, &str)]) -> Selection {
    let mut sel = Selection::new();
    for (level, id) in levels {
        sel.select(*level, *id);
    }
    sel
}
