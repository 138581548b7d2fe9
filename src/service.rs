//! Façade used by the request layer.
//!
//! The active catalog lives behind an `Arc` snapshot. Writers build a new
//! catalog and swap the pointer under a short write lock; solves clone the
//! `Arc` and never hold the lock while computing, so a solve always finishes
//! against the snapshot it started with.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::catalog::PackCatalog;
use crate::config::{CacheConfig, SolverConfig};
use crate::error::{AllocationError, CatalogError, Result};
use crate::solver::AllocationStrategy;
use crate::types::{Fulfillment, PackSize};

/// An immutable catalog together with the version it was published as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSnapshot {
    pub version: u64,
    #[serde(rename = "pack_sizes")]
    pub catalog: PackCatalog,
}

pub struct AllocationService {
    current: RwLock<Arc<CatalogSnapshot>>,
    strategy: Box<dyn AllocationStrategy>,
    max_order: u64,
    max_pack_size: u64,
    max_table_len: u64,
    cache: Option<ResultCache>,
}

impl AllocationService {
    /// A service over `catalog` with the default strategy, no cache and the
    /// default limits.
    pub fn new(catalog: PackCatalog) -> Self {
        let defaults = SolverConfig::default();
        Self {
            current: RwLock::new(Arc::new(CatalogSnapshot {
                version: 0,
                catalog,
            })),
            strategy: Box::new(defaults.strategy),
            max_order: defaults.max_order,
            max_pack_size: defaults.max_pack_size,
            max_table_len: defaults.max_table_len,
            cache: None,
        }
    }

    pub fn from_config(solver: &SolverConfig, cache: &CacheConfig) -> Result<Self> {
        let catalog = PackCatalog::new(solver.pack_sizes.iter().copied())?;
        check_size_limit(&catalog, solver.max_pack_size)?;

        let mut service = Self::new(catalog)
            .with_strategy(solver.strategy)
            .with_max_order(solver.max_order)
            .with_max_pack_size(solver.max_pack_size)
            .with_max_table_len(solver.max_table_len);
        if cache.enabled {
            service = service.with_cache(ResultCache::new(cache.max_entries, cache.ttl()));
        }
        Ok(service)
    }

    pub fn with_strategy<S: AllocationStrategy + 'static>(mut self, strategy: S) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn with_max_order(mut self, max_order: u64) -> Self {
        self.max_order = max_order;
        self
    }

    pub fn with_max_pack_size(mut self, max_pack_size: u64) -> Self {
        self.max_pack_size = max_pack_size;
        self
    }

    pub fn with_max_table_len(mut self, max_table_len: u64) -> Self {
        self.max_table_len = max_table_len;
        self
    }

    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn max_order(&self) -> u64 {
        self.max_order
    }

    /// Solves `order` against the catalog current at call time.
    pub fn solve(&self, order: i64) -> Result<Fulfillment> {
        let snapshot = self.list_catalog();
        self.solve_against(order, &snapshot)
    }

    /// Solves `order` against an explicit snapshot, regardless of any catalog
    /// change since the snapshot was taken.
    pub fn solve_against(&self, order: i64, snapshot: &CatalogSnapshot) -> Result<Fulfillment> {
        let order = self.validate_order(order)?;

        if let Some(hit) = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(order, snapshot.version))
        {
            debug!(order, version = snapshot.version, "allocation served from cache");
            return Ok(hit);
        }

        let required = self.strategy.state_space(order, &snapshot.catalog);
        if required > self.max_table_len {
            warn!(
                order,
                version = snapshot.version,
                strategy = self.strategy.name(),
                required,
                budget = self.max_table_len,
                "allocation rejected over table budget"
            );
            return Err(AllocationError::OverBudget {
                order,
                required,
                budget: self.max_table_len,
            });
        }

        let fulfillment = self.strategy.solve(order, &snapshot.catalog)?;
        debug!(
            order,
            version = snapshot.version,
            strategy = self.strategy.name(),
            packs = fulfillment.pack_count(),
            total = fulfillment.total_items(),
            "allocation solved"
        );

        if let Some(cache) = &self.cache {
            cache.insert(order, snapshot.version, fulfillment.clone());
        }
        Ok(fulfillment)
    }

    /// The current catalog snapshot.
    pub fn list_catalog(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn contains(&self, size: PackSize) -> bool {
        self.list_catalog().catalog.contains(size)
    }

    /// Validates `sizes` and publishes them as the new catalog.
    pub fn set_catalog<I>(&self, sizes: I) -> Result<Arc<CatalogSnapshot>>
    where
        I: IntoIterator<Item = i64>,
    {
        let catalog = PackCatalog::new(sizes)?;
        self.publish(|_| Ok(catalog))
    }

    pub fn add_size(&self, size: i64) -> Result<Arc<CatalogSnapshot>> {
        self.publish(|current| {
            let mut sizes = current.to_signed();
            sizes.push(size);
            PackCatalog::new(sizes)
        })
    }

    pub fn remove_size(&self, size: PackSize) -> Result<Arc<CatalogSnapshot>> {
        self.publish(|current| {
            if !current.contains(size) {
                return Err(CatalogError::NotFound(size));
            }
            PackCatalog::new(current.iter().filter(|&s| s != size).map(|s| s as i64))
        })
    }

    /// Builds the next catalog from the current one and swaps it in.
    fn publish<F>(&self, next: F) -> Result<Arc<CatalogSnapshot>>
    where
        F: FnOnce(&PackCatalog) -> std::result::Result<PackCatalog, CatalogError>,
    {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let catalog = next(&current.catalog)?;
        check_size_limit(&catalog, self.max_pack_size)?;

        let snapshot = Arc::new(CatalogSnapshot {
            version: current.version + 1,
            catalog,
        });
        *current = Arc::clone(&snapshot);
        drop(current);

        if let Some(cache) = &self.cache {
            cache.clear();
        }
        info!(
            version = snapshot.version,
            catalog = %snapshot.catalog,
            "pack catalog replaced"
        );
        Ok(snapshot)
    }

    fn validate_order(&self, order: i64) -> Result<u64> {
        match u64::try_from(order) {
            Ok(order) if order >= 1 && order <= self.max_order => Ok(order),
            _ => Err(AllocationError::InvalidOrder {
                order,
                max: self.max_order,
            }),
        }
    }
}

impl std::fmt::Debug for AllocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationService")
            .field("catalog", &self.list_catalog())
            .field("strategy", &self.strategy.name())
            .field("max_order", &self.max_order)
            .field("max_pack_size", &self.max_pack_size)
            .field("max_table_len", &self.max_table_len)
            .field("cache", &self.cache)
            .finish()
    }
}

fn check_size_limit(catalog: &PackCatalog, max: PackSize) -> std::result::Result<(), CatalogError> {
    if catalog.largest() > max {
        return Err(CatalogError::TooLarge {
            size: catalog.largest(),
            max,
        });
    }
    Ok(())
}
