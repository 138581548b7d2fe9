//! Order fulfillment from a catalog of fixed pack sizes.
//!
//! An order of `n` items is met with whole packs. The chosen fulfillment ships
//! the fewest items at or above `n` and, among those, uses the fewest packs.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod dp;
pub mod error;
pub mod render;
pub mod service;
pub mod shortest_path;
pub mod solver;
pub mod trace;
pub mod types;

pub use catalog::PackCatalog;
pub use error::{AllocationError, CatalogError, ConfigError};
pub use service::{AllocationService, CatalogSnapshot};
pub use solver::{AllocationStrategy, Strategy};
pub use types::{Fulfillment, PackQuantity, PackSize};
