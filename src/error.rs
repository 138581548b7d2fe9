use std::path::PathBuf;

use crate::types::PackSize;

/// Reasons a list of pack sizes is rejected as a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog must contain at least one pack size")]
    Empty,

    #[error("pack size must be a positive integer, got {0}")]
    NonPositive(i64),

    #[error("pack size {0} appears more than once")]
    Duplicate(PackSize),

    #[error("pack size {size} exceeds the maximum of {max}")]
    TooLarge { size: PackSize, max: PackSize },

    #[error("pack size {0} is not in the catalog")]
    NotFound(PackSize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),

    #[error("order quantity must be between 1 and {max}, got {order}")]
    InvalidOrder { order: i64, max: u64 },

    /// The order is in range but solving it against this catalog would track
    /// more totals than the configured budget allows.
    #[error("order {order} needs {required} solver states, above the budget of {budget}")]
    OverBudget {
        order: u64,
        required: u64,
        budget: u64,
    },

    /// The predecessor trace does not lead back to zero. This is a solver bug,
    /// retrying with the same input reproduces it.
    #[error("solver trace is corrupted at total {total}")]
    TraceCorruption { total: u64 },

    /// The search ran out of states before covering the order. Only possible
    /// through a solver bug.
    #[error("search frontier exhausted before reaching order {order}")]
    FrontierExhausted { order: u64 },
}

impl AllocationError {
    /// True for errors caused by caller input rather than by the solver.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::TraceCorruption { .. } | Self::FrontierExhausted { .. }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, AllocationError>;
