use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::PackCatalog;
use crate::dp::BoundedDp;
use crate::error::Result;
use crate::shortest_path::ShortestPath;
use crate::types::Fulfillment;

/// A way of choosing the packs for one order.
///
/// Every implementation returns the fulfillment that ships the fewest items at
/// or above `order`, and among those the one with the fewest packs. Ties
/// between equally small decompositions are broken the same way by every
/// implementation, so results can be compared byte for byte.
pub trait AllocationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `order` must be at least 1.
    fn solve(&self, order: u64, catalog: &PackCatalog) -> Result<Fulfillment>;

    /// Upper bound on the totals `solve` tracks for this input. Memory grows
    /// linearly with it, so callers check it against a budget first.
    fn state_space(&self, order: u64, catalog: &PackCatalog) -> u64 {
        search_bound(order, catalog)
    }
}

/// Exclusive upper end of the totals worth searching.
///
/// Rounding `order` up to a multiple of the largest pack always lands below
/// `order + largest`, so no optimal total lies at or beyond it.
pub fn search_bound(order: u64, catalog: &PackCatalog) -> u64 {
    order.saturating_add(catalog.largest())
}

/// Selectable strategy, as named in config files and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    BoundedDp,
    ShortestPath,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::BoundedDp, Strategy::ShortestPath];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::BoundedDp => "bounded-dp",
            Strategy::ShortestPath => "shortest-path",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bounded-dp" | "dp" => Ok(Strategy::BoundedDp),
            "shortest-path" | "sp" => Ok(Strategy::ShortestPath),
            _ => Err(format!(
                "invalid strategy '{}', expected: bounded-dp or shortest-path",
                s
            )),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AllocationStrategy for Strategy {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn solve(&self, order: u64, catalog: &PackCatalog) -> Result<Fulfillment> {
        match self {
            Strategy::BoundedDp => BoundedDp.solve(order, catalog),
            Strategy::ShortestPath => ShortestPath.solve(order, catalog),
        }
    }

    fn state_space(&self, order: u64, catalog: &PackCatalog) -> u64 {
        match self {
            Strategy::BoundedDp => BoundedDp.state_space(order, catalog),
            Strategy::ShortestPath => ShortestPath.state_space(order, catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> PackCatalog {
        PackCatalog::new([250, 500, 1000, 2000, 5000]).unwrap()
    }

    fn expect(pairs: &[(u64, u64)]) -> Fulfillment {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_standard_catalog_scenarios() {
        let catalog = standard();
        let cases: [(u64, Fulfillment); 5] = [
            (1, expect(&[(250, 1)])),
            (250, expect(&[(250, 1)])),
            (251, expect(&[(500, 1)])),
            (501, expect(&[(250, 1), (500, 1)])),
            (12001, expect(&[(250, 1), (2000, 1), (5000, 2)])),
        ];

        for strategy in Strategy::ALL {
            for (order, want) in &cases {
                let got = strategy.solve(*order, &catalog).unwrap();
                assert_eq!(&got, want, "{strategy} for order {order}");
            }
        }
    }

    #[test]
    fn test_coprime_catalog_exact_tiling() {
        let catalog = PackCatalog::new([23, 31, 53]).unwrap();
        let want = expect(&[(23, 2), (31, 7), (53, 9429)]);

        for strategy in Strategy::ALL {
            let got = strategy.solve(500_000, &catalog).unwrap();
            assert_eq!(got, want, "{strategy}");
            assert_eq!(got.pack_count(), 9438);
            assert_eq!(got.total_items(), 500_000);
        }
    }

    #[test]
    fn test_strategies_agree_on_small_matrix() {
        let catalogs = [
            vec![250, 500, 1000, 2000, 5000],
            vec![23, 31, 53],
            vec![3, 5],
            vec![4, 6, 9],
            vec![7],
            vec![1, 10, 25],
        ];
        for sizes in catalogs {
            let catalog = PackCatalog::new(sizes).unwrap();
            for order in (1..=300).chain([997, 4_321, 12_001]) {
                let dp = Strategy::BoundedDp.solve(order, &catalog).unwrap();
                let sp = Strategy::ShortestPath.solve(order, &catalog).unwrap();
                assert_eq!(dp, sp, "catalog {catalog}, order {order}");
                assert!(dp.total_items() >= order);
            }
        }
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("bounded-dp".parse::<Strategy>(), Ok(Strategy::BoundedDp));
        assert_eq!("sp".parse::<Strategy>(), Ok(Strategy::ShortestPath));
        assert!("greedy".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_state_space_per_strategy() {
        let catalog = PackCatalog::new([999_999, 1_000_000]).unwrap();
        let order = 1_000_000_000;
        assert_eq!(
            Strategy::ShortestPath.state_space(order, &catalog),
            1_001_000_000
        );
        assert_eq!(Strategy::BoundedDp.state_space(order, &catalog), 1_001_000_000);

        let coprime = PackCatalog::new([23, 31, 53]).unwrap();
        assert_eq!(Strategy::BoundedDp.state_space(order, &coprime), 53 * 53 + 2 * 53);
        assert_eq!(
            Strategy::ShortestPath.state_space(order, &coprime),
            1_000_000_053
        );
    }

    #[test]
    fn test_search_bound() {
        assert_eq!(search_bound(12001, &standard()), 17001);
    }
}
