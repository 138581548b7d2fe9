//! Bounded dynamic programming over exact totals.
//!
//! `cost[t]` is the fewest packs summing exactly to `t`, filled by unbounded
//! coin-change relaxation with catalog sizes in ascending order. The chosen
//! total is the first reachable one at or above the order.
//!
//! With largest size `M`, a fewest-packs decomposition never holds `M` or more
//! packs of the smaller sizes: some subset of them would sum to a multiple of
//! `M` and could be swapped for fewer `M` packs. So from `M² + M` upward the
//! table repeats with period `M` (one more pack per period, same predecessor).
//! The table is therefore only filled up to one period past that point, and
//! larger totals are folded back into the last period.

use tracing::{debug, warn};

use crate::catalog::PackCatalog;
use crate::error::{AllocationError, Result};
use crate::solver::{AllocationStrategy, search_bound};
use crate::trace::{ResultAssembler, Trace};
use crate::types::{Fulfillment, PackSize};

const UNREACHABLE: u32 = u32::MAX;
const NO_PREDECESSOR: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedDp;

impl AllocationStrategy for BoundedDp {
    fn name(&self) -> &'static str {
        "bounded-dp"
    }

    fn state_space(&self, order: u64, catalog: &PackCatalog) -> u64 {
        table_len(search_bound(order, catalog), catalog)
    }

    fn solve(&self, order: u64, catalog: &PackCatalog) -> Result<Fulfillment> {
        let bound = search_bound(order, catalog);
        let table = CostTable::build(catalog, bound);
        debug!(
            order,
            bound,
            table_len = table.cost.len(),
            folded = table.is_folded(),
            "bounded dp table built"
        );

        let Some(total) = (order..bound).find(|&t| table.is_reachable(t)) else {
            warn!(order, %catalog, "no reachable total below bound, shipping one smallest pack");
            return Ok(Fulfillment::single(catalog.smallest(), 1));
        };

        table.backtrack(total)
    }
}

/// Entries materialised for totals below `bound`: the bound itself, or one
/// period past the start of the periodic region if that comes first.
fn table_len(bound: u64, catalog: &PackCatalog) -> u64 {
    let period = catalog.largest();
    let periodic_from = period.saturating_mul(period).saturating_add(period);
    bound.min(periodic_from.saturating_add(period))
}

/// Cost and predecessor tables for one solve.
struct CostTable<'a> {
    catalog: &'a PackCatalog,
    /// Fewest packs summing exactly to the index.
    cost: Vec<u32>,
    /// Catalog index of the last pack on that path.
    pred: Vec<u32>,
    /// Start of the periodic region, `M² + M`. Only meaningful when folded.
    periodic_from: u64,
    period: u64,
}

impl<'a> CostTable<'a> {
    fn build(catalog: &'a PackCatalog, bound: u64) -> Self {
        let period = catalog.largest();
        let periodic_from = period.saturating_mul(period).saturating_add(period);
        let len = table_len(bound, catalog) as usize;

        let mut cost = vec![UNREACHABLE; len];
        let mut pred = vec![NO_PREDECESSOR; len];
        if let Some(first) = cost.first_mut() {
            *first = 0;
        }

        let sizes = catalog.sizes();
        for t in 1..len {
            for (i, &size) in sizes.iter().enumerate() {
                let size = size as usize;
                if size > t {
                    break;
                }
                let prev = cost[t - size];
                if prev != UNREACHABLE && prev + 1 < cost[t] {
                    cost[t] = prev + 1;
                    pred[t] = i as u32;
                }
            }
        }

        Self {
            catalog,
            cost,
            pred,
            periodic_from,
            period,
        }
    }

    fn len(&self) -> u64 {
        self.cost.len() as u64
    }

    fn is_folded(&self) -> bool {
        self.len() == self.periodic_from.saturating_add(self.period)
    }

    /// Maps `total` onto the table index holding the same reachability and
    /// predecessor.
    fn fold(&self, total: u64) -> u64 {
        if total < self.len() {
            total
        } else {
            self.periodic_from + (total - self.periodic_from) % self.period
        }
    }

    fn is_reachable(&self, total: u64) -> bool {
        self.cost
            .get(self.fold(total) as usize)
            .is_some_and(|&c| c != UNREACHABLE)
    }

    fn backtrack(&self, terminal: u64) -> Result<Fulfillment> {
        let mut assembler = ResultAssembler::new();
        let mut total = terminal;
        if self.is_folded() && total >= self.len() {
            total = self.skip_cycles(total, &mut assembler)?;
        }
        assembler.walk(self, total)?;
        Ok(assembler.finish())
    }

    /// Walks the periodic region until a residue repeats, then applies the
    /// repeating stretch as many times as it fits above `periodic_from`.
    /// Returns the total left to walk.
    fn skip_cycles(&self, mut total: u64, assembler: &mut ResultAssembler) -> Result<u64> {
        let mut first_seen: Vec<Option<(usize, u64)>> = vec![None; self.period as usize];
        let mut steps: Vec<PackSize> = Vec::new();

        while total >= self.periodic_from {
            let residue = ((total - self.periodic_from) % self.period) as usize;
            if let Some((start, seen_at)) = first_seen[residue] {
                let span = seen_at - total;
                let cycles = (total - self.periodic_from) / span;
                for &size in &steps[start..] {
                    assembler.add(size, cycles);
                }
                return Ok(total - cycles * span);
            }
            first_seen[residue] = Some((steps.len(), total));

            let size = self
                .predecessor(total)
                .filter(|&size| size <= total)
                .ok_or(AllocationError::TraceCorruption { total })?;
            assembler.add(size, 1);
            steps.push(size);
            total -= size;
        }
        Ok(total)
    }
}

impl Trace for CostTable<'_> {
    fn predecessor(&self, total: u64) -> Option<PackSize> {
        let index = *self.pred.get(self.fold(total) as usize)?;
        self.catalog.sizes().get(index as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain table over the whole bound, no folding.
    fn unfolded(order: u64, catalog: &PackCatalog) -> Fulfillment {
        let bound = search_bound(order, catalog) as usize;
        let mut cost = vec![UNREACHABLE; bound];
        let mut pred = vec![0u64; bound];
        cost[0] = 0;
        for t in 1..bound {
            for size in catalog.iter() {
                let s = size as usize;
                if s <= t && cost[t - s] != UNREACHABLE && cost[t - s] + 1 < cost[t] {
                    cost[t] = cost[t - s] + 1;
                    pred[t] = size;
                }
            }
        }
        let mut t = (order as usize..bound)
            .find(|&t| cost[t] != UNREACHABLE)
            .unwrap();
        let mut f = Fulfillment::new();
        while t > 0 {
            f.add(pred[t], 1);
            t -= pred[t] as usize;
        }
        f
    }

    #[test]
    fn test_small_order_is_not_folded() {
        let catalog = PackCatalog::new([250, 500, 1000, 2000, 5000]).unwrap();
        let table = CostTable::build(&catalog, search_bound(12001, &catalog));
        assert!(!table.is_folded());
        assert_eq!(table.len(), 17001);
    }

    #[test]
    fn test_large_order_is_folded() {
        let catalog = PackCatalog::new([23, 31, 53]).unwrap();
        let table = CostTable::build(&catalog, search_bound(500_000, &catalog));
        assert!(table.is_folded());
        assert_eq!(table.len(), 53 * 53 + 2 * 53);
    }

    #[test]
    fn test_folded_matches_unfolded() {
        let catalogs = [vec![3, 5], vec![4, 6, 9], vec![2], vec![6, 10, 15], vec![1, 7, 11]];
        for sizes in catalogs {
            let catalog = PackCatalog::new(sizes).unwrap();
            for order in [1, 50, 199, 500, 1_001, 7_777, 20_000] {
                assert_eq!(
                    BoundedDp.solve(order, &catalog).unwrap(),
                    unfolded(order, &catalog),
                    "catalog {catalog}, order {order}"
                );
            }
        }
    }

    #[test]
    fn test_unreachable_residues_are_skipped() {
        // Only even totals are reachable.
        let catalog = PackCatalog::new([4, 6]).unwrap();
        let f = BoundedDp.solve(1_000_001, &catalog).unwrap();
        assert_eq!(f.total_items(), 1_000_002);
        assert_eq!(f, unfolded(1_000_001, &catalog));
    }

    #[test]
    fn test_single_size_billion() {
        let catalog = PackCatalog::new([7]).unwrap();
        let f = BoundedDp.solve(1_000_000_000, &catalog).unwrap();
        assert_eq!(f.get(7), 142_857_143);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn test_billion_items_standard_catalog() {
        let catalog = PackCatalog::new([250, 500, 1000, 2000, 5000]).unwrap();
        let f = BoundedDp.solve(1_000_000_000, &catalog).unwrap();
        assert_eq!(f, Fulfillment::single(5000, 200_000));
    }
}
