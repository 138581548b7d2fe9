//! Best-first search over partial totals.
//!
//! States are totals, each catalog size is an edge of weight one. The frontier
//! pops the lowest total first and the lowest pack count second. Edges only
//! increase the total, so by the time a total is popped every smaller total
//! has already been expanded and its pack count is final. The first popped
//! total at or above the order is therefore the smallest reachable one, with
//! its fewest-packs path.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use tracing::{debug, error};

use crate::catalog::PackCatalog;
use crate::error::{AllocationError, Result};
use crate::solver::AllocationStrategy;
use crate::trace::{Trace, assemble};
use crate::types::{Fulfillment, PackSize};

#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frontier {
    total: u64,
    packs: u64,
}

// Reversed so that `BinaryHeap` pops the lowest total, then the lowest count.
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total
            .cmp(&self.total)
            .then_with(|| other.packs.cmp(&self.packs))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    packs: u64,
    /// Last pack on the best known path, zero for the start state.
    last: PackSize,
}

/// Best known pack count and last pack per visited total.
#[derive(Debug, Default)]
struct VisitMap {
    visits: HashMap<u64, Visit>,
}

impl VisitMap {
    fn packs(&self, total: u64) -> Option<u64> {
        self.visits.get(&total).map(|v| v.packs)
    }

    /// Records the edge `size` into `total`. Returns true when the pack count
    /// improved and the total needs (re)queueing.
    ///
    /// On an equal count the smaller size wins, which matches the ascending
    /// strict relaxation of the DP table.
    fn relax(&mut self, total: u64, packs: u64, size: PackSize) -> bool {
        match self.visits.entry(total) {
            Entry::Vacant(e) => {
                e.insert(Visit { packs, last: size });
                true
            }
            Entry::Occupied(mut e) => {
                let visit = e.get_mut();
                if packs < visit.packs {
                    *visit = Visit { packs, last: size };
                    true
                } else {
                    if packs == visit.packs && size < visit.last {
                        visit.last = size;
                    }
                    false
                }
            }
        }
    }
}

impl Trace for VisitMap {
    fn predecessor(&self, total: u64) -> Option<PackSize> {
        self.visits
            .get(&total)
            .map(|v| v.last)
            .filter(|&last| last > 0)
    }
}

impl AllocationStrategy for ShortestPath {
    fn name(&self) -> &'static str {
        "shortest-path"
    }

    fn solve(&self, order: u64, catalog: &PackCatalog) -> Result<Fulfillment> {
        let mut visits = VisitMap::default();
        let mut frontier = BinaryHeap::new();
        visits.relax(0, 0, 0);
        frontier.push(Frontier { total: 0, packs: 0 });

        let mut expanded = 0u64;
        while let Some(Frontier { total, packs }) = frontier.pop() {
            if visits.packs(total).is_some_and(|best| packs > best) {
                continue;
            }

            if total >= order {
                debug!(
                    order,
                    total,
                    expanded,
                    visited = visits.visits.len(),
                    "shortest path reached order"
                );
                return assemble(&visits, total);
            }

            expanded += 1;
            for size in catalog {
                let Some(next_total) = total.checked_add(size) else {
                    continue;
                };
                let next = Frontier {
                    total: next_total,
                    packs: packs + 1,
                };
                if visits.relax(next.total, next.packs, size) {
                    frontier.push(next);
                }
            }
        }

        error!(order, %catalog, expanded, "frontier exhausted without reaching order");
        Err(AllocationError::FrontierExhausted { order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontier_pops_lowest_total_then_lowest_count() {
        let mut heap = BinaryHeap::new();
        heap.push(Frontier { total: 500, packs: 1 });
        heap.push(Frontier { total: 250, packs: 3 });
        heap.push(Frontier { total: 250, packs: 1 });
        heap.push(Frontier { total: 1000, packs: 1 });

        let order: Vec<(u64, u64)> = std::iter::from_fn(|| heap.pop())
            .map(|f| (f.total, f.packs))
            .collect();
        assert_eq!(order, vec![(250, 1), (250, 3), (500, 1), (1000, 1)]);
    }

    #[test]
    fn test_relax_prefers_fewer_packs_then_smaller_size() {
        let mut visits = VisitMap::default();
        assert!(visits.relax(750, 3, 250));
        assert!(visits.relax(750, 2, 500));
        assert!(!visits.relax(750, 2, 250));
        assert_eq!(visits.predecessor(750), Some(250));
        assert!(!visits.relax(750, 4, 5));
        assert_eq!(visits.packs(750), Some(2));
    }

    #[test]
    fn test_start_state_has_no_predecessor() {
        let mut visits = VisitMap::default();
        visits.relax(0, 0, 0);
        assert_eq!(visits.predecessor(0), None);
    }

    #[test]
    fn test_prefers_fewer_items_over_fewer_packs() {
        let catalog = PackCatalog::new([250, 500, 1000]).unwrap();
        let f = ShortestPath.solve(501, &catalog).unwrap();
        assert_eq!(f.total_items(), 750);
        assert_eq!(f.pack_count(), 2);
    }

    #[test]
    fn test_order_below_smallest_pack() {
        let catalog = PackCatalog::new([23, 31, 53]).unwrap();
        let f = ShortestPath.solve(5, &catalog).unwrap();
        assert_eq!(f, Fulfillment::single(23, 1));
    }

    #[test]
    fn test_exhausted_frontier_is_an_error() {
        // Every total past two packs overflows, so the frontier drains below the order.
        let catalog = PackCatalog::new([i64::MAX]).unwrap();
        assert_eq!(
            ShortestPath.solve(u64::MAX, &catalog),
            Err(AllocationError::FrontierExhausted { order: u64::MAX })
        );
    }
}
