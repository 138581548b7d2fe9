use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of items held by one pack.
pub type PackSize = u64;

/// Number of packs of a single size.
pub type PackQuantity = u64;

/// The packs chosen for one order, keyed by pack size.
///
/// Only sizes with a positive count are stored, so two fulfillments that ship
/// the same packs always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fulfillment {
    packs: BTreeMap<PackSize, PackQuantity>,
}

impl Fulfillment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fulfillment made of `count` packs of a single size.
    pub fn single(size: PackSize, count: PackQuantity) -> Self {
        let mut fulfillment = Self::new();
        fulfillment.add(size, count);
        fulfillment
    }

    pub fn add(&mut self, size: PackSize, count: PackQuantity) {
        if count == 0 {
            return;
        }
        *self.packs.entry(size).or_insert(0) += count;
    }

    pub fn get(&self, size: PackSize) -> PackQuantity {
        self.packs.get(&size).copied().unwrap_or(0)
    }

    /// Iterates `(size, count)` pairs in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (PackSize, PackQuantity)> + '_ {
        self.packs.iter().map(|(&size, &count)| (size, count))
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Number of distinct sizes used.
    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn pack_count(&self) -> u64 {
        self.packs.values().sum()
    }

    pub fn total_items(&self) -> u64 {
        self.packs.iter().map(|(size, count)| size * count).sum()
    }

    /// Items shipped beyond `order`, zero if the order is not covered.
    pub fn overage(&self, order: u64) -> u64 {
        self.total_items().saturating_sub(order)
    }
}

impl FromIterator<(PackSize, PackQuantity)> for Fulfillment {
    fn from_iter<I: IntoIterator<Item = (PackSize, PackQuantity)>>(iter: I) -> Self {
        let mut fulfillment = Self::new();
        for (size, count) in iter {
            fulfillment.add(size, count);
        }
        fulfillment
    }
}

impl std::fmt::Display for Fulfillment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (size, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{size}:{count}")?;
        }
        write!(f, "}}")
    }
}
