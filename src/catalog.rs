use serde::Serialize;

use crate::error::CatalogError;
use crate::types::PackSize;

/// Validated set of pack sizes, sorted ascending.
///
/// Never empty, every size positive, no duplicates. A catalog is immutable;
/// changing the offered sizes means building a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackCatalog {
    sizes: Vec<PackSize>,
}

impl PackCatalog {
    pub fn new<I>(sizes: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut normalized = Vec::new();
        for size in sizes {
            if size <= 0 {
                return Err(CatalogError::NonPositive(size));
            }
            normalized.push(size as PackSize);
        }
        if normalized.is_empty() {
            return Err(CatalogError::Empty);
        }

        normalized.sort_unstable();
        if let Some(pair) = normalized.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(CatalogError::Duplicate(pair[0]));
        }

        Ok(Self { sizes: normalized })
    }

    pub fn sizes(&self) -> &[PackSize] {
        &self.sizes
    }

    pub fn iter(&self) -> impl Iterator<Item = PackSize> + '_ {
        self.sizes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn smallest(&self) -> PackSize {
        self.sizes[0]
    }

    pub fn largest(&self) -> PackSize {
        self.sizes[self.sizes.len() - 1]
    }

    pub fn contains(&self, size: PackSize) -> bool {
        self.sizes.binary_search(&size).is_ok()
    }

    /// Sizes as signed values, the form accepted by [`PackCatalog::new`].
    pub(crate) fn to_signed(&self) -> Vec<i64> {
        self.sizes.iter().map(|&size| size as i64).collect()
    }
}

impl<'a> IntoIterator for &'a PackCatalog {
    type Item = PackSize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, PackSize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sizes.iter().copied()
    }
}

impl std::fmt::Display for PackCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sizes: Vec<String> = self.sizes.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", sizes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_ascending() {
        let catalog = PackCatalog::new([5000, 250, 1000, 500, 2000]).unwrap();
        assert_eq!(catalog.sizes(), &[250, 500, 1000, 2000, 5000]);
        assert_eq!(catalog.smallest(), 250);
        assert_eq!(catalog.largest(), 5000);
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_membership() {
        let catalog = PackCatalog::new([23, 31, 53]).unwrap();
        assert!(catalog.contains(31));
        assert!(!catalog.contains(30));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(PackCatalog::new(Vec::<i64>::new()), Err(CatalogError::Empty));
    }

    #[test]
    fn test_rejects_zero() {
        assert_eq!(
            PackCatalog::new([250, 0, 500]),
            Err(CatalogError::NonPositive(0))
        );
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(
            PackCatalog::new([250, -500]),
            Err(CatalogError::NonPositive(-500))
        );
    }

    #[test]
    fn test_rejects_duplicate() {
        assert_eq!(
            PackCatalog::new([500, 250, 500]),
            Err(CatalogError::Duplicate(500))
        );
    }

    #[test]
    fn test_single_size_catalog() {
        let catalog = PackCatalog::new([7]).unwrap();
        assert_eq!(catalog.smallest(), catalog.largest());
        assert_eq!(catalog.to_string(), "[7]");
    }
}
