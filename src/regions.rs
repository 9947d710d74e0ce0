//! Region catalog for the rate estimator.
//!
//! Holds the named bounding boxes loaded from `regions.toml` and answers
//! "what box does this region name refer to?". This is the single source of
//! truth for region names; callers look regions up here rather than carrying
//! coordinates around.

use std::collections::HashMap;

use crate::model::{CatalogError, Region};

/// Read-only table of regions keyed by name. Preserves definition order.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    index: HashMap<String, usize>,
}

impl RegionCatalog {
    /// Builds a catalog, rejecting duplicate names and malformed boxes.
    ///
    /// Bounds are checked again here because `Region` can also be built as
    /// a struct literal or deserialized directly.
    pub fn new(regions: Vec<Region>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if !region.bounds.is_well_formed() {
                return Err(CatalogError::InvalidBounds {
                    name: region.name.clone(),
                    bounds: region.bounds,
                });
            }
            if index.insert(region.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateRegion(region.name.clone()));
            }
        }
        Ok(Self { regions, index })
    }

    /// Finds a region by exact name.
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.index.get(name).and_then(|&i| self.regions.get(i))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
