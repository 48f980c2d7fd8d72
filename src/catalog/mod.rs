//! Dataset catalog: descriptors grouped by category.
//!
//! The catalog is rebuilt from the checkout on every load. Categories and
//! file names live in sorted maps, so the result does not depend on the
//! order the filesystem enumerates entries in.

pub mod chart;
pub mod descriptor;
pub mod loader;

pub use chart::render_count_chart;
pub use descriptor::DatasetDescriptor;
pub use loader::{LayoutViolation, LoadedCatalog, ParseFailure, load_catalog, load_descriptor};

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<String, BTreeMap<String, DatasetDescriptor>>,
}

impl Catalog {
    /// Insert a descriptor, creating the category on first use.
    pub fn insert(&mut self, category: String, file_name: String, descriptor: DatasetDescriptor) {
        self.categories
            .entry(category)
            .or_default()
            .insert(file_name, descriptor);
    }

    pub fn get(&self, category: &str, file_name: &str) -> Option<&DatasetDescriptor> {
        self.categories.get(category)?.get(file_name)
    }

    /// Descriptors of one category keyed by file name.
    pub fn category(&self, category: &str) -> Option<&BTreeMap<String, DatasetDescriptor>> {
        self.categories.get(category)
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        self.categories
            .iter()
            .map(|(name, files)| (name.clone(), files.len()))
            .collect()
    }

    pub fn dataset_count(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_groups_by_category() {
        let mut catalog = Catalog::default();
        catalog.insert("B".into(), "b1.yml".into(), DatasetDescriptor::default());
        catalog.insert("A".into(), "a1.yml".into(), DatasetDescriptor::default());
        catalog.insert("A".into(), "a2.yml".into(), DatasetDescriptor::default());

        assert_eq!(catalog.categories().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(catalog.dataset_count(), 3);
        assert!(catalog.get("A", "a2.yml").is_some());
        assert!(catalog.get("B", "a2.yml").is_none());
        assert_eq!(catalog.category("A").map(BTreeMap::len), Some(2));
    }
}
