//! Per-category selection state.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{Asset, Category};

/// The selection held by one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Shared reference into the catalog. Never copied.
    pub asset: Option<Arc<Asset>>,
    pub color: Option<String>,
}

impl Selection {
    pub fn new(asset: Option<Arc<Asset>>, color: Option<String>) -> Self {
        Self { asset, color }
    }

    /// Id of the selected asset.
    pub fn asset_id(&self) -> Option<&str> {
        self.asset.as_deref().map(|a| a.id.as_str())
    }
}

/// Complete selection state, keyed by category name.
///
/// Holds one entry per known category. Entries are only ever updated,
/// never inserted or removed after initialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customization {
    entries: BTreeMap<String, Selection>,
}

impl Customization {
    /// Initial selections: starting asset and first palette color.
    pub fn initial(categories: &[Arc<Category>]) -> Self {
        categories
            .iter()
            .map(|category| {
                let selection = Selection::new(
                    category.starting().cloned(),
                    category.default_color().map(str::to_string),
                );
                (category.name.clone(), selection)
            })
            .collect()
    }

    pub fn get(&self, category_name: &str) -> Option<&Selection> {
        self.entries.get(category_name)
    }

    pub(crate) fn get_mut(&mut self, category_name: &str) -> Option<&mut Selection> {
        self.entries.get_mut(category_name)
    }

    /// Selected asset of a category.
    pub fn asset(&self, category_name: &str) -> Option<&Arc<Asset>> {
        self.get(category_name).and_then(|s| s.asset.as_ref())
    }

    /// Selected color of a category.
    pub fn color(&self, category_name: &str) -> Option<&str> {
        self.get(category_name).and_then(|s| s.color.as_deref())
    }

    pub fn contains(&self, category_name: &str) -> bool {
        self.entries.contains_key(category_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by category name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Selection)> for Customization {
    fn from_iter<I: IntoIterator<Item = (String, Selection)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
