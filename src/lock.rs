//! Lock resolution.
//!
//! An equipped asset may declare categories it conflicts with (a full helmet
//! hides hair, a dress hides the bottom). [`resolve_locked_groups`] derives,
//! from the current selections, which categories are hidden and by what.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Category;
use crate::customization::Customization;

/// An asset that hides a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockingAsset {
    /// Name of the locking asset.
    pub name: String,
    /// Name of the category the locking asset belongs to.
    pub category_name: String,
}

/// Hidden categories keyed by name, with the assets hiding them.
///
/// A name is present iff at least one selected asset locks that category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockedGroups(BTreeMap<String, Vec<LockingAsset>>);

impl LockedGroups {
    /// Returns true if the category is hidden.
    pub fn is_locked(&self, category_name: &str) -> bool {
        self.0.contains_key(category_name)
    }

    /// Assets hiding the category, in catalog order.
    pub fn lockers(&self, category_name: &str) -> &[LockingAsset] {
        self.0.get(category_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LockingAsset])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Recomputes locked groups from scratch.
///
/// Categories are scanned in catalog order. A lock naming an unknown
/// category id is dropped with a warning. A locking asset whose own group
/// is unknown is attributed to the slot it is selected in.
pub fn resolve_locked_groups(
    categories: &[Arc<Category>],
    customization: &Customization,
) -> LockedGroups {
    let name_of = |id: &str| {
        categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    };

    let mut locked: BTreeMap<String, Vec<LockingAsset>> = BTreeMap::new();

    for category in categories {
        let Some(asset) = customization.asset(&category.name) else {
            continue;
        };

        for group in &asset.locked_groups {
            let Some(locked_name) = name_of(group.as_str()) else {
                warn!(
                    "Asset {} locks unknown category id {}; ignoring",
                    asset.name, group
                );
                continue;
            };

            let category_name = match name_of(asset.group.as_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!(
                        "Asset {} belongs to unknown category id {}",
                        asset.name, asset.group
                    );
                    category.name.clone()
                }
            };

            locked
                .entry(locked_name.to_string())
                .or_default()
                .push(LockingAsset {
                    name: asset.name.clone(),
                    category_name,
                });
        }
    }

    LockedGroups(locked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AssetRecord, Catalog, CategoryRecord};
    use crate::customization::Selection;

    fn catalog() -> Catalog {
        let category = |id: &str, name: &str| CategoryRecord {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        };
        let asset = |id: &str, name: &str, group: &str, locks: &[&str]| AssetRecord {
            id: id.into(),
            name: name.into(),
            group: group.into(),
            locked_groups: locks.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };

        Catalog::assemble(
            vec![
                category("c_hats", "Hats"),
                category("c_hair", "Hair"),
                category("c_outfit", "Outfit"),
                category("c_top", "Top"),
            ],
            vec![
                asset("helmet", "Helmet", "c_hats", &["c_hair"]),
                asset("cap", "Cap", "c_hats", &[]),
                asset("bob", "Bob", "c_hair", &[]),
                asset("suit", "Space Suit", "c_outfit", &["c_hair", "c_top"]),
                asset("ghost", "Ghost", "c_outfit", &["c_deleted"]),
            ],
        )
    }

    fn select(catalog: &Catalog, picks: &[(&str, &str)]) -> Customization {
        catalog
            .categories
            .iter()
            .map(|c| {
                let asset = picks
                    .iter()
                    .find(|(cat, _)| *cat == c.name)
                    .and_then(|(_, id)| c.find_asset(id).cloned());
                (c.name.clone(), Selection::new(asset, None))
            })
            .collect()
    }

    #[test]
    fn helmet_locks_hair() {
        let catalog = catalog();
        let custom = select(&catalog, &[("Hats", "helmet"), ("Hair", "bob")]);

        let locked = resolve_locked_groups(&catalog.categories, &custom);

        assert_eq!(locked.len(), 1);
        assert_eq!(
            locked.lockers("Hair"),
            [LockingAsset {
                name: "Helmet".into(),
                category_name: "Hats".into()
            }]
        );
    }

    #[test]
    fn deselecting_removes_the_key() {
        let catalog = catalog();
        let custom = select(&catalog, &[("Hats", "cap"), ("Hair", "bob")]);

        let locked = resolve_locked_groups(&catalog.categories, &custom);

        assert!(!locked.is_locked("Hair"));
        assert!(locked.is_empty());
    }

    #[test]
    fn multiple_lockers_in_catalog_order() {
        let catalog = catalog();
        let custom = select(&catalog, &[("Outfit", "suit"), ("Hats", "helmet")]);

        let locked = resolve_locked_groups(&catalog.categories, &custom);

        let hair: Vec<_> = locked.lockers("Hair").iter().map(|l| l.name.as_str()).collect();
        assert_eq!(hair, ["Helmet", "Space Suit"]);
        assert_eq!(locked.lockers("Top")[0].category_name, "Outfit");
    }

    #[test]
    fn unknown_lock_target_is_inert() {
        let catalog = catalog();
        let custom = select(&catalog, &[("Outfit", "ghost")]);

        let locked = resolve_locked_groups(&catalog.categories, &custom);

        assert!(locked.is_empty());
        assert!(!locked.is_locked(""));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let catalog = catalog();
        let custom = select(&catalog, &[("Outfit", "suit"), ("Hats", "helmet")]);

        let first = resolve_locked_groups(&catalog.categories, &custom);
        let second = resolve_locked_groups(&catalog.categories, &custom);

        assert_eq!(first, second);
    }

    #[test]
    fn serializes_as_plain_map() {
        let catalog = catalog();
        let custom = select(&catalog, &[("Hats", "helmet")]);
        let locked = resolve_locked_groups(&catalog.categories, &custom);

        let json = serde_json::to_string(&locked).unwrap();
        assert_eq!(json, r#"{"Hair":[{"name":"Helmet","categoryName":"Hats"}]}"#);
    }
}
