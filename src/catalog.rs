//! Catalog types: categories, assets, palettes and camera placements.
//!
//! Gateway responses arrive as loosely-typed records ([`CategoryRecord`],
//! [`AssetRecord`]). They are validated into [`Category`] and [`Asset`] at
//! this boundary; malformed records are rejected instead of trusted.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::CatalogError;
use crate::material::parse_color;

// ============================================================================
// Gateway Records
// ============================================================================

/// Raw `CustomizationGroups` record as served by the backend.
///
/// Every field tolerates `null` or absence and falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub collection_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Number fields may carry decimals.
    #[serde(deserialize_with = "null_as_default")]
    pub position: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub removable: bool,
    /// Asset id, or `""` when unset.
    #[serde(deserialize_with = "null_as_default")]
    pub starting_asset: String,
    #[serde(deserialize_with = "null_as_default")]
    pub expand: CategoryExpand,
}

/// Expanded relations of a category record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryExpand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<PaletteRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_placement: Option<CameraPlacementRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub colors: Vec<String>,
}

/// Camera placement as stored: either vector may be an empty JSON field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraPlacementRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub position: Option<[f32; 3]>,
    pub target: Option<[f32; 3]>,
}

/// Raw `CustomizationAssets` record as served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub collection_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Owning category id.
    #[serde(deserialize_with = "null_as_default")]
    pub group: String,
    #[serde(deserialize_with = "null_as_default")]
    pub locked_groups: Vec<String>,
    /// Model file name.
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub thumbnail: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created: String,
}

/// Reads `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Ordered color palette of a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorPalette {
    pub id: String,
    pub colors: Vec<String>,
}

impl ColorPalette {
    /// First color, used as a category's initial color.
    pub fn first(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Camera position and look-at target in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl CameraPlacement {
    pub const fn new(position: [f32; 3], target: [f32; 3]) -> Self {
        Self { position, target }
    }
}

/// A selectable item belonging to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub name: String,
    /// Owning category id.
    pub group: String,
    /// Category ids this asset hides when equipped.
    pub locked_groups: Vec<String>,
    pub collection_id: String,
    /// Model file name, if the record has one.
    pub model: Option<String>,
    pub thumbnail: Option<String>,
    pub created: String,
}

impl Asset {
    /// Returns true if equipping this asset hides the given category id.
    pub fn locks(&self, category_id: &str) -> bool {
        self.locked_groups.iter().any(|g| g == category_id)
    }
}

impl TryFrom<AssetRecord> for Asset {
    type Error = CatalogError;

    fn try_from(record: AssetRecord) -> Result<Self, Self::Error> {
        require("asset", "id", &record.id)?;
        require("asset", "name", &record.name)?;
        require("asset", "group", &record.group)?;

        Ok(Self {
            id: record.id,
            name: record.name,
            group: record.group,
            locked_groups: record
                .locked_groups
                .into_iter()
                .filter(|g| !g.is_empty())
                .collect(),
            collection_id: record.collection_id,
            model: non_empty(record.url),
            thumbnail: non_empty(record.thumbnail),
            created: record.created,
        })
    }
}

/// A named avatar slot holding zero or one selected asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub position: f64,
    /// Assets of this category, newest first.
    pub assets: Vec<Arc<Asset>>,
    /// Whether the slot may be left empty.
    pub removable: bool,
    pub color_palette: Option<ColorPalette>,
    pub camera_placement: Option<CameraPlacement>,
    /// Id of the asset selected on first load.
    pub starting_asset: Option<String>,
    pub collection_id: String,
}

impl Category {
    /// Validates a record. The asset list starts empty; see [`Catalog::assemble`].
    pub fn from_record(record: CategoryRecord) -> Result<Self, CatalogError> {
        require("category", "id", &record.id)?;
        require("category", "name", &record.name)?;

        let color_palette = record.expand.color_palette.map(|palette| {
            let colors = palette
                .colors
                .into_iter()
                .filter(|color| match parse_color(color) {
                    Ok(_) => true,
                    Err(e) => {
                        warn!("Dropping palette color in category {}: {}", record.name, e);
                        false
                    }
                })
                .collect();
            ColorPalette {
                id: palette.id,
                colors,
            }
        });

        let camera_placement = record.expand.camera_placement.and_then(|c| {
            match (c.position, c.target) {
                (Some(position), Some(target)) => Some(CameraPlacement::new(position, target)),
                _ => {
                    warn!("Ignoring incomplete camera placement in category {}", record.name);
                    None
                }
            }
        });

        Ok(Self {
            id: record.id,
            name: record.name,
            position: record.position,
            assets: Vec::new(),
            removable: record.removable,
            color_palette,
            camera_placement,
            starting_asset: non_empty(record.starting_asset),
            collection_id: record.collection_id,
        })
    }

    /// Palette colors, empty if the category has no palette.
    pub fn colors(&self) -> &[String] {
        self.color_palette
            .as_ref()
            .map(|p| p.colors.as_slice())
            .unwrap_or(&[])
    }

    /// First palette color.
    pub fn default_color(&self) -> Option<&str> {
        self.color_palette.as_ref().and_then(ColorPalette::first)
    }

    /// The designated starting asset, if it is among this category's assets.
    pub fn starting(&self) -> Option<&Arc<Asset>> {
        let id = self.starting_asset.as_deref()?;
        self.find_asset(id)
    }

    pub fn find_asset(&self, asset_id: &str) -> Option<&Arc<Asset>> {
        self.assets.iter().find(|a| a.id == asset_id)
    }
}

fn require(record: &'static str, field: &'static str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        Err(CatalogError::MissingField { record, field })
    } else {
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

// ============================================================================
// Catalog
// ============================================================================

/// Validated categories with their assets attached.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub categories: Vec<Arc<Category>>,
    /// Every valid asset, in gateway order.
    pub assets: Vec<Arc<Asset>>,
}

impl Catalog {
    /// Validates records and partitions assets into their owning category.
    ///
    /// Record order is preserved. Invalid records are dropped with a warning.
    pub fn assemble(categories: Vec<CategoryRecord>, assets: Vec<AssetRecord>) -> Self {
        let assets: Vec<Arc<Asset>> = assets
            .into_iter()
            .filter_map(|record| match Asset::try_from(record) {
                Ok(asset) => Some(Arc::new(asset)),
                Err(e) => {
                    warn!("Skipping asset: {}", e);
                    None
                }
            })
            .collect();

        let categories = categories
            .into_iter()
            .filter_map(|record| match Category::from_record(record) {
                Ok(mut category) => {
                    category.assets = assets
                        .iter()
                        .filter(|a| a.group == category.id)
                        .cloned()
                        .collect();
                    Some(Arc::new(category))
                }
                Err(e) => {
                    warn!("Skipping category: {}", e);
                    None
                }
            })
            .collect();

        Self { categories, assets }
    }

    pub fn category_by_id(&self, id: &str) -> Option<&Arc<Category>> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Arc<Category>> {
        self.categories.iter().find(|c| c.name == name)
    }
}
