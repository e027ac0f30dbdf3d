//! Serializable customization profile for saving and sharing a look.
//!
//! A [`CustomizationProfile`] captures every category's selection by asset
//! id in a format that can be serialized to JSON and later re-applied to a
//! [`Configurator`](crate::Configurator) loaded with the same catalog.
//!
//! # Example
//!
//! ```
//! use avatar_configurator::{CustomizationProfile, SelectionSettings};
//!
//! let profile = CustomizationProfile::new()
//!     .with_selection("Hats", SelectionSettings::new(Some("helmet"), Some("#ff0000")))
//!     .with_skin_color("#8d5524");
//!
//! let json = profile.to_json().unwrap();
//! let restored = CustomizationProfile::from_json(&json).unwrap();
//! assert_eq!(restored.skin_color.as_deref(), Some("#8d5524"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Selection Settings
// ============================================================================

/// Serializable selection of one category.
///
/// ```json
/// { "assetId": "helmet", "color": "#ff0000" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSettings {
    /// Id of the selected asset. `None` means the slot is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectionSettings {
    pub fn new(asset_id: Option<&str>, color: Option<&str>) -> Self {
        Self {
            asset_id: asset_id.map(str::to_string),
            color: color.map(str::to_string),
        }
    }
}

// ============================================================================
// CustomizationProfile
// ============================================================================

/// A serializable snapshot of an avatar's customization.
///
/// # JSON Format
///
/// ```json
/// {
///   "selections": {
///     "Hats": { "assetId": "helmet", "color": "#ff0000" },
///     "Glasses": {}
///   },
///   "skinColor": "#f5c6a5"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationProfile {
    /// Selections keyed by category name.
    #[serde(default)]
    pub selections: BTreeMap<String, SelectionSettings>,

    /// Skin color. `None` leaves the skin untouched when applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_color: Option<String>,
}

impl CustomizationProfile {
    /// Creates an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the selection for a category.
    pub fn with_selection(mut self, category: impl Into<String>, settings: SelectionSettings) -> Self {
        self.selections.insert(category.into(), settings);
        self
    }

    /// Sets the skin color.
    pub fn with_skin_color(mut self, color: impl Into<String>) -> Self {
        self.skin_color = Some(color.into());
        self
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_json_format() {
        let profile = CustomizationProfile::new()
            .with_selection("Hats", SelectionSettings::new(Some("helmet"), None))
            .with_skin_color("#8d5524");

        let json = profile.to_json_pretty().unwrap();

        // camelCase keys, empty fields omitted
        assert!(json.contains("\"assetId\""));
        assert!(json.contains("\"skinColor\""));
        assert!(!json.contains("\"color\""));
    }

    #[test]
    fn empty_slot_round_trips_as_empty_object() {
        let profile =
            CustomizationProfile::new().with_selection("Glasses", SelectionSettings::default());

        let json = profile.to_json().unwrap();
        assert_eq!(json, r#"{"selections":{"Glasses":{}}}"#);
        assert_eq!(CustomizationProfile::from_json(&json).unwrap(), profile);
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile = CustomizationProfile::from_json("{}").unwrap();

        assert!(profile.selections.is_empty());
        assert!(profile.skin_color.is_none());
    }
}
