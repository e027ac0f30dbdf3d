//! The shared skin material.
//!
//! Every body mesh references one skin material. Changing its color is
//! an in-place update observed by all holders on their next read.

use std::fmt;
use std::sync::Arc;

use palette::Srgb;
use parking_lot::RwLock;

use crate::error::ColorError;

/// Default skin tone (`#f5c6a5`).
pub const DEFAULT_SKIN_COLOR: Srgb<u8> = Srgb::new(0xf5, 0xc6, 0xa5);

/// Default skin roughness.
pub const DEFAULT_SKIN_ROUGHNESS: f32 = 1.0;

/// Parses a hex color string (`#rrggbb`, `rrggbb` or `#rgb`).
pub fn parse_color(input: &str) -> Result<Srgb<u8>, ColorError> {
    input.trim().parse::<Srgb<u8>>().map_err(|e| ColorError {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Formats a color as lowercase `#rrggbb`.
pub fn format_color(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MaterialState {
    color: Srgb<u8>,
    roughness: f32,
}

/// Handle to the shared skin material.
///
/// Cloning the handle does not copy the material: all clones observe the
/// same color.
#[derive(Clone)]
pub struct SkinMaterial {
    inner: Arc<RwLock<MaterialState>>,
}

impl Default for SkinMaterial {
    fn default() -> Self {
        Self::new(DEFAULT_SKIN_COLOR, DEFAULT_SKIN_ROUGHNESS)
    }
}

impl fmt::Debug for SkinMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.inner.read();
        f.debug_struct("SkinMaterial")
            .field("color", &format_color(state.color))
            .field("roughness", &state.roughness)
            .finish()
    }
}

impl SkinMaterial {
    pub fn new(color: Srgb<u8>, roughness: f32) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MaterialState {
                color,
                roughness: roughness.clamp(0.0, 1.0),
            })),
        }
    }

    /// Current color.
    pub fn color(&self) -> Srgb<u8> {
        self.inner.read().color
    }

    /// Current color as `#rrggbb`.
    pub fn color_hex(&self) -> String {
        format_color(self.color())
    }

    pub fn roughness(&self) -> f32 {
        self.inner.read().roughness
    }

    /// Sets the color in place.
    pub fn set_color(&self, color: Srgb<u8>) {
        self.inner.write().color = color;
    }

    /// Parses and sets a hex color. The material is unchanged on error.
    pub fn set_color_str(&self, color: &str) -> Result<(), ColorError> {
        let parsed = parse_color(color)?;
        self.set_color(parsed);
        Ok(())
    }

    /// Returns true if both handles point at the same material.
    pub fn shares_with(&self, other: &SkinMaterial) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_skin_tone() {
        let skin = SkinMaterial::default();
        assert_eq!(skin.color_hex(), "#f5c6a5");
        assert_eq!(skin.roughness(), 1.0);
    }

    #[test]
    fn clones_observe_updates() {
        let skin = SkinMaterial::default();
        let mesh_a = skin.clone();
        let mesh_b = skin.clone();

        skin.set_color_str("#3b2219").unwrap();

        assert_eq!(mesh_a.color_hex(), "#3b2219");
        assert_eq!(mesh_b.color(), Srgb::new(0x3b, 0x22, 0x19));
        assert!(mesh_a.shares_with(&mesh_b));
    }

    #[test]
    fn invalid_color_leaves_material_unchanged() {
        let skin = SkinMaterial::default();
        assert!(skin.set_color_str("not-a-color").is_err());
        assert!(skin.set_color_str("").is_err());
        assert_eq!(skin.color(), DEFAULT_SKIN_COLOR);
    }

    #[test]
    fn parse_accepts_common_forms() {
        assert_eq!(parse_color("#ffffff").unwrap(), Srgb::new(255, 255, 255));
        assert_eq!(parse_color("00ff00").unwrap(), Srgb::new(0, 255, 0));
        assert_eq!(format_color(parse_color("#A0B1C2").unwrap()), "#a0b1c2");
    }

    #[test]
    fn separate_materials_are_independent() {
        let a = SkinMaterial::default();
        let b = SkinMaterial::default();
        a.set_color(Srgb::new(0, 0, 0));
        assert!(!a.shares_with(&b));
        assert_eq!(b.color(), DEFAULT_SKIN_COLOR);
    }
}
