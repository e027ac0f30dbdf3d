//! Camera placement for the preview.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::ops::RangeInclusive;

use crate::catalog::{CameraPlacement, Category};
use crate::mode::Mode;

/// Far-away shot used while the catalog is still loading.
pub const START_PLACEMENT: CameraPlacement =
    CameraPlacement::new([500.0, 10.0, 1000.0], [0.0, 0.0, 0.0]);

/// Full-body shot used in photo mode and for categories without a placement.
pub const DEFAULT_PLACEMENT: CameraPlacement =
    CameraPlacement::new([-1.0, 1.0, 5.0], [0.0, 0.0, 0.0]);

/// Limits applied to the user-controlled orbit camera.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitLimits {
    /// Polar angle range in radians.
    pub polar: RangeInclusive<f32>,
    /// Distance range from the target.
    pub distance: RangeInclusive<f32>,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            polar: FRAC_PI_4..=FRAC_PI_2,
            distance: 2.0..=8.0,
        }
    }
}

/// Where the camera should be and whether to animate getting there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraShot {
    pub placement: CameraPlacement,
    pub transition: bool,
}

/// Picks the camera shot for the current UI state.
///
/// `catalog_loading` is the configurator's loading flag; `scene_loading` is
/// true while the render layer is still streaming asset models.
pub fn resolve_camera(
    catalog_loading: bool,
    scene_loading: bool,
    mode: Mode,
    focused: Option<&Category>,
) -> CameraShot {
    if catalog_loading {
        return CameraShot {
            placement: START_PLACEMENT,
            transition: false,
        };
    }

    let placement = focused
        .filter(|_| !scene_loading && mode == Mode::Customize)
        .and_then(|category| category.camera_placement)
        .unwrap_or(DEFAULT_PLACEMENT);

    CameraShot {
        placement,
        transition: true,
    }
}
