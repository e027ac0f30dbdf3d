//! Attaching asset meshes to the shared avatar skeleton.
//!
//! Every asset model is authored against the same armature. When a model is
//! loaded, its mesh primitives are re-bound to the avatar's one skeleton and
//! each primitive gets a material chosen by naming convention:
//!
//! - a material named `Skin_*` means the primitive shows bare skin and must
//!   use the shared [`SkinMaterial`](crate::SkinMaterial);
//! - otherwise the primitive keeps its first authored material;
//! - materials named `Color_*` are tinted with the category's selected color.
//!
//! The planner only needs to read material names, so any scene-graph type
//! can take part by implementing [`MeshPrimitive`].

use palette::Srgb;
use tracing::warn;

use crate::customization::Customization;
use crate::lock::LockedGroups;
use crate::material::parse_color;

/// Marks a material as the shared skin.
pub const SKIN_MARKER: &str = "Skin_";

/// Marks a material as tintable by the category color.
pub const TINT_MARKER: &str = "Color_";

/// Tint used when a category has no color selected.
pub const DEFAULT_TINT: Srgb<u8> = Srgb::new(255, 255, 255);

/// A renderable primitive of a loaded asset model.
pub trait MeshPrimitive {
    /// Names of the primitive's materials, in slot order.
    fn material_names(&self) -> Vec<&str>;
}

/// Which material a re-attached primitive renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialBinding {
    /// The avatar-wide skin material.
    SharedSkin,
    /// The primitive's own first material.
    Intrinsic,
}

/// One primitive bound to the avatar skeleton.
#[derive(Debug)]
pub struct AttachedPrimitive<'a, P> {
    pub primitive: &'a P,
    pub binding: MaterialBinding,
    /// Material slots to tint with [`AttachmentPlan::tint`].
    pub tinted_slots: Vec<usize>,
}

/// How to show one category's asset on the avatar.
#[derive(Debug)]
pub struct AttachmentPlan<'a, P, S> {
    pub skeleton: &'a S,
    pub tint: Srgb<u8>,
    pub primitives: Vec<AttachedPrimitive<'a, P>>,
}

/// Plans the re-attachment of an asset's primitives.
///
/// Returns `None` if the category is currently locked, in which case the
/// asset is not shown at all.
pub fn plan_attachment<'a, P, S>(
    category_name: &str,
    primitives: &'a [P],
    skeleton: &'a S,
    customization: &Customization,
    locked_groups: &LockedGroups,
) -> Option<AttachmentPlan<'a, P, S>>
where
    P: MeshPrimitive,
{
    if locked_groups.is_locked(category_name) {
        return None;
    }

    let tint = match customization.color(category_name) {
        Some(color) => parse_color(color).unwrap_or_else(|e| {
            warn!("Category {} has an unusable color: {}", category_name, e);
            DEFAULT_TINT
        }),
        None => DEFAULT_TINT,
    };

    let primitives = primitives.iter().map(attach).collect();

    Some(AttachmentPlan {
        skeleton,
        tint,
        primitives,
    })
}

fn attach<P: MeshPrimitive>(primitive: &P) -> AttachedPrimitive<'_, P> {
    let names = primitive.material_names();

    let binding = if names.iter().any(|n| n.contains(SKIN_MARKER)) {
        MaterialBinding::SharedSkin
    } else {
        MaterialBinding::Intrinsic
    };

    let tinted_slots = names
        .iter()
        .enumerate()
        .filter(|(_, n)| n.contains(TINT_MARKER))
        .map(|(slot, _)| slot)
        .collect();

    AttachedPrimitive {
        primitive,
        binding,
        tinted_slots,
    }
}
