//! Random avatar generation.

use std::sync::Arc;

use rand::Rng;

use crate::catalog::Category;
use crate::customization::{Customization, Selection};

/// Draws a random selection for every category.
///
/// Each category gets a uniformly random asset. A removable category is then
/// emptied when an independent draw over its `N` assets lands on 0, so "no
/// asset" comes up with probability `1/N` rather than one half. A color is
/// drawn from the palette when the category has one.
pub fn random_customization<R: Rng + ?Sized>(
    categories: &[Arc<Category>],
    rng: &mut R,
) -> Customization {
    categories
        .iter()
        .map(|category| (category.name.clone(), random_selection(category, rng)))
        .collect()
}

fn random_selection<R: Rng + ?Sized>(category: &Category, rng: &mut R) -> Selection {
    let count = category.assets.len();

    let mut asset = if count > 0 {
        Some(Arc::clone(&category.assets[rng.gen_range(0..count)]))
    } else {
        None
    };

    if category.removable && (count == 0 || rng.gen_range(0..count) == 0) {
        asset = None;
    }

    let colors = category.colors();
    let color = if colors.is_empty() {
        None
    } else {
        Some(colors[rng.gen_range(0..colors.len())].clone())
    };

    Selection::new(asset, color)
}
