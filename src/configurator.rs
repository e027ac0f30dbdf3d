//! The customization store.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::camera::{CameraShot, resolve_camera};
use crate::catalog::{Asset, Catalog, Category};
use crate::command::{Command, CommandSlot};
use crate::customization::Customization;
use crate::error::Result;
use crate::gateway::ContentGateway;
use crate::lock::{LockedGroups, resolve_locked_groups};
use crate::material::SkinMaterial;
use crate::mode::{Mode, Pose};
use crate::profile::{CustomizationProfile, SelectionSettings};
use crate::randomize::random_customization;

/// Category whose color is the character's skin tone.
pub const HEAD_CATEGORY: &str = "Head";

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`CustomizationProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &CustomizationProfile);

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> CustomizationProfile;
}

// ============================================================================
// Configurator
// ============================================================================

/// Application state of the avatar customizer.
///
/// `Configurator` owns the catalog, the user's selections, the derived
/// [`LockedGroups`], the UI mode and pose, the shared skin material and the
/// render layer's command slots. It is created once, populated with
/// [`fetch_categories`](Self::fetch_categories), and then mutated only
/// through its methods. Every method that changes the selections recomputes
/// the locks before returning.
///
/// # Example
///
/// ```
/// use avatar_configurator::{Configurator, Mode, Pose, StaticGateway};
/// use url::Url;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gateway = StaticGateway::new(Url::parse("http://localhost:8090").unwrap(), vec![], vec![]);
///
/// let mut configurator = Configurator::new();
/// configurator.fetch_categories(&gateway).await.unwrap();
/// assert!(!configurator.is_loading());
///
/// configurator.set_mode(Mode::Photo);
/// configurator.set_pose(Pose::Ninja);
/// configurator.set_mode(Mode::Customize);
/// assert_eq!(configurator.pose(), Pose::Idle);
/// # }
/// ```
#[derive(Debug)]
pub struct Configurator {
    loading: bool,
    mode: Mode,
    pose: Pose,
    categories: Vec<Arc<Category>>,
    assets: Vec<Arc<Asset>>,
    current_category: Option<Arc<Category>>,
    customization: Customization,
    locked_groups: LockedGroups,
    skin: SkinMaterial,
    download: CommandSlot,
    screenshot: CommandSlot,
    /// Increments on every change to the selections.
    revision: u64,
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

impl Configurator {
    /// Creates an empty configurator in the loading state.
    pub fn new() -> Self {
        Self::with_skin(SkinMaterial::default())
    }

    /// Creates an empty configurator around an existing skin material.
    pub fn with_skin(skin: SkinMaterial) -> Self {
        Self {
            loading: true,
            mode: Mode::default(),
            pose: Pose::default(),
            categories: Vec::new(),
            assets: Vec::new(),
            current_category: None,
            customization: Customization::default(),
            locked_groups: LockedGroups::default(),
            skin,
            download: CommandSlot::default(),
            screenshot: CommandSlot::default(),
            revision: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Population
    // ------------------------------------------------------------------------

    /// Loads the catalog from the gateway and builds the initial selections.
    ///
    /// On error the configurator stays in the loading state and keeps its
    /// previous contents. There is no retry.
    pub async fn fetch_categories<G>(&mut self, gateway: &G) -> Result<()>
    where
        G: ContentGateway + ?Sized,
    {
        let categories = gateway.list_categories().await?;
        let assets = gateway.list_assets().await?;

        self.load_catalog(Catalog::assemble(categories, assets));
        Ok(())
    }

    /// Installs an already assembled catalog.
    ///
    /// Each category starts with its designated starting asset (if it is one
    /// of its assets) and the first color of its palette. The first category
    /// gets the focus.
    pub fn load_catalog(&mut self, catalog: Catalog) {
        info!(
            "Loaded catalog: {} categories, {} assets",
            catalog.categories.len(),
            catalog.assets.len()
        );

        self.customization = Customization::initial(&catalog.categories);
        self.current_category = catalog.categories.first().cloned();
        self.categories = catalog.categories;
        self.assets = catalog.assets;
        self.loading = false;
        self.bump();
        self.apply_locked_assets();
    }

    // ------------------------------------------------------------------------
    // Mode and focus
    // ------------------------------------------------------------------------

    /// Switches the UI mode. Entering customize mode resets the pose.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!("Mode -> {}", mode);
        self.mode = mode;
        if mode == Mode::Customize {
            self.pose = Pose::Idle;
        }
    }

    /// Sets the photo pose. Not checked against the mode.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Focuses a category by name. Selections are not touched.
    pub fn set_current_category(&mut self, name: &str) {
        match self.category(name) {
            Some(category) => {
                self.current_category = Some(Arc::clone(category));
            }
            None => warn!("Cannot focus unknown category {}", name),
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Replaces one category's asset, keeping its color.
    ///
    /// `None` empties the slot and is accepted for any category.
    pub fn change_asset(&mut self, category_name: &str, asset: Option<Arc<Asset>>) {
        let Some(selection) = self.customization.get_mut(category_name) else {
            warn!("Ignoring asset change for unknown category {}", category_name);
            return;
        };

        debug!(
            "{} -> {}",
            category_name,
            asset.as_deref().map_or("none", |a| a.name.as_str())
        );
        selection.asset = asset;
        self.bump();
        self.apply_locked_assets();
    }

    /// Sets the color of the focused category.
    ///
    /// Coloring the `Head` category also recolors the shared skin.
    pub fn update_color(&mut self, color: impl Into<String>) {
        let color = color.into();
        let Some(name) = self.current_category.as_ref().map(|c| c.name.clone()) else {
            warn!("Ignoring color {} with no focused category", color);
            return;
        };
        let Some(selection) = self.customization.get_mut(&name) else {
            warn!("Focused category {} has no selection entry", name);
            return;
        };

        selection.color = Some(color.clone());
        self.bump();

        if name == HEAD_CATEGORY {
            self.update_skin(&color);
        }
    }

    /// Recolors the shared skin material. Selections are not touched.
    pub fn update_skin(&self, color: &str) {
        if let Err(e) = self.skin.set_color_str(color) {
            warn!("Keeping skin color: {}", e);
        }
    }

    /// Replaces every selection with a random one.
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    /// [`randomize`](Self::randomize) with a caller-supplied RNG.
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let customization = random_customization(&self.categories, rng);

        if let Some(color) = customization.color(HEAD_CATEGORY) {
            self.update_skin(color);
        }

        self.customization = customization;
        self.bump();
        self.apply_locked_assets();
    }

    /// Recomputes [`LockedGroups`] from the current selections.
    pub fn apply_locked_assets(&mut self) {
        self.locked_groups = resolve_locked_groups(&self.categories, &self.customization);
    }

    // ------------------------------------------------------------------------
    // Render layer commands
    // ------------------------------------------------------------------------

    /// Registers the model export command.
    pub fn set_download<F>(&mut self, command: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.download.register(command);
    }

    /// Registers the screenshot command.
    pub fn set_screenshot<F>(&mut self, command: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.screenshot.register(command);
    }

    /// The latest export command, for the UI to invoke.
    pub fn download(&self) -> Option<Command> {
        self.download.get()
    }

    /// The latest screenshot command, for the UI to invoke.
    pub fn screenshot(&self) -> Option<Command> {
        self.screenshot.get()
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// True until the first successful fetch.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current UI mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current photo pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[Arc<Category>] {
        &self.categories
    }

    /// Looks up a category by name.
    pub fn category(&self, name: &str) -> Option<&Arc<Category>> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Every asset, newest first.
    pub fn assets(&self) -> &[Arc<Asset>] {
        &self.assets
    }

    /// The focused category, if any.
    pub fn current_category(&self) -> Option<&Category> {
        self.current_category.as_deref()
    }

    /// Selections keyed by category name.
    pub fn customization(&self) -> &Customization {
        &self.customization
    }

    /// Categories currently hidden by equipped assets.
    pub fn locked_groups(&self) -> &LockedGroups {
        &self.locked_groups
    }

    /// The shared skin material. Clone the handle to share it.
    pub fn skin(&self) -> &SkinMaterial {
        &self.skin
    }

    /// Changes whenever the selections change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Camera shot for the current state.
    pub fn camera_shot(&self, scene_loading: bool) -> CameraShot {
        resolve_camera(self.loading, scene_loading, self.mode, self.current_category())
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Configurable for Configurator {
    /// Applies a saved profile.
    ///
    /// Categories named in the profile get the listed asset (looked up by id
    /// within that category) and color; other categories keep their
    /// selection. Unknown categories and asset ids are skipped with a
    /// warning.
    fn apply_profile(&mut self, profile: &CustomizationProfile) {
        for (name, settings) in &profile.selections {
            let Some(category) = self.category(name).cloned() else {
                warn!("Profile names unknown category {}", name);
                continue;
            };

            let asset = settings.asset_id.as_deref().and_then(|id| {
                let found = category.find_asset(id).cloned();
                if found.is_none() {
                    warn!("Profile names unknown asset {} in {}", id, name);
                }
                found
            });

            if let Some(selection) = self.customization.get_mut(name) {
                selection.asset = asset;
                selection.color = settings.color.clone();
            }
        }

        if let Some(color) = &profile.skin_color {
            self.update_skin(color);
        }

        self.bump();
        self.apply_locked_assets();
    }

    fn export_profile(&self) -> CustomizationProfile {
        let selections = self
            .customization
            .iter()
            .map(|(name, selection)| {
                let settings = SelectionSettings::new(selection.asset_id(), selection.color.as_deref());
                (name.to_string(), settings)
            })
            .collect();

        CustomizationProfile {
            selections,
            skin_color: Some(self.skin.color_hex()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
