//! avatar-configurator: state core of a 3D avatar customizer
//!
//! This crate holds everything about an avatar customizer that is not
//! pixels: the catalog of categories and assets fetched from a content
//! backend, the user's selections, which categories are hidden by equipped
//! assets, random looks, the shared skin material, and the hooks the render
//! layer plugs its export and screenshot actions into.
//!
//! # Example
//!
//! ```
//! use avatar_configurator::{
//!     AssetRecord, Catalog, CategoryRecord, Configurator,
//! };
//!
//! let catalog = Catalog::assemble(
//!     vec![
//!         CategoryRecord { id: "c_hats".into(), name: "Hats".into(), ..Default::default() },
//!         CategoryRecord { id: "c_hair".into(), name: "Hair".into(), ..Default::default() },
//!     ],
//!     vec![AssetRecord {
//!         id: "helmet".into(),
//!         name: "Helmet".into(),
//!         group: "c_hats".into(),
//!         locked_groups: vec!["c_hair".into()],
//!         ..Default::default()
//!     }],
//! );
//!
//! let mut configurator = Configurator::new();
//! configurator.load_catalog(catalog);
//!
//! let helmet = configurator.category("Hats").unwrap().find_asset("helmet").cloned();
//! configurator.change_asset("Hats", helmet);
//!
//! // The helmet hides the hair
//! assert!(configurator.locked_groups().is_locked("Hair"));
//! ```
//!
//! # Loading from PocketBase
//!
//! ```no_run
//! use avatar_configurator::{Configurator, GatewayConfig, PocketBaseGateway};
//!
//! # async fn load() -> avatar_configurator::Result<()> {
//! // Fails fast when POCKETBASE_URL is not set
//! let config = GatewayConfig::from_env()?;
//! let gateway = PocketBaseGateway::new(config)?;
//!
//! let mut configurator = Configurator::new();
//! configurator.fetch_categories(&gateway).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Saving a Look
//!
//! Selections can be exported as a [`CustomizationProfile`] with the
//! [`Configurable`] trait and re-applied later:
//!
//! ```
//! use avatar_configurator::{Configurable, Configurator};
//!
//! let configurator = Configurator::new();
//! let json = configurator.export_profile().to_json().unwrap();
//! ```

mod camera;
mod catalog;
mod command;
mod config;
mod configurator;
mod customization;
mod error;
mod gateway;
mod lock;
mod material;
mod mode;
mod profile;
mod randomize;
mod rig;

pub use camera::{CameraShot, DEFAULT_PLACEMENT, OrbitLimits, START_PLACEMENT, resolve_camera};
pub use catalog::{
    Asset, AssetRecord, CameraPlacement, CameraPlacementRecord, Catalog, Category,
    CategoryExpand, CategoryRecord, ColorPalette, PaletteRecord,
};
pub use command::{Command, CommandSlot, export_filename};
pub use config::GatewayConfig;
pub use configurator::{Configurable, Configurator, HEAD_CATEGORY};
pub use customization::{Customization, Selection};
pub use error::{CatalogError, ColorError, ConfigError, Error, GatewayError, Result};
pub use gateway::{ContentGateway, PocketBaseGateway, StaticGateway};
pub use lock::{LockedGroups, LockingAsset, resolve_locked_groups};
pub use material::{DEFAULT_SKIN_COLOR, SkinMaterial, format_color, parse_color};
pub use mode::{Mode, Pose};
pub use profile::{CustomizationProfile, SelectionSettings};
pub use randomize::random_customization;
pub use rig::{
    AttachedPrimitive, AttachmentPlan, MaterialBinding, MeshPrimitive, plan_attachment,
};
