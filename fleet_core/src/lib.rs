//! Core crate for the fleet map.
//!
//! Folds raw equipment histories into current-state snapshots, filters and
//! colors them through a [`StateCatalog`], and projects them into map
//! features that pointer events are resolved against.

pub mod aggregate;
pub mod catalog;
mod color;
pub mod config;
pub mod features;
pub mod history;
pub mod interaction;
pub mod projection;
pub mod surface;

pub use aggregate::{
    aggregate, aggregate_documents, snapshots_or_empty, EquipmentSnapshot, GeoPoint,
};
pub use catalog::{EquipmentState, StateCatalog};
pub use color::{HexColor, HexColorError};
pub use config::{
    load_fleet_map_config, load_fleet_map_config_from_env, FleetConfigError, FleetConfigMetadata,
    FleetMapConfig, PointStyleConfig, SourceConfig, StateConfig, ViewConfig,
};
pub use features::{FeatureLayer, MapFeature, PointStyle};
pub use history::{parse_models, DocumentKind, EquipmentModel, HistoryError, HistorySources};
pub use interaction::{
    hit_test, Interaction, NavigationIntent, PointerEvent, TooltipOverlay, TOOLTIP_OFFSET,
};
pub use projection::{from_lon_lat, project, to_lon_lat, MapCoordinate, Pixel, Viewport};
pub use surface::{MapHost, MapInstance, RenderTarget};
