//! Configuration for the fleet map: initial view, point styling, the seed
//! state catalog and the data document names.
//!
//! Loaded from `fleet_map_config.json` with support for environment variable overrides.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;

use crate::color::HexColor;

pub const BUILTIN_FLEET_MAP_CONFIG: &str = include_str!("data/fleet_map_config.json");

pub const CONFIG_PATH_ENV: &str = "FLEET_MAP_CONFIG_PATH";

/// Root configuration for the fleet map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FleetMapConfig {
    pub view: ViewConfig,
    pub point_style: PointStyleConfig,
    /// Extra pixels around a point's rendered radius that still count as a hit.
    pub hit_tolerance_px: f64,
    pub default_color: HexColor,
    pub states: Vec<StateConfig>,
    pub sources: SourceConfig,
}

impl Default for FleetMapConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            point_style: PointStyleConfig::default(),
            hit_tolerance_px: 0.0,
            default_color: HexColor::default(),
            states: default_states(),
            sources: SourceConfig::default(),
        }
    }
}

fn default_states() -> Vec<StateConfig> {
    let state = |id: &str, name: &str, color: &str| StateConfig {
        id: id.to_string(),
        name: name.to_string(),
        color: HexColor::parse(color).unwrap_or_default(),
        selected: true,
    };
    vec![
        state(
            "0808344c-454b-4c36-89e8-d7687e692d57",
            "Operando",
            "#2ecc71",
        ),
        state("baff9783-84e8-4e01-874b-6fd743b875ad", "Parado", "#f1c40f"),
        state(
            "03b2d446-e3ba-4c82-8dc2-a5611fea6e1f",
            "Manutenção",
            "#e74c3c",
        ),
    ]
}

impl FleetMapConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_FLEET_MAP_CONFIG)
                .expect("builtin fleet map config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, FleetConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| FleetConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = FleetMapConfig::from_json_str(&contents)?;
        Ok(config)
    }
}

/// Initial map view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_lat: -22.9068,
            center_lon: -43.1729,
            zoom: 5.0,
        }
    }
}

/// Circle marker drawn for every equipment point. Fill comes from the state color.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointStyleConfig {
    pub radius: f64,
    pub stroke_color: HexColor,
    pub stroke_width: f64,
}

impl Default for PointStyleConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            stroke_color: HexColor::white(),
            stroke_width: 2.0,
        }
    }
}

/// One seeded legend entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateConfig {
    pub id: String,
    pub name: String,
    pub color: HexColor,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

const fn default_selected() -> bool {
    true
}

/// File names of the fleet documents inside the data directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub position_history: String,
    pub state_history: String,
    pub equipment: String,
    pub equipment_model: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            position_history: "equipmentPositionHistory.json".to_string(),
            state_history: "equipmentStateHistory.json".to_string(),
            equipment: "equipment.json".to_string(),
            equipment_model: Some("equipmentModel.json".to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum FleetConfigError {
    #[error("failed to parse fleet map config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read fleet map config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Metadata about the fleet map configuration source.
#[derive(Debug, Clone, Default)]
pub struct FleetConfigMetadata {
    path: Option<PathBuf>,
}

impl FleetConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load configuration from an explicit path, `FLEET_MAP_CONFIG_PATH`, or the builtin copy.
pub fn load_fleet_map_config(
    explicit: Option<&Path>,
) -> (Arc<FleetMapConfig>, FleetConfigMetadata) {
    let override_path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

    if let Some(path) = override_path {
        match FleetMapConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "fleet_map::config",
                    path = %path.display(),
                    "fleet_config.loaded=file"
                );
                return (Arc::new(config), FleetConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "fleet_map::config",
                    path = %path.display(),
                    error = %err,
                    "fleet_config.load_failed"
                );
            }
        }
    }

    let config = FleetMapConfig::builtin();
    tracing::info!(
        target: "fleet_map::config",
        "fleet_config.loaded=builtin"
    );
    (config, FleetConfigMetadata::new(None))
}

pub fn load_fleet_map_config_from_env() -> (Arc<FleetMapConfig>, FleetConfigMetadata) {
    load_fleet_map_config(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_matches_defaults() {
        let builtin = FleetMapConfig::builtin();
        assert_eq!(*builtin, FleetMapConfig::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = FleetMapConfig::from_json_str(
            r##"{"states":[{"id":"s","name":"Only","color":"#123456"}],"view":{"zoom":9.0}}"##,
        )
        .unwrap();
        assert_eq!(config.states.len(), 1);
        assert!(config.states[0].selected);
        assert_eq!(config.view.zoom, 9.0);
        assert_eq!(config.view.center_lat, -22.9068);
        assert_eq!(config.point_style.radius, 8.0);
        assert_eq!(config.default_color.as_str(), "#000");
    }

    #[test]
    fn invalid_state_color_is_rejected() {
        let err = FleetMapConfig::from_json_str(
            r#"{"states":[{"id":"s","name":"Bad","color":"green"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid hex color"));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let path = Path::new("/definitely/not/here/fleet_map_config.json");
        let err = FleetMapConfig::from_file(path).unwrap_err();
        assert!(matches!(err, FleetConfigError::Read { .. }));
    }

    #[test]
    fn unreadable_override_falls_back_to_builtin() {
        let (config, metadata) =
            load_fleet_map_config(Some(Path::new("/definitely/not/here.json")));
        assert!(metadata.path().is_none());
        assert_eq!(config.states.len(), 3);
    }
}
