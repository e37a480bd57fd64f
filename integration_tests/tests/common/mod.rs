#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use fleet_core::{
    aggregate, EquipmentSnapshot, FeatureLayer, FleetMapConfig, HistorySources, RenderTarget,
    Viewport,
};

pub const OPERANDO: &str = "0808344c-454b-4c36-89e8-d7687e692d57";
pub const PARADO: &str = "baff9783-84e8-4e01-874b-6fd743b875ad";
pub const MANUTENCAO: &str = "03b2d446-e3ba-4c82-8dc2-a5611fea6e1f";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> anyhow::Result<String> {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .map_err(|err| anyhow::anyhow!("missing fixture {}: {err}", path.display()))
}

/// Parse the fixture fleet, model catalog included.
pub fn fixture_sources() -> anyhow::Result<HistorySources> {
    let sources = HistorySources::from_documents(
        &read_fixture("equipmentPositionHistory.json")?,
        &read_fixture("equipmentStateHistory.json")?,
        &read_fixture("equipment.json")?,
    )?
    .with_models_document(&read_fixture("equipmentModel.json")?)?;
    Ok(sources)
}

pub fn fixture_snapshots() -> anyhow::Result<Vec<Arc<EquipmentSnapshot>>> {
    Ok(aggregate(&fixture_sources()?)
        .into_iter()
        .map(Arc::new)
        .collect())
}

pub fn test_config() -> anyhow::Result<FleetMapConfig> {
    Ok(FleetMapConfig::from_file(&fixture_path(
        "test_fleet_map_config.json",
    ))?)
}

/// Render target that only counts how many surfaces are attached.
#[derive(Debug, Default)]
pub struct CountingTarget {
    pub live: usize,
    pub peak: usize,
}

impl RenderTarget for CountingTarget {
    type Surface = usize;

    fn acquire(&mut self, layer: &FeatureLayer, _viewport: &Viewport) -> usize {
        self.live += 1;
        self.peak = self.peak.max(self.live);
        layer.len()
    }

    fn release(&mut self, _surface: usize) {
        self.live -= 1;
    }
}
