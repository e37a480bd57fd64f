use std::sync::Arc;

use tracing::debug;

use crate::aggregate::EquipmentSnapshot;
use crate::catalog::StateCatalog;
use crate::color::HexColor;
use crate::config::PointStyleConfig;
use crate::projection::{project, MapCoordinate};

/// Rendering style of one point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub fill: HexColor,
    pub stroke: HexColor,
    pub stroke_width: f64,
    pub radius: f64,
}

impl PointStyle {
    /// Pixel radius covered by the marker, stroke included.
    pub fn hit_radius(&self) -> f64 {
        self.radius + self.stroke_width / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub coordinate: MapCoordinate,
    pub snapshot: Arc<EquipmentSnapshot>,
    pub style: PointStyle,
}

/// Every drawable point for one snapshot set and catalog state, in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureLayer {
    features: Vec<MapFeature>,
}

impl FeatureLayer {
    pub fn build(
        snapshots: &[Arc<EquipmentSnapshot>],
        catalog: &StateCatalog,
        style: &PointStyleConfig,
    ) -> Self {
        let features: Vec<MapFeature> = snapshots
            .iter()
            .filter(|snapshot| catalog.admits(&snapshot.state_id))
            .map(|snapshot| MapFeature {
                coordinate: project(snapshot.position),
                snapshot: Arc::clone(snapshot),
                style: PointStyle {
                    fill: catalog.color_of(&snapshot.state_id).clone(),
                    stroke: style.stroke_color.clone(),
                    stroke_width: style.stroke_width,
                    radius: style.radius,
                },
            })
            .collect();
        debug!(
            target: "fleet_map::features",
            total = snapshots.len(),
            rendered = features.len(),
            "feature_layer.built"
        );
        Self { features }
    }

    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn count_in_state(&self, state_id: &str) -> usize {
        self.features
            .iter()
            .filter(|feature| feature.snapshot.state_id == state_id)
            .count()
    }
}
