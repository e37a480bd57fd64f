//! Pointer hit-testing and the hover/click state machine.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::aggregate::EquipmentSnapshot;
use crate::features::MapFeature;
use crate::projection::{MapCoordinate, Pixel, Viewport};

/// Nearest feature whose marker lies within `tolerance` pixels of its edge.
///
/// When two features are equally close the one drawn later wins, since it
/// sits on top.
pub fn hit_test<'a>(
    features: &'a [MapFeature],
    viewport: &Viewport,
    pixel: Pixel,
    tolerance: f64,
) -> Option<&'a MapFeature> {
    let mut best: Option<(&MapFeature, f64)> = None;
    for feature in features {
        let rendered = viewport.coordinate_to_pixel(feature.coordinate);
        let distance = rendered.distance_to(pixel);
        if distance > feature.style.hit_radius() + tolerance.max(0.0) {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance > best_distance => {}
            _ => best = Some((feature, distance)),
        }
    }
    best.map(|(feature, _)| feature)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Pixel),
    Click(Pixel),
}

/// Request for the router to open an equipment's detail view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationIntent {
    pub equipment_id: String,
}

impl NavigationIntent {
    pub fn route(&self) -> String {
        format!("/equipment/{}", self.equipment_id)
    }
}

impl fmt::Display for NavigationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.route())
    }
}

/// Pixel offset of the tooltip box from its anchor, right and down.
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, 0.0);

/// The hover overlay. Holds at most one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipOverlay {
    target: Option<Arc<EquipmentSnapshot>>,
    anchor: Option<MapCoordinate>,
}

impl TooltipOverlay {
    pub fn target(&self) -> Option<&Arc<EquipmentSnapshot>> {
        self.target.as_ref()
    }

    pub fn anchor(&self) -> Option<MapCoordinate> {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    fn show(&mut self, target: Arc<EquipmentSnapshot>, anchor: MapCoordinate) {
        self.target = Some(target);
        self.anchor = Some(anchor);
    }

    pub fn hide(&mut self) {
        self.target = None;
        self.anchor = None;
    }
}

/// Resolves pointer events against a feature set.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    tooltip: TooltipOverlay,
    tolerance: f64,
}

impl Interaction {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tooltip: TooltipOverlay::default(),
            tolerance,
        }
    }

    pub fn tooltip(&self) -> &TooltipOverlay {
        &self.tooltip
    }

    pub fn clear(&mut self) {
        self.tooltip.hide();
    }

    pub fn handle(
        &mut self,
        features: &[MapFeature],
        viewport: &Viewport,
        event: PointerEvent,
    ) -> Option<NavigationIntent> {
        match event {
            PointerEvent::Move(pixel) => {
                self.pointer_move(features, viewport, pixel);
                None
            }
            PointerEvent::Click(pixel) => self.click(features, viewport, pixel),
        }
    }

    pub fn pointer_move(&mut self, features: &[MapFeature], viewport: &Viewport, pixel: Pixel) {
        if !viewport.contains_pixel(pixel) {
            self.tooltip.hide();
            return;
        }
        match hit_test(features, viewport, pixel, self.tolerance) {
            Some(feature) => {
                let changed = self
                    .tooltip
                    .target()
                    .map_or(true, |current| !Arc::ptr_eq(current, &feature.snapshot));
                if changed {
                    trace!(
                        target: "fleet_map::interaction",
                        equipment_id = %feature.snapshot.equipment_id,
                        "tooltip.target_changed"
                    );
                }
                self.tooltip.show(
                    Arc::clone(&feature.snapshot),
                    viewport.pixel_to_coordinate(pixel),
                );
            }
            None => self.tooltip.hide(),
        }
    }

    pub fn click(
        &mut self,
        features: &[MapFeature],
        viewport: &Viewport,
        pixel: Pixel,
    ) -> Option<NavigationIntent> {
        if !viewport.contains_pixel(pixel) {
            return None;
        }
        let feature = hit_test(features, viewport, pixel, self.tolerance)?;
        let intent = NavigationIntent {
            equipment_id: feature.snapshot.equipment_id.clone(),
        };
        debug!(
            target: "fleet_map::interaction",
            route = %intent.route(),
            "navigation.requested"
        );
        Some(intent)
    }
}
