//! Ownership of the live map: feature layer, viewport, interaction state and
//! the rendering surface they are drawn on.
//!
//! A [`MapHost`] holds at most one mounted map. Every rebuild releases the
//! previous surface before acquiring the next one, and dropping the host
//! releases whatever is still mounted.

use std::sync::Arc;

use tracing::{debug, info};

use crate::aggregate::EquipmentSnapshot;
use crate::catalog::StateCatalog;
use crate::config::PointStyleConfig;
use crate::features::FeatureLayer;
use crate::interaction::{Interaction, NavigationIntent, PointerEvent};
use crate::projection::Viewport;

/// Something a feature layer can be drawn onto.
pub trait RenderTarget {
    type Surface;

    fn acquire(&mut self, layer: &FeatureLayer, viewport: &Viewport) -> Self::Surface;

    fn release(&mut self, surface: Self::Surface);
}

/// One mounted map: the rebuilt features plus the surface drawing them.
#[derive(Debug)]
pub struct MapInstance<S> {
    generation: u64,
    layer: FeatureLayer,
    interaction: Interaction,
    surface: S,
}

impl<S> MapInstance<S> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn layer(&self) -> &FeatureLayer {
        &self.layer
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

pub struct MapHost<T: RenderTarget> {
    target: T,
    viewport: Viewport,
    point_style: PointStyleConfig,
    hit_tolerance: f64,
    mounted: Option<MapInstance<T::Surface>>,
    generation: u64,
}

impl<T: RenderTarget> MapHost<T> {
    pub fn new(
        target: T,
        viewport: Viewport,
        point_style: PointStyleConfig,
        hit_tolerance: f64,
    ) -> Self {
        Self {
            target,
            viewport,
            point_style,
            hit_tolerance,
            mounted: None,
            generation: 0,
        }
    }

    /// Tear down the current map, if any, and mount a fresh one.
    pub fn rebuild(&mut self, snapshots: &[Arc<EquipmentSnapshot>], catalog: &StateCatalog) {
        self.teardown();

        let layer = FeatureLayer::build(snapshots, catalog, &self.point_style);
        let surface = self.target.acquire(&layer, &self.viewport);
        self.generation += 1;
        info!(
            target: "fleet_map::surface",
            generation = self.generation,
            features = layer.len(),
            "map.mounted"
        );
        self.mounted = Some(MapInstance {
            generation: self.generation,
            layer,
            interaction: Interaction::new(self.hit_tolerance),
            surface,
        });
    }

    pub fn teardown(&mut self) {
        if let Some(instance) = self.mounted.take() {
            debug!(
                target: "fleet_map::surface",
                generation = instance.generation,
                "map.released"
            );
            self.target.release(instance.surface);
        }
    }

    pub fn dispatch(&mut self, event: PointerEvent) -> Option<NavigationIntent> {
        let viewport = self.viewport;
        let instance = self.mounted.as_mut()?;
        instance
            .interaction
            .handle(instance.layer.features(), &viewport, event)
    }

    pub fn mounted(&self) -> Option<&MapInstance<T::Surface>> {
        self.mounted.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Change what part of the map is shown. Features are kept; the tooltip
    /// is dropped because its anchor pixel no longer matches.
    pub fn update_viewport(&mut self, update: impl FnOnce(&mut Viewport)) {
        update(&mut self.viewport);
        if let Some(instance) = self.mounted.as_mut() {
            instance.interaction.clear();
        }
    }

    /// Pointer left the map surface.
    pub fn hide_tooltip(&mut self) {
        if let Some(instance) = self.mounted.as_mut() {
            instance.interaction.clear();
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<T: RenderTarget> Drop for MapHost<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
