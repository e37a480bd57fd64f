//! Terminal rendering target for the map and the cell/pixel conversions
//! that go with it.

use fleet_core::{FeatureLayer, HexColor, MapCoordinate, Pixel, RenderTarget, Viewport};
use ratatui::layout::Rect;
use ratatui::style::Color;
use tracing::trace;

/// Nominal font cell size. The viewport works in these pixels so marker radii
/// and hit tolerances from the config keep their on-screen meaning.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub fn surface_size(area: Rect) -> (f64, f64) {
    (
        f64::from(area.width) * CELL_WIDTH_PX,
        f64::from(area.height) * CELL_HEIGHT_PX,
    )
}

/// Pixel at the center of a terminal cell, or None outside `area`.
pub fn cell_to_pixel(area: Rect, column: u16, row: u16) -> Option<Pixel> {
    let inside = column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height);
    if !inside {
        return None;
    }
    Some(Pixel::new(
        (f64::from(column - area.x) + 0.5) * CELL_WIDTH_PX,
        (f64::from(row - area.y) + 0.5) * CELL_HEIGHT_PX,
    ))
}

/// Terminal cell containing a pixel, or None when it falls outside `area`.
pub fn pixel_to_cell(area: Rect, pixel: Pixel) -> Option<(u16, u16)> {
    if pixel.x < 0.0 || pixel.y < 0.0 {
        return None;
    }
    let column = (pixel.x / CELL_WIDTH_PX).floor();
    let row = (pixel.y / CELL_HEIGHT_PX).floor();
    if column >= f64::from(area.width) || row >= f64::from(area.height) {
        return None;
    }
    Some((area.x + column as u16, area.y + row as u16))
}

pub fn terminal_color(color: &HexColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasPoint {
    pub coordinate: MapCoordinate,
    pub fill: Color,
    pub stroke: Color,
    pub radius_px: f64,
    /// Outer edge of the stroke ring.
    pub outline_px: f64,
}

/// Draw list prepared from one feature layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSurface {
    pub points: Vec<CanvasPoint>,
}

/// Hands out draw lists and keeps count of how many are still attached.
#[derive(Debug, Default)]
pub struct TerminalCanvas {
    live_surfaces: usize,
}

impl TerminalCanvas {
    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces
    }
}

impl RenderTarget for TerminalCanvas {
    type Surface = CanvasSurface;

    fn acquire(&mut self, layer: &FeatureLayer, _viewport: &Viewport) -> CanvasSurface {
        self.live_surfaces += 1;
        trace!(
            target: "fleet_map::canvas",
            live = self.live_surfaces,
            "canvas.surface_acquired"
        );
        CanvasSurface {
            points: layer
                .features()
                .iter()
                .map(|feature| CanvasPoint {
                    coordinate: feature.coordinate,
                    fill: terminal_color(&feature.style.fill),
                    stroke: terminal_color(&feature.style.stroke),
                    radius_px: feature.style.radius,
                    outline_px: feature.style.hit_radius(),
                })
                .collect(),
        }
    }

    fn release(&mut self, surface: CanvasSurface) {
        self.live_surfaces = self.live_surfaces.saturating_sub(1);
        trace!(
            target: "fleet_map::canvas",
            points = surface.points.len(),
            live = self.live_surfaces,
            "canvas.surface_released"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fleet_core::{
        EquipmentSnapshot, FleetMapConfig, GeoPoint, MapHost, PointStyleConfig, StateCatalog,
    };

    use super::*;

    #[test]
    fn cell_centers_map_to_pixels_and_back() {
        let area = Rect::new(2, 3, 10, 5);
        let pixel = cell_to_pixel(area, 4, 3).unwrap();
        assert_eq!(pixel, Pixel::new(2.5 * CELL_WIDTH_PX, 0.5 * CELL_HEIGHT_PX));
        assert_eq!(pixel_to_cell(area, pixel), Some((4, 3)));
    }

    #[test]
    fn cells_outside_area_have_no_pixel() {
        let area = Rect::new(2, 3, 10, 5);
        assert!(cell_to_pixel(area, 1, 3).is_none());
        assert!(cell_to_pixel(area, 12, 3).is_none());
        assert!(cell_to_pixel(area, 5, 8).is_none());
        assert!(pixel_to_cell(area, Pixel::new(-1.0, 0.0)).is_none());
        assert!(pixel_to_cell(area, Pixel::new(0.0, 5.0 * CELL_HEIGHT_PX)).is_none());
    }

    #[test]
    fn surface_size_scales_cells() {
        assert_eq!(surface_size(Rect::new(0, 0, 80, 20)), (640.0, 320.0));
    }

    #[test]
    fn hex_colors_become_rgb() {
        let color = HexColor::parse("#2ecc71").unwrap();
        assert_eq!(terminal_color(&color), Color::Rgb(0x2e, 0xcc, 0x71));
    }

    #[test]
    fn host_never_holds_two_surfaces() {
        let config = FleetMapConfig::default();
        let catalog = StateCatalog::from_config(&config);
        let snapshots = vec![Arc::new(EquipmentSnapshot {
            equipment_id: "a".into(),
            state_id: config.states[0].id.clone(),
            position: GeoPoint::new(-22.9, -43.2),
            name: "CA-0001".into(),
            model_name: None,
        })];
        let viewport = Viewport::centered_on(GeoPoint::new(-22.9, -43.2), 5.0, 640.0, 320.0);
        let mut host = MapHost::new(
            TerminalCanvas::default(),
            viewport,
            PointStyleConfig::default(),
            0.0,
        );

        host.rebuild(&snapshots, &catalog);
        host.rebuild(&snapshots, &catalog);
        assert_eq!(host.target().live_surfaces(), 1);
        let surface = host.mounted().unwrap().surface();
        assert_eq!(surface.points[0].fill, Color::Rgb(0x2e, 0xcc, 0x71));
        host.teardown();
        assert_eq!(host.target().live_surfaces(), 0);
    }
}
