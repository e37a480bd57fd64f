//! Web Mercator (EPSG:3857) projection and the pixel viewport over it.

use std::f64::consts::PI;

use crate::aggregate::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Half the projected world width in meters.
pub const HALF_WORLD_M: f64 = PI * EARTH_RADIUS_M;
/// Meters per pixel at zoom 0 for 256px tiles.
pub const ZOOM_ZERO_RESOLUTION: f64 = 2.0 * HALF_WORLD_M / 256.0;
pub const MAX_ZOOM: f64 = 28.0;

/// Projected map coordinate in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapCoordinate {
    pub x: f64,
    pub y: f64,
}

impl MapCoordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen position in pixels, origin at the top-left of the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Pixel) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub fn from_lon_lat(lon: f64, lat: f64) -> MapCoordinate {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    // poles project to infinity; clamp like tile servers do
    MapCoordinate::new(x, y.clamp(-HALF_WORLD_M, HALF_WORLD_M))
}

pub fn project(point: GeoPoint) -> MapCoordinate {
    from_lon_lat(point.lon, point.lat)
}

pub fn to_lon_lat(coordinate: MapCoordinate) -> GeoPoint {
    let lon = (coordinate.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (coordinate.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    GeoPoint::new(lat, lon)
}

pub fn resolution_for_zoom(zoom: f64) -> f64 {
    ZOOM_ZERO_RESOLUTION / 2f64.powf(zoom.clamp(0.0, MAX_ZOOM))
}

/// What part of the projected plane is on screen and at what scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: MapCoordinate,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: MapCoordinate, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, MAX_ZOOM),
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn centered_on(point: GeoPoint, zoom: f64, width: f64, height: f64) -> Self {
        Self::new(project(point), zoom, width, height)
    }

    /// Meters per pixel.
    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom)
    }

    pub fn coordinate_to_pixel(&self, coordinate: MapCoordinate) -> Pixel {
        let resolution = self.resolution();
        Pixel::new(
            (coordinate.x - self.center.x) / resolution + self.width / 2.0,
            (self.center.y - coordinate.y) / resolution + self.height / 2.0,
        )
    }

    pub fn pixel_to_coordinate(&self, pixel: Pixel) -> MapCoordinate {
        let resolution = self.resolution();
        MapCoordinate::new(
            self.center.x + (pixel.x - self.width / 2.0) * resolution,
            self.center.y - (pixel.y - self.height / 2.0) * resolution,
        )
    }

    /// Visible bounds as `(min, max)` corners.
    pub fn extent(&self) -> (MapCoordinate, MapCoordinate) {
        let half_w = self.width / 2.0 * self.resolution();
        let half_h = self.height / 2.0 * self.resolution();
        (
            MapCoordinate::new(self.center.x - half_w, self.center.y - half_h),
            MapCoordinate::new(self.center.x + half_w, self.center.y + half_h),
        )
    }

    pub fn contains_pixel(&self, pixel: Pixel) -> bool {
        (0.0..=self.width).contains(&pixel.x) && (0.0..=self.height).contains(&pixel.y)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom + delta).clamp(0.0, MAX_ZOOM);
    }

    /// Shift the view by a pixel offset; positive `dx` moves east, positive `dy` south.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        let resolution = self.resolution();
        self.center.x = (self.center.x + dx * resolution).clamp(-HALF_WORLD_M, HALF_WORLD_M);
        self.center.y = (self.center.y - dy * resolution).clamp(-HALF_WORLD_M, HALF_WORLD_M);
    }
}
