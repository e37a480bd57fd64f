//! Map state driven by input: the mounted map, the state catalog, the loaded
//! fleet and the current route. Kept apart from the terminal so key and mouse
//! handling can run without one.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use fleet_core::{EquipmentSnapshot, MapHost, PointerEvent, StateCatalog};
use tracing::{debug, info};

use crate::canvas::{cell_to_pixel, surface_size, TerminalCanvas};
use crate::ui::{MapView, Route, UiLayout, PAN_FRACTION, ZOOM_STEP};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Reload,
    Quit,
}

pub struct MapSession {
    host: MapHost<TerminalCanvas>,
    catalog: StateCatalog,
    snapshots: Vec<Arc<EquipmentSnapshot>>,
    route: Route,
}

impl MapSession {
    pub fn new(host: MapHost<TerminalCanvas>, catalog: StateCatalog) -> Self {
        Self {
            host,
            catalog,
            snapshots: Vec::new(),
            route: Route::Map,
        }
    }

    pub fn view(&self) -> MapView<'_> {
        MapView {
            route: &self.route,
            host: &self.host,
            catalog: &self.catalog,
            snapshots: &self.snapshots,
        }
    }

    /// Swap in a freshly loaded fleet and remount the map. Catalog selection is kept.
    pub fn replace_fleet(&mut self, snapshots: Vec<EquipmentSnapshot>) {
        self.snapshots = snapshots.into_iter().map(Arc::new).collect();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.host.rebuild(&self.snapshots, &self.catalog);
    }

    pub fn fit_viewport(&mut self, layout: &UiLayout) {
        let (width, height) = surface_size(layout.map_surface);
        let viewport = self.host.viewport();
        if viewport.width != width || viewport.height != height {
            self.host.update_viewport(|viewport| viewport.resize(width, height));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Esc => {
                if self.route == Route::Map {
                    return KeyOutcome::Quit;
                }
                self.route = Route::Map;
            }
            KeyCode::Char('r') => return KeyOutcome::Reload,
            KeyCode::Char(digit @ '1'..='9') => {
                let index = usize::from(digit as u8 - b'1');
                self.toggle_state(index);
            }
            KeyCode::Left => self.pan(-PAN_FRACTION, 0.0),
            KeyCode::Right => self.pan(PAN_FRACTION, 0.0),
            KeyCode::Up => self.pan(0.0, -PAN_FRACTION),
            KeyCode::Down => self.pan(0.0, PAN_FRACTION),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(ZOOM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(-ZOOM_STEP),
            _ => {}
        }
        KeyOutcome::Continue
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, layout: &UiLayout) {
        if self.route != Route::Map {
            return;
        }
        let pixel = cell_to_pixel(layout.map_surface, mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => match pixel {
                Some(pixel) => {
                    self.host.dispatch(PointerEvent::Move(pixel));
                }
                None => self.host.hide_tooltip(),
            },
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(pixel) = pixel {
                    if let Some(intent) = self.host.dispatch(PointerEvent::Click(pixel)) {
                        info!(target: "fleet_map::app", route = %intent, "map.navigate");
                        self.route = Route::from(intent);
                    }
                } else if let Some(index) =
                    layout.legend_row_at(mouse.column, mouse.row, self.catalog.len())
                {
                    self.toggle_state(index);
                }
            }
            MouseEventKind::ScrollUp if pixel.is_some() => self.zoom(ZOOM_STEP),
            MouseEventKind::ScrollDown if pixel.is_some() => self.zoom(-ZOOM_STEP),
            _ => {}
        }
    }

    /// Toggle the Nth legend state and remount the map with the new selection.
    pub fn toggle_state(&mut self, index: usize) {
        let Some(id) = self.catalog.toggle_at(index).map(str::to_string) else {
            debug!(target: "fleet_map::app", index, "legend.no_state");
            return;
        };
        self.rebuild();
        debug!(target: "fleet_map::app", state = %id, "legend.toggled");
    }

    fn pan(&mut self, fraction_x: f64, fraction_y: f64) {
        self.host.update_viewport(|viewport| {
            let (dx, dy) = (viewport.width * fraction_x, viewport.height * fraction_y);
            viewport.pan_pixels(dx, dy);
        });
    }

    fn zoom(&mut self, delta: f64) {
        self.host.update_viewport(|viewport| viewport.zoom_by(delta));
    }

    /// Release the mounted map before the terminal goes away.
    pub fn teardown(&mut self) {
        self.host.teardown();
    }
}
