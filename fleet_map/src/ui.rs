use std::collections::VecDeque;
use std::sync::Arc;

use fleet_core::{
    EquipmentSnapshot, MapHost, NavigationIntent, Pixel, StateCatalog, TooltipOverlay,
    Viewport, TOOLTIP_OFFSET,
};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Points};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::canvas::{pixel_to_cell, terminal_color, TerminalCanvas};
use crate::loader::FleetLoad;

pub const PAN_FRACTION: f64 = 0.25;
pub const ZOOM_STEP: f64 = 0.5;
const LEGEND_WIDTH: u16 = 34;

/// Which view the router is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Map,
    Equipment(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Map => "/".to_string(),
            Route::Equipment(id) => format!("/equipment/{id}"),
        }
    }
}

impl From<NavigationIntent> for Route {
    fn from(intent: NavigationIntent) -> Self {
        Route::Equipment(intent.equipment_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadStatus {
    pub loaded: bool,
    pub units: usize,
    pub error: Option<String>,
}

pub struct UiState {
    pub status: LoadStatus,
    pub logs: VecDeque<String>,
    pub max_logs: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: LoadStatus::default(),
            logs: VecDeque::new(),
            max_logs: 8,
        }
    }
}

impl UiState {
    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn record_load(&mut self, load: &FleetLoad) {
        self.status = LoadStatus {
            loaded: true,
            units: load.snapshots.len(),
            error: load.error.clone(),
        };
    }
}

/// Screen regions, recomputed from the terminal size before every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub header: Rect,
    pub body: Rect,
    pub map: Rect,
    pub map_surface: Rect,
    pub legend: Rect,
    pub legend_rows: Rect,
    pub logs: Rect,
}

fn inner(area: Rect) -> Rect {
    area.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    })
}

impl UiLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(7),
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(LEGEND_WIDTH)])
            .split(rows[1]);

        Self {
            header: rows[0],
            body: rows[1],
            map: columns[0],
            map_surface: inner(columns[0]),
            legend: columns[1],
            legend_rows: inner(columns[1]),
            logs: rows[2],
        }
    }

    /// Legend entry under a terminal cell.
    pub fn legend_row_at(&self, column: u16, row: u16, entries: usize) -> Option<usize> {
        let area = self.legend_rows;
        if column < area.x || column >= area.x + area.width || row < area.y {
            return None;
        }
        let index = usize::from(row - area.y);
        (index < entries && row < area.y + area.height).then_some(index)
    }
}

/// Everything the map view reads while drawing.
pub struct MapView<'a> {
    pub route: &'a Route,
    pub host: &'a MapHost<TerminalCanvas>,
    pub catalog: &'a StateCatalog,
    pub snapshots: &'a [Arc<EquipmentSnapshot>],
}

pub fn draw_ui(frame: &mut Frame, layout: &UiLayout, state: &UiState, view: &MapView<'_>) {
    draw_header(frame, layout.header, state, view);
    match view.route {
        Route::Map => {
            draw_map(frame, layout, view);
            draw_legend(frame, layout.legend, view);
        }
        Route::Equipment(id) => {
            let snapshot = view
                .snapshots
                .iter()
                .find(|snapshot| &snapshot.equipment_id == id);
            draw_equipment_detail(
                frame,
                layout.body,
                id,
                snapshot.map(Arc::as_ref),
                view.catalog,
            );
        }
    }
    draw_logs(frame, layout.logs, state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState, view: &MapView<'_>) {
    let block = Block::default().borders(Borders::ALL).title("Fleet Map");
    let shown = view
        .host
        .mounted()
        .map(|instance| instance.layer().len())
        .unwrap_or(0);
    let status = if !state.status.loaded {
        Span::styled("Loading", Style::default().fg(Color::Yellow))
    } else if state.status.error.is_some() {
        Span::styled("Load failed", Style::default().fg(Color::Red))
    } else {
        Span::styled("Loaded", Style::default().fg(Color::Green))
    };
    let lines = vec![
        Line::from(vec![
            status,
            Span::raw(format!(
                " | units {} | shown {} | zoom {:.1} | {}",
                state.status.units,
                shown,
                view.host.viewport().zoom,
                view.route.path()
            )),
        ]),
        Line::from(vec![
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" exit  "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" reload  "),
            Span::styled("1-9", Style::default().fg(Color::Yellow)),
            Span::raw(" toggle state  "),
            Span::styled("arrows", Style::default().fg(Color::Yellow)),
            Span::raw(" pan  "),
            Span::styled("+/-", Style::default().fg(Color::Yellow)),
            Span::raw(" zoom  "),
            Span::styled("esc", Style::default().fg(Color::Yellow)),
            Span::raw(" back"),
        ]),
    ];
    let text = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(block, area);
    frame.render_widget(text, inner(area));
}

fn draw_map(frame: &mut Frame, layout: &UiLayout, view: &MapView<'_>) {
    let block = Block::default().borders(Borders::ALL).title("Equipment");
    frame.render_widget(block, layout.map);

    let viewport = view.host.viewport();
    let resolution = viewport.resolution();
    let (min, max) = viewport.extent();
    let points = view
        .host
        .mounted()
        .map(|instance| instance.surface().points.as_slice())
        .unwrap_or(&[]);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([min.x, max.x])
        .y_bounds([min.y, max.y])
        .paint(move |ctx| {
            for point in points {
                let (x, y) = (point.coordinate.x, point.coordinate.y);
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: point.outline_px * resolution,
                    color: point.stroke,
                });
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: point.radius_px * resolution * 0.5,
                    color: point.fill,
                });
                ctx.draw(&Points {
                    coords: &[(x, y)],
                    color: point.fill,
                });
            }
        });
    frame.render_widget(canvas, layout.map_surface);

    if let Some(instance) = view.host.mounted() {
        draw_tooltip(
            frame,
            layout.map_surface,
            viewport,
            instance.interaction().tooltip(),
            view.catalog,
        );
    }
}

pub fn tooltip_lines(snapshot: &EquipmentSnapshot, catalog: &StateCatalog) -> Vec<String> {
    let mut lines = vec![
        format!("State: {}", catalog.name_of(&snapshot.state_id).unwrap_or("")),
        format!("Name: {}", snapshot.name),
    ];
    if let Some(model) = &snapshot.model_name {
        lines.push(format!("Model: {model}"));
    }
    lines
}

/// Bordered box size for the given lines, saturating at `u16::MAX`.
pub fn tooltip_size(lines: &[String]) -> (u16, u16) {
    let widest = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let width = u16::try_from(widest).unwrap_or(u16::MAX).saturating_add(2);
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    (width, height)
}

/// Box for a tooltip whose bottom-left corner sits at `anchor`, kept inside `bounds`.
pub fn tooltip_rect(bounds: Rect, anchor: (u16, u16), width: u16, height: u16) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    let max_x = bounds.x + bounds.width - width;
    let x = anchor.0.clamp(bounds.x, max_x);
    let top = (anchor.1 + 1).saturating_sub(height);
    let max_y = bounds.y + bounds.height - height;
    let y = top.clamp(bounds.y, max_y);
    Rect::new(x, y, width, height)
}

fn draw_tooltip(
    frame: &mut Frame,
    surface: Rect,
    viewport: &Viewport,
    tooltip: &TooltipOverlay,
    catalog: &StateCatalog,
) {
    let (Some(snapshot), Some(anchor)) = (tooltip.target(), tooltip.anchor()) else {
        return;
    };
    if surface.width == 0 || surface.height == 0 {
        return;
    }
    let pixel = viewport.coordinate_to_pixel(anchor);
    let offset = Pixel::new(pixel.x + TOOLTIP_OFFSET.0, pixel.y + TOOLTIP_OFFSET.1);
    let Some(cell) = pixel_to_cell(surface, offset).or_else(|| pixel_to_cell(surface, pixel))
    else {
        return;
    };

    let lines = tooltip_lines(snapshot, catalog);
    let (width, height) = tooltip_size(&lines);
    let area = tooltip_rect(surface, cell, width, height);

    let block = Block::default().borders(Borders::ALL);
    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_legend(frame: &mut Frame, area: Rect, view: &MapView<'_>) {
    let block = Block::default().borders(Borders::ALL).title("States");
    let layer = view.host.mounted().map(|instance| instance.layer());
    let lines: Vec<Line> = view
        .catalog
        .iter()
        .enumerate()
        .map(|(index, (id, state))| {
            let checkbox = if state.is_selected { "[x]" } else { "[ ]" };
            let count = layer.map(|layer| layer.count_in_state(id)).unwrap_or(0);
            Line::from(vec![
                Span::styled(
                    format!("{} ", index + 1),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(format!("{checkbox} ")),
                Span::styled("●", Style::default().fg(terminal_color(&state.color))),
                Span::raw(format!(" {} ", state.name)),
                Span::styled(format!("({count})"), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines);
    frame.render_widget(block, area);
    frame.render_widget(paragraph, inner(area));
}

fn draw_equipment_detail(
    frame: &mut Frame,
    area: Rect,
    equipment_id: &str,
    snapshot: Option<&EquipmentSnapshot>,
    catalog: &StateCatalog,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("/equipment/{equipment_id}"));
    let label = Style::default().fg(Color::Yellow);

    let lines = match snapshot {
        Some(snapshot) => {
            let state_name = catalog.name_of(&snapshot.state_id).unwrap_or("");
            let mut lines = vec![
                Line::from(Span::styled(
                    snapshot.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled("ID       ", label),
                    Span::raw(snapshot.equipment_id.clone()),
                ]),
                Line::from(vec![
                    Span::styled("State    ", label),
                    Span::styled(
                        "● ",
                        Style::default().fg(terminal_color(catalog.color_of(&snapshot.state_id))),
                    ),
                    Span::raw(state_name.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Position ", label),
                    Span::raw(format!(
                        "{:.6}, {:.6}",
                        snapshot.position.lat, snapshot.position.lon
                    )),
                ]),
            ];
            if let Some(model) = &snapshot.model_name {
                lines.push(Line::from(vec![
                    Span::styled("Model    ", label),
                    Span::raw(model.clone()),
                ]));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "Equipment not found",
            Style::default().fg(Color::Red),
        ))],
    };

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(paragraph, inner(area));
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(paragraph, inner(area));
}

#[cfg(test)]
mod tests {
    use fleet_core::{FleetMapConfig, GeoPoint};

    use super::*;

    fn snapshot(state_id: &str, model: Option<&str>) -> EquipmentSnapshot {
        EquipmentSnapshot {
            equipment_id: "a".into(),
            state_id: state_id.into(),
            position: GeoPoint::new(-22.9, -43.2),
            name: "CA-0001".into(),
            model_name: model.map(str::to_string),
        }
    }

    #[test]
    fn push_log_trims_and_caps() {
        let mut state = UiState::default();
        state.push_log("first\n");
        state.push_log("\n");
        for index in 0..20 {
            state.push_log(format!("line {index}"));
        }
        assert_eq!(state.logs.len(), state.max_logs);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 19"));
    }

    #[test]
    fn tooltip_shows_state_name_or_blank() {
        let catalog = StateCatalog::from_config(&FleetMapConfig::default());
        let known = snapshot("0808344c-454b-4c36-89e8-d7687e692d57", Some("Trator"));
        assert_eq!(
            tooltip_lines(&known, &catalog),
            vec!["State: Operando", "Name: CA-0001", "Model: Trator"]
        );
        let unknown = snapshot("ghost", None);
        assert_eq!(
            tooltip_lines(&unknown, &catalog),
            vec!["State: ", "Name: CA-0001"]
        );
    }

    #[test]
    fn tooltip_box_sits_above_anchor_and_stays_inside() {
        let bounds = Rect::new(1, 1, 40, 20);
        assert_eq!(tooltip_rect(bounds, (10, 10), 12, 4), Rect::new(10, 7, 12, 4));
        // pushed back inside near the top-right corner
        assert_eq!(tooltip_rect(bounds, (38, 1), 12, 4), Rect::new(29, 1, 12, 4));
    }

    #[test]
    fn tooltip_size_saturates_for_huge_names() {
        let lines = vec!["State: ".to_string(), "Name: CA-0001".to_string()];
        assert_eq!(tooltip_size(&lines), (15, 4));

        let huge = vec!["x".repeat(70_000)];
        assert_eq!(tooltip_size(&huge), (u16::MAX, 3));
        let bounds = Rect::new(0, 0, 80, 24);
        let area = tooltip_rect(bounds, (10, 10), u16::MAX, 3);
        assert_eq!(area.width, 80);
    }

    #[test]
    fn legend_rows_resolve_to_entries() {
        let layout = UiLayout::new(Rect::new(0, 0, 100, 40));
        let rows = layout.legend_rows;
        assert_eq!(layout.legend_row_at(rows.x, rows.y, 3), Some(0));
        assert_eq!(layout.legend_row_at(rows.x + 2, rows.y + 2, 3), Some(2));
        assert_eq!(layout.legend_row_at(rows.x, rows.y + 3, 3), None);
        assert_eq!(layout.legend_row_at(layout.map_surface.x, rows.y, 3), None);
    }

    #[test]
    fn routes_follow_navigation_intents() {
        let route = Route::from(NavigationIntent {
            equipment_id: "eq-7".into(),
        });
        assert_eq!(route.path(), "/equipment/eq-7");
        assert_eq!(Route::Map.path(), "/");
    }
}
