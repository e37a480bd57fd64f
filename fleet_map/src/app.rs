use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, warn};

use crate::loader::{FleetLoad, LoaderCommand, ReloadReason};
use crate::session::{KeyOutcome, MapSession};
use crate::ui::{draw_ui, UiLayout, UiState};

pub struct FleetMapApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    session: MapSession,
    fleet_receiver: UnboundedReceiver<FleetLoad>,
    control_sender: UnboundedSender<LoaderCommand>,
    log_receiver: Receiver<String>,
}

impl FleetMapApp {
    pub fn new(
        session: MapSession,
        fleet_receiver: UnboundedReceiver<FleetLoad>,
        control_sender: UnboundedSender<LoaderCommand>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(terminal.backend_mut(), EnableMouseCapture)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            ui_state: UiState::default(),
            session,
            fleet_receiver,
            control_sender,
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let result = self.event_loop();

        self.session.teardown();
        crossterm::execute!(self.terminal.backend_mut(), DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        let _ = self.control_sender.send(LoaderCommand::Shutdown);
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut last_draw: Option<Instant> = None;

        loop {
            while let Ok(load) = self.fleet_receiver.try_recv() {
                self.apply_load(load);
            }

            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
            }

            let layout = UiLayout::new(self.terminal.size()?);
            self.session.fit_viewport(&layout);

            if last_draw.map_or(true, |at| at.elapsed() >= Duration::from_millis(100)) {
                let view = self.session.view();
                let ui_state = &self.ui_state;
                self.terminal
                    .draw(|frame| draw_ui(frame, &layout, ui_state, &view))?;
                last_draw = Some(Instant::now());
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => match self.session.handle_key(key) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Reload => self.request_reload(),
                        KeyOutcome::Continue => {}
                    },
                    Event::Mouse(mouse) => self.session.handle_mouse(mouse, &layout),
                    Event::Resize(_, _) => last_draw = None,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn apply_load(&mut self, load: FleetLoad) {
        self.ui_state.record_load(&load);
        debug!(
            target: "fleet_map::app",
            reason = ?load.reason,
            units = load.snapshots.len(),
            "fleet.applied"
        );
        if let Some(err) = &load.error {
            error!(target: "fleet_map::app", error = %err, "fleet.load_failed");
        }
        self.session.replace_fleet(load.snapshots);
    }

    fn request_reload(&mut self) {
        if self
            .control_sender
            .send(LoaderCommand::Reload(ReloadReason::Manual))
            .is_err()
        {
            warn!(target: "fleet_map::app", "loader.unavailable");
        } else {
            self.ui_state.push_log("Reload requested");
        }
    }
}
