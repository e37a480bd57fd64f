use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use fleet_core::{
    load_fleet_map_config, load_fleet_map_config_from_env, GeoPoint, MapHost, StateCatalog,
    Viewport,
};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};

mod app;
mod canvas;
mod loader;
mod session;
mod ui;
mod watcher;

use app::FleetMapApp;
use canvas::TerminalCanvas;
use loader::{channel, run_loader, DataSources, LoaderCommand, ReloadReason};
use session::MapSession;

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal map of the equipment fleet", long_about = None)]
struct Cli {
    /// Directory holding the position, state and equipment documents.
    #[arg(long, default_value = "dados")]
    data_dir: PathBuf,
    /// Map configuration file; falls back to FLEET_MAP_CONFIG_PATH, then the builtin copy.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Reload whenever a document in the data directory changes.
    #[arg(long)]
    watch: bool,
    /// Extra pointer slack in pixels around each marker.
    #[arg(long)]
    hit_tolerance: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (log_tx, log_rx) = mpsc::channel::<String>();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_tx.clone(),
        })
        .init();

    let cli = Cli::parse();
    let (config, metadata) = match cli.config.as_deref() {
        Some(path) => load_fleet_map_config(Some(path)),
        None => load_fleet_map_config_from_env(),
    };
    info!(
        data_dir = %cli.data_dir.display(),
        config = ?metadata.path(),
        "Starting fleet map"
    );

    let catalog = StateCatalog::from_config(&config);
    let viewport = Viewport::centered_on(
        GeoPoint::new(config.view.center_lat, config.view.center_lon),
        config.view.zoom,
        0.0,
        0.0,
    );
    let tolerance = cli.hit_tolerance.unwrap_or(config.hit_tolerance_px).max(0.0);
    let host = MapHost::new(
        TerminalCanvas::default(),
        viewport,
        config.point_style.clone(),
        tolerance,
    );

    let data = DataSources::new(cli.data_dir.clone(), config.sources.clone());
    let (control_tx, mut control_rx) = unbounded_channel::<LoaderCommand>();
    let (fleet_tx, fleet_rx) = channel();

    let _watcher = if cli.watch {
        match watcher::watch_data_dir(data.dir(), control_tx.clone()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(error = %err, "Failed to watch data directory");
                None
            }
        }
    } else {
        None
    };

    control_tx.send(LoaderCommand::Reload(ReloadReason::Startup))?;

    let ui_control = control_tx.clone();
    let ui_handle = std::thread::spawn(move || -> Result<()> {
        let session = MapSession::new(host, catalog);
        let result = FleetMapApp::new(session, fleet_rx, ui_control.clone(), log_rx)
            .and_then(FleetMapApp::run);
        let _ = ui_control.send(LoaderCommand::Shutdown);
        result
    });
    drop(control_tx);

    run_loader(&data, &mut control_rx, &fleet_tx).await;

    match ui_handle.join() {
        Ok(result) => result,
        Err(_) => Err(eyre!("fleet map UI thread panicked")),
    }
}
