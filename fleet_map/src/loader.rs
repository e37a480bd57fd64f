//! Fetches the fleet documents from the data directory and aggregates them.
//!
//! The required documents are read concurrently and aggregation only starts
//! once all of them are in. Any failure yields an empty fleet.

use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use fleet_core::{
    parse_models, snapshots_or_empty, EquipmentSnapshot, HistorySources, SourceConfig,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    Startup,
    Manual,
    FilesChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderCommand {
    Reload(ReloadReason),
    Shutdown,
}

/// Result of one fetch-and-aggregate pass.
#[derive(Debug, Clone)]
pub struct FleetLoad {
    pub reason: ReloadReason,
    pub snapshots: Vec<EquipmentSnapshot>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DataSources {
    dir: PathBuf,
    sources: SourceConfig,
}

impl DataSources {
    pub fn new(dir: PathBuf, sources: SourceConfig) -> Self {
        Self { dir, sources }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

pub fn channel() -> (UnboundedSender<FleetLoad>, UnboundedReceiver<FleetLoad>) {
    unbounded_channel()
}

async fn read_document(path: PathBuf) -> Result<String> {
    tokio::fs::read_to_string(&path)
        .await
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

async fn read_optional_document(path: Option<PathBuf>) -> Option<String> {
    let path = path?;
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => Some(contents),
        Err(err) => {
            warn!(
                target: "fleet_map::loader",
                path = %path.display(),
                error = %err,
                "loader.model_catalog_unavailable"
            );
            None
        }
    }
}

pub async fn fetch_sources(data: &DataSources) -> Result<HistorySources> {
    let required = async {
        tokio::try_join!(
            read_document(data.path(&data.sources.position_history)),
            read_document(data.path(&data.sources.state_history)),
            read_document(data.path(&data.sources.equipment)),
        )
    };
    let model_path = data
        .sources
        .equipment_model
        .as_deref()
        .map(|name| data.path(name));
    let (required, models) = tokio::join!(required, read_optional_document(model_path));
    let (positions, states, equipment) = required?;

    let mut sources = HistorySources::from_documents(&positions, &states, &equipment)?;
    if let Some(models) = models {
        match parse_models(&models) {
            Ok(models) => sources.models = models,
            Err(err) => warn!(
                target: "fleet_map::loader",
                error = %err,
                "loader.model_catalog_unavailable"
            ),
        }
    }
    Ok(sources)
}

pub async fn load_fleet(data: &DataSources, reason: ReloadReason) -> FleetLoad {
    let fetched = fetch_sources(data).await;
    let error = fetched.as_ref().err().map(|err| format!("{err:#}"));
    let snapshots = snapshots_or_empty(fetched);
    info!(
        target: "fleet_map::loader",
        ?reason,
        units = snapshots.len(),
        failed = error.is_some(),
        "fleet.loaded"
    );
    FleetLoad {
        reason,
        snapshots,
        error,
    }
}

/// Serve reload requests until shutdown or until the UI stops listening.
pub async fn run_loader(
    data: &DataSources,
    control: &mut UnboundedReceiver<LoaderCommand>,
    fleet: &UnboundedSender<FleetLoad>,
) {
    while let Some(command) = control.recv().await {
        let LoaderCommand::Reload(mut reason) = command else {
            break;
        };
        // collapse a burst of file events into one pass
        let mut shutdown = false;
        while let Ok(next) = control.try_recv() {
            match next {
                LoaderCommand::Reload(next_reason) => reason = next_reason,
                LoaderCommand::Shutdown => {
                    shutdown = true;
                    break;
                }
            }
        }
        if shutdown {
            break;
        }

        let load = load_fleet(data, reason).await;
        if fleet.send(load).is_err() {
            warn!(target: "fleet_map::loader", "loader.receiver_closed");
            break;
        }
    }
    info!(target: "fleet_map::loader", "loader.stopped");
}
