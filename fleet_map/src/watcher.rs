use std::path::Path;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::loader::{LoaderCommand, ReloadReason};

/// Request a reload whenever a document in `dir` is created, changed or removed.
///
/// The watcher stops when the returned handle is dropped.
pub fn watch_data_dir(
    dir: &Path,
    control: UnboundedSender<LoaderCommand>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<notify::Event>| match result {
            Ok(event) if touches_documents(&event.kind) => {
                let _ = control.send(LoaderCommand::Reload(ReloadReason::FilesChanged));
            }
            Ok(_) => {}
            Err(err) => warn!(target: "fleet_map::watcher", error = %err, "watcher.error"),
        })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    info!(
        target: "fleet_map::watcher",
        dir = %dir.display(),
        "watcher.started"
    );
    Ok(watcher)
}

fn touches_documents(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
