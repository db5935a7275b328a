//! Stand-in for the host's "note modified" notifications.
//!
//! Polls the checklist note's modification time and reports changes to the
//! runtime queue.

use pomonote_core::notes::normalize_note_path;
use pomonote_core::runtime::Input;
use pomonote_core::VaultStore;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

async fn modified_at(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// Watch `note` inside `vault`. Returns `None` when the path is unusable.
pub fn spawn_note_watch(
    tx: mpsc::Sender<Input>,
    vault: &VaultStore,
    note: &Path,
    period: Duration,
) -> Option<JoinHandle<()>> {
    let relative = match normalize_note_path(note) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(error = %e, "not watching checklist");
            return None;
        }
    };
    let full = vault.root().join(&relative);

    Some(tokio::spawn(async move {
        let mut last = modified_at(&full).await;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let current = modified_at(&full).await;
            if current.is_some() && current != last {
                tracing::debug!(path = %relative.display(), "note modified");
                if tx.send(Input::FileModified(relative.clone())).await.is_err() {
                    break;
                }
            }
            last = current;
        }
    }))
}
