use std::path::PathBuf;

use serde::Deserialize;

use crate::manager::RecordManager;
use crate::session::SessionGate;
use crate::store::RecordStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub manager: Option<RecordManager>,
    pub session: SessionGate,
}

impl AppState {
    /// Opens (creating if needed) the workspace database and replaces any
    /// previously open one.
    pub fn open_workspace(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let store = RecordStore::open(&path)?;
        if let Some(previous) = self.manager.take() {
            if let Err(e) = previous.close() {
                tracing::warn!(error = %e, "closing previous workspace failed");
            }
        }
        tracing::info!(workspace = %path.display(), "workspace opened");
        self.manager = Some(RecordManager::new(store));
        self.workspace = Some(path);
        Ok(())
    }
}
