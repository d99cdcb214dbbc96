// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reading and writing flow files.

use crate::exchange::{FlowError, ImportSummary};
use crate::store::GraphStore;
use nodeflow_graph::NodeData;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when exporting without an explicit path
pub const DEFAULT_EXPORT_FILE_NAME: &str = "drawflow-export.json";

/// Read a flow file as text
pub async fn read_flow_file(path: &Path) -> Result<String, FlowError> {
    tokio::fs::read_to_string(path).await.map_err(|source| FlowError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write flow text to a file, replacing it
pub async fn write_flow_file(path: &Path, contents: &str) -> Result<(), FlowError> {
    tokio::fs::write(path, contents).await.map_err(|source| FlowError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl<D: NodeData> GraphStore<D> {
    /// Read a flow file and import it
    pub async fn import_flow_from_file(
        &mut self,
        path: &Path,
        clear_existing: bool,
    ) -> Result<ImportSummary, FlowError> {
        let json = read_flow_file(path).await?;
        let summary = self.import_flow(&json, clear_existing)?;
        info!("Imported {}", path.display());
        Ok(summary)
    }

    /// Export to `path`, or to [`DEFAULT_EXPORT_FILE_NAME`] in the working
    /// directory. Returns the path written.
    pub async fn export_flow_to_file(&mut self, path: Option<&Path>) -> Result<PathBuf, FlowError> {
        let path = path.map_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE_NAME), Path::to_path_buf);
        let json = self.export_flow()?;
        write_flow_file(&path, &json).await?;
        info!("Exported flow to {}", path.display());
        Ok(path)
    }
}
