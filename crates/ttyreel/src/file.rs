//! Recording file persistence.

use crate::config::{resolve_file_path, ConfigDocument, RecordingConfig};
use crate::frame::FrameSequence;
use crate::result::{ReelError, ReelResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_HEADER: &str =
    "# The configurations that used for the recording, feel free to edit them\n";
const RECORDS_HEADER: &str = "\n# Records, feel free to edit them\n";

/// A loaded recording: its configuration and frames
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordingFile {
    #[serde(default)]
    pub config: RecordingConfig,
    pub records: FrameSequence,
}

#[derive(Serialize)]
struct RecordsSection<'a> {
    records: &'a FrameSequence,
}

impl RecordingFile {
    /// Parse recording YAML
    pub fn from_yaml(text: &str) -> ReelResult<Self> {
        serde_yaml_ng::from_str(text).map_err(|e| ReelError::invalid_recording(e.to_string()))
    }

    /// Load a recording, appending `.yml` when needed
    pub fn load(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = resolve_file_path(path.as_ref(), "yml")?;
        if !path.is_file() {
            return Err(ReelError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(&path)?;
        let recording = Self::from_yaml(&text)?;
        info!(path = %path.display(), frames = recording.records.len(), "loaded recording");
        Ok(recording)
    }

    /// Build the file text: commented config section with the raw config
    /// indented, followed by the records
    pub fn document(config: &ConfigDocument, records: &FrameSequence) -> ReelResult<String> {
        let indented = config
            .raw()
            .split('\n')
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        let records = serde_yaml_ng::to_string(&RecordsSection { records })?;

        Ok(format!(
            "{CONFIG_HEADER}config:\n\n{indented}{RECORDS_HEADER}{records}"
        ))
    }

    /// Write a recording and return the resolved path
    pub fn save(
        path: impl AsRef<Path>,
        config: &ConfigDocument,
        records: &FrameSequence,
    ) -> ReelResult<PathBuf> {
        let path = resolve_file_path(path.as_ref(), "yml")?;
        let text = Self::document(config, records)?;
        std::fs::write(&path, text)?;
        info!(path = %path.display(), frames = records.len(), "saved recording");
        Ok(path)
    }
}
