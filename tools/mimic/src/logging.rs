use crate::config::{RecordingConfig, DEFAULT_MAX_PAYLOAD_BYTES};
use crate::errors::MimicError;
use crate::runtime::{FileSystem, ProductionFileSystem};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_file_system(path, Arc::new(ProductionFileSystem))
    }

    pub fn with_file_system(path: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            fs,
        }
    }

    /// Logger for the configured log path, if any.
    pub fn from_config(cfg: &RecordingConfig, fs: Arc<dyn FileSystem>) -> Option<Self> {
        cfg.log_path.as_ref().map(|path| {
            let mut logger = Self::with_file_system(path, fs);
            logger.max_payload_bytes = cfg.max_payload_bytes;
            logger
        })
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), MimicError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent)?;
            }
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| MimicError::Serialize(e.to_string()))?;
        self.fs.append_line(&self.path, &line)
    }
}

impl std::fmt::Debug for JsonlLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlLogger")
            .field("path", &self.path)
            .field("max_payload_bytes", &self.max_payload_bytes)
            .finish_non_exhaustive()
    }
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}
