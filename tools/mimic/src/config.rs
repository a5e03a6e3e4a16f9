use crate::errors::MimicError;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_ENTITY_DEPTH: usize = 32;
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;
pub const DEFAULT_VALUE_HASH_THRESHOLD: usize = 64 * 1024;

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub guard_cycles: Option<bool>,
    pub max_entity_depth: Option<usize>,
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MimicConfig {
    pub matching: MatchingConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchingConfig {
    /// Treat a fake pair already under comparison as equivalent.
    pub guard_cycles: bool,
    pub max_entity_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordingConfig {
    pub log_path: Option<PathBuf>,
    pub max_payload_bytes: usize,
    /// Rendered values longer than this are stored as a digest.
    pub value_hash_threshold: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            guard_cycles: true,
            max_entity_depth: DEFAULT_MAX_ENTITY_DEPTH,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            value_hash_threshold: DEFAULT_VALUE_HASH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialMimicConfig {
    matching: Option<PartialMatchingConfig>,
    recording: Option<PartialRecordingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialMatchingConfig {
    guard_cycles: Option<bool>,
    max_entity_depth: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialRecordingConfig {
    log_path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
    value_hash_threshold: Option<usize>,
}

pub fn load_config(
    overrides: &ConfigOverrides,
    fs: &dyn FileSystem,
) -> Result<MimicConfig, MimicError> {
    let mut cfg = MimicConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        merge_partial_config(&mut cfg, parse_partial(&file_contents)?);
        // Relative log paths in a file are relative to that file.
        if let Some(base) = path.parent() {
            cfg.recording.log_path = resolve_log_path(&cfg, base);
        }
    }

    apply_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Parses a TOML document on top of the defaults.
pub fn parse_config(text: &str) -> Result<MimicConfig, MimicError> {
    let mut cfg = MimicConfig::default();
    merge_partial_config(&mut cfg, parse_partial(text)?);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn parse_partial(text: &str) -> Result<PartialMimicConfig, MimicError> {
    toml::from_str(text).map_err(|e| MimicError::ConfigParse(e.to_string()))
}

fn merge_partial_config(cfg: &mut MimicConfig, partial: PartialMimicConfig) {
    if let Some(matching) = partial.matching {
        if let Some(value) = matching.guard_cycles {
            cfg.matching.guard_cycles = value;
        }
        if let Some(value) = matching.max_entity_depth {
            cfg.matching.max_entity_depth = value;
        }
    }

    if let Some(recording) = partial.recording {
        if let Some(value) = recording.log_path {
            cfg.recording.log_path = Some(value);
        }
        if let Some(value) = recording.max_payload_bytes {
            cfg.recording.max_payload_bytes = value;
        }
        if let Some(value) = recording.value_hash_threshold {
            cfg.recording.value_hash_threshold = value;
        }
    }
}

fn apply_overrides(cfg: &mut MimicConfig, overrides: &ConfigOverrides) {
    if let Some(value) = overrides.guard_cycles {
        cfg.matching.guard_cycles = value;
    }
    if let Some(value) = overrides.max_entity_depth {
        cfg.matching.max_entity_depth = value;
    }
    if let Some(path) = &overrides.log_path {
        cfg.recording.log_path = Some(path.clone());
    }
}

fn validate_config(cfg: &MimicConfig) -> Result<(), MimicError> {
    if cfg.matching.max_entity_depth == 0 {
        return Err(MimicError::InvalidConfig(
            "matching.max_entity_depth must be greater than zero".to_string(),
        ));
    }

    if cfg.recording.max_payload_bytes == 0 {
        return Err(MimicError::InvalidConfig(
            "recording.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    if let Some(path) = &cfg.recording.log_path {
        if path.as_os_str().is_empty() {
            return Err(MimicError::InvalidConfig(
                "recording.log_path must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

pub fn resolve_log_path(cfg: &MimicConfig, base: &Path) -> Option<PathBuf> {
    cfg.recording.log_path.as_ref().map(|path| {
        if path.is_absolute() {
            path.clone()
        } else {
            base.join(path)
        }
    })
}
