//! Storage configuration.
//!
//! Read from JSON, e.g.
//! `{"root": "/var/lib/chunkflow", "dirMode": 493, "retentionSecs": 3600}`.
//! Everything except `root` is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::TransferError;
use crate::permissions::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, FilePermissions};

/// Default age after which an abandoned upload is swept: one day.
pub const DEFAULT_RETENTION_SECS: u64 = 24 * 60 * 60;

fn default_dir_mode() -> u32 {
    DEFAULT_DIR_MODE
}

fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

fn default_retention_secs() -> u64 {
    DEFAULT_RETENTION_SECS
}

/// Where and how uploads are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
    /// Storage root. Each upload gets one subdirectory under it.
    pub root: PathBuf,
    #[serde(default = "default_dir_mode")]
    pub dir_mode: u32,
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,
    /// Age in seconds after which an upload directory is swept.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl FlowConfig {
    /// Creates a configuration with default modes and retention.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
            retention_secs: DEFAULT_RETENTION_SECS,
        }
    }

    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TransferError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TransferError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), root = %config.root.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TransferError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TransferError::Config(e.to_string()))?;
        if config.root.as_os_str().is_empty() {
            return Err(TransferError::Config("root must not be empty".into()));
        }
        Ok(config)
    }

    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention_secs = retention.as_secs();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn permissions(&self) -> FilePermissions {
        FilePermissions {
            dir_mode: self.dir_mode,
            file_mode: self.file_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_applied_to_missing_fields() {
        let config = FlowConfig::from_json(r#"{"root":"/srv/uploads"}"#).unwrap();
        assert_eq!(config.root(), Path::new("/srv/uploads"));
        assert_eq!(config.dir_mode, DEFAULT_DIR_MODE);
        assert_eq!(config.file_mode, DEFAULT_FILE_MODE);
        assert_eq!(config.retention(), Duration::from_secs(DEFAULT_RETENTION_SECS));
    }

    #[test]
    fn overrides_are_independent() {
        let config =
            FlowConfig::from_json(r#"{"root":"/srv/uploads","fileMode":416,"retentionSecs":60}"#)
                .unwrap();
        assert_eq!(config.file_mode, 0o640);
        assert_eq!(config.dir_mode, DEFAULT_DIR_MODE);
        assert_eq!(config.retention(), Duration::from_secs(60));
        assert_eq!(
            config.permissions(),
            FilePermissions {
                dir_mode: DEFAULT_DIR_MODE,
                file_mode: 0o640
            }
        );
    }

    #[test]
    fn missing_root_rejected() {
        let err = FlowConfig::from_json(r#"{"dirMode":448}"#).unwrap_err();
        assert!(matches!(err, TransferError::Config(_)));
    }

    #[test]
    fn empty_root_rejected() {
        let err = FlowConfig::from_json(r#"{"root":""}"#).unwrap_err();
        assert!(matches!(err, TransferError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunkflow.json");
        std::fs::write(&path, r#"{"root":"/data","dirMode":493}"#).unwrap();

        let config = FlowConfig::load(&path).unwrap();
        assert_eq!(config.root(), Path::new("/data"));
        assert_eq!(config.dir_mode, 0o755);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = FlowConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TransferError::Config(_)));
    }

    #[test]
    fn builder_methods() {
        let config = FlowConfig::new("/data")
            .with_dir_mode(0o700)
            .with_file_mode(0o644)
            .with_retention(Duration::from_secs(120));
        assert_eq!(config.dir_mode, 0o700);
        assert_eq!(config.file_mode, 0o644);
        assert_eq!(config.retention_secs, 120);
    }
}
