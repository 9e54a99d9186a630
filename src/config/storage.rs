//! Storage locations

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where records are written and content is read from
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<variant>.jsonl` record file per variant
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding `<variant>.json` / `<variant>.yaml` content files
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("storage.data_dir"));
        }
        if self.content_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("storage.content_dir"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            content_dir: default_content_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("./shared-data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.content_dir, PathBuf::from("./shared-data"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_data_dir_is_rejected() {
        let config = StorageConfig {
            data_dir: PathBuf::new(),
            ..StorageConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyPath("storage.data_dir")));
    }
}
