//! File-based Content Source Adapter
//!
//! Reads `<variant>.json`, `<variant>.yaml` or `<variant>.yml` from a content
//! directory. Variants with no file fall back to the built-in content.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::content::{builtin_content, ContentItem};
use crate::domain::foundation::AgentVariant;
use crate::ports::{ContentSource, ContentSourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

/// Content loaded from JSON or YAML files
#[derive(Debug, Clone)]
pub struct FileContentSource {
    content_dir: PathBuf,
}

impl FileContentSource {
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
        }
    }

    fn candidates(&self, variant: AgentVariant) -> [(PathBuf, Format); 3] {
        let key = variant.key();
        [
            (self.content_dir.join(format!("{}.json", key)), Format::Json),
            (self.content_dir.join(format!("{}.yaml", key)), Format::Yaml),
            (self.content_dir.join(format!("{}.yml", key)), Format::Yaml),
        ]
    }

    fn parse(variant: AgentVariant, raw: &str, format: Format) -> Result<Vec<ContentItem>, ContentSourceError> {
        let malformed = |reason: String| ContentSourceError::Malformed { variant, reason };
        match format {
            Format::Json => serde_json::from_str(raw).map_err(|e| malformed(e.to_string())),
            Format::Yaml => serde_yaml::from_str(raw).map_err(|e| malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl ContentSource for FileContentSource {
    async fn load(&self, variant: AgentVariant) -> Result<Vec<ContentItem>, ContentSourceError> {
        for (path, format) in self.candidates(variant) {
            match fs::read_to_string(&path).await {
                Ok(raw) => {
                    let items = Self::parse(variant, &raw, format)?;
                    tracing::info!(
                        variant = %variant,
                        path = %path.display(),
                        items = items.len(),
                        "Loaded content file"
                    );
                    return Ok(items);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ContentSourceError::ReadFailed {
                        variant,
                        reason: e.to_string(),
                    })
                }
            }
        }

        let items = builtin_content(variant);
        tracing::debug!(variant = %variant, items = items.len(), "Using built-in content");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn falls_back_to_builtin_content() {
        let dir = TempDir::new().unwrap();
        let source = FileContentSource::new(dir.path());

        let items = source.load(AgentVariant::ImprovBattle).await.unwrap();
        assert_eq!(items.iter().filter_map(ContentItem::as_scenario).count(), 5);
    }

    #[tokio::test]
    async fn reads_json_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("improv_battle.json"),
            r#"[{"type": "scenario", "id": "only", "prompt": "You are a lighthouse keeper."}]"#,
        )
        .unwrap();
        let source = FileContentSource::new(dir.path());

        let items = source.load(AgentVariant::ImprovBattle).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_scenario().unwrap().id, "only");
    }

    #[tokio::test]
    async fn reads_yaml_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("lead_capture.yaml"),
            "- type: faq\n  question: Do you have a free plan?\n  answer: Yes, for up to three users.\n  tags: [pricing]\n",
        )
        .unwrap();
        let source = FileContentSource::new(dir.path());

        let items = source.load(AgentVariant::LeadCapture).await.unwrap();
        assert_eq!(items[0].as_faq().unwrap().tags, vec!["pricing".to_string()]);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("commerce.json"), "[{\"type\": \"unicorn\"}]").unwrap();
        let source = FileContentSource::new(dir.path());

        let result = source.load(AgentVariant::Commerce).await;
        assert!(matches!(result, Err(ContentSourceError::Malformed { .. })));
    }
}
