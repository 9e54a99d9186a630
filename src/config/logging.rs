//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `info,voice_flows=debug`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Validate logging configuration
    ///
    /// Every directive must end in a known level, with or without a
    /// `target=` prefix.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for directive in self.level.split(',').map(str::trim) {
            let level = directive.rsplit('=').next().unwrap_or(directive);
            if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ValidationError::UnknownLogLevel(directive.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_level(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            json: false,
        }
    }

    #[test]
    fn test_targeted_directives_are_accepted() {
        assert!(with_level("info,voice_flows=debug").validate().is_ok());
        assert!(with_level("WARN").validate().is_ok());
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert_eq!(
            with_level("info,voice_flows=loud").validate(),
            Err(ValidationError::UnknownLogLevel("voice_flows=loud".to_string()))
        );
        assert!(with_level("").validate().is_err());
    }
}
