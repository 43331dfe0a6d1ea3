//! Settings loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::EngineSettings;

/// File name looked up inside a settings directory.
pub const SETTINGS_FILE: &str = "engine.yaml";

/// Loads and provides access to engine settings.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── engine.yaml   # currency scale, installment ceiling, due date cadence
/// ```
///
/// # Example
///
/// ```no_run
/// use fee_schedule_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// println!("Installment ceiling: {}", loader.settings().max_installments);
/// # Ok::<(), fee_schedule_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLoader {
    settings: EngineSettings,
}

impl ConfigLoader {
    /// Loads settings from `<path>/engine.yaml`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - the file is missing (`SettingsNotFound`)
    /// - the file contains invalid YAML or out-of-range values (`SettingsParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let settings_path = path.as_ref().join(SETTINGS_FILE);
        let path_str = settings_path.display().to_string();

        let content =
            fs::read_to_string(&settings_path).map_err(|_| EngineError::SettingsNotFound {
                path: path_str.clone(),
            })?;

        Self::parse(&content, &path_str)
    }

    /// Parses settings from an in-memory YAML document.
    ///
    /// # Example
    ///
    /// ```
    /// use fee_schedule_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::from_yaml_str("currency_scale: 2\nmax_installments: 36\n")?;
    /// assert_eq!(loader.settings().currency_scale, 2);
    /// assert_eq!(loader.settings().max_installments, 36);
    /// # Ok::<(), fee_schedule_engine::error::EngineError>(())
    /// ```
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        Self::parse(yaml, "<inline>")
    }

    fn parse(content: &str, source: &str) -> EngineResult<Self> {
        // An empty document is valid and means "all defaults".
        let settings = if content.trim().is_empty() {
            EngineSettings::default()
        } else {
            serde_yaml::from_str::<EngineSettings>(content).map_err(|e| {
                EngineError::SettingsParseError {
                    path: source.to_string(),
                    message: e.to_string(),
                }
            })?
        };

        settings.validate(source)?;
        Ok(Self { settings })
    }

    /// Returns the loaded settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Consumes the loader and returns the settings.
    pub fn into_settings(self) -> EngineSettings {
        self.settings
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cadence;

    fn config_path() -> &'static str {
        "./config"
    }

    #[test]
    fn test_load_repository_settings() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load settings: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.settings().currency_scale, 0);
        assert_eq!(loader.settings().max_installments, 240);
        assert_eq!(loader.settings().cadence, Cadence::Monthly);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::SettingsNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            other => panic!("Expected SettingsNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_temp_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "currency_scale: 2\ncadence:\n  kind: every_months\n  months: 3\n",
        )
        .unwrap();

        let loader = ConfigLoader::load(dir.path()).unwrap();
        assert_eq!(loader.settings().currency_scale, 2);
        assert_eq!(loader.settings().cadence, Cadence::EveryMonths { months: 3 });
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "currency_scale: [not, a, number]").unwrap();

        match ConfigLoader::load(dir.path()) {
            Err(EngineError::SettingsParseError { path, .. }) => {
                assert!(path.ends_with("engine.yaml"));
            }
            other => panic!("Expected SettingsParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_values_return_parse_error() {
        let result = ConfigLoader::from_yaml_str("currency_scale: 12");
        assert!(matches!(
            result,
            Err(EngineError::SettingsParseError { .. })
        ));
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let loader = ConfigLoader::from_yaml_str("  \n").unwrap();
        assert_eq!(loader.into_settings(), EngineSettings::default());
    }
}
