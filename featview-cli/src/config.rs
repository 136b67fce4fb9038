//! Configuration handling for the featview CLI
//!
//! Supports loading configuration from featview.toml files with CLI argument overrides.

use featview_core::PartialSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};

pub const DEFAULT_CONFIG_FILE: &str = "featview.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub export: ExportSection,
    /// Viewer settings applied under the document's own settings
    #[serde(default)]
    pub settings: PartialSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Surface width in pixels
    #[serde(default = "default_width")]
    pub width: f64,

    /// Minimum surface height; grows to fit the rows
    #[serde(default = "default_height")]
    pub height: f64,

    /// Fixed seed for coil noise so exports are reproducible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coil_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    /// Stamp a generation footer on exported documents
    #[serde(default = "default_true")]
    pub footer: bool,

    /// Comment written at the top of exported documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

fn default_width() -> f64 { 800.0 }
fn default_height() -> f64 { 200.0 }
fn default_true() -> bool { true }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            coil_seed: None,
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            footer: true,
            provenance: None,
            title: None,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::file_not_found(path.to_path_buf()));
                }
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)
                } else {
                    log::info!("Using default configuration");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> CliResult<()> {
        if !(self.render.width > 0.0 && self.render.width.is_finite()) {
            return Err(CliError::validation(format!("render width must be positive, got {}", self.render.width)));
        }
        if !(self.render.height >= 0.0 && self.render.height.is_finite()) {
            return Err(CliError::validation(format!("render height must not be negative, got {}", self.render.height)));
        }
        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> CliResult<String> {
        let config = Self {
            render: RenderConfig { coil_seed: Some(42), ..Default::default() },
            export: ExportSection { provenance: Some("generated by featview".to_string()), ..Default::default() },
            settings: PartialSettings {
                line_height: Some(32.0),
                content_size: Some(16.0),
                ..Default::default()
            },
        };
        Ok(toml::to_string_pretty(&config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.width, 800.0);
        assert!(config.export.footer);
        assert_eq!(config.settings, PartialSettings::default());
    }

    #[test]
    fn test_config_roundtrip() -> CliResult<()> {
        let mut config = Config::default();
        config.render.coil_seed = Some(9);
        config.settings.text_color = Some("navy".to_string());
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = Config::load_from_file(temp_file.path())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            "[render]\nwidth = 640.0\n\n[settings]\nline-height = 40.0\nsequence-show = false\n",
        )
        .unwrap();
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.height, 200.0);
        assert!(config.export.footer);
        assert_eq!(config.settings.line_height, Some(40.0));
        assert_eq!(config.settings.sequence_show, Some(false));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/featview.toml"))).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_width_is_rejected() -> CliResult<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), "[render]\nwidth = 0.0\n")?;
        let err = Config::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() {
        let example = Config::example_toml().unwrap();
        assert!(example.contains("[render]"));
        assert!(example.contains("[export]"));
        assert!(example.contains("[settings]"));
        assert!(example.contains("line-height"));
    }
}
