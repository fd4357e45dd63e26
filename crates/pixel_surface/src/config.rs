//! Surface configuration with file loading support
//!
//! Applications that want their window parameters in a config file instead
//! of hard-coded constants can load a [`SurfaceConfig`] from TOML or RON
//! and hand it to [`crate::Surface::open_with`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Parameters for opening a surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Window title
    pub title: String,
    /// Initial client area width in pixels
    pub width: u32,
    /// Initial client area height in pixels
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            title: "pixel surface".to_string(),
            width: 640,
            height: 480,
        }
    }
}

impl SurfaceConfig {
    /// Create a configuration from explicit values
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
        }
    }

    /// Check the configuration for values a surface cannot be opened with
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when either dimension is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from a TOML or RON file
    ///
    /// The format is chosen by file extension.
    ///
    /// # Errors
    /// [`ConfigError`] on IO failure, parse failure, an unrecognized
    /// extension, or invalid values.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            Some("ron") => {
                ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML or RON file, chosen by extension
    ///
    /// # Errors
    /// [`ConfigError`] on serialization or IO failure, or an unrecognized
    /// extension.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialize(String),

    /// The file extension names no supported format
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Values the surface cannot be opened with
    #[error("invalid config: {0}")]
    Invalid(String),
}
