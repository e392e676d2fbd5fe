use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{AppendSettings, FontSpec, MAX_IMAGE_WIDTH_INCHES};

/// Configuration for docappend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web form server
    pub server: ServerConfig,
    /// Formatting of appended content
    pub append: AppendConfig,
    /// PDF renderer
    pub pdfium: PdfiumConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Largest accepted request body, in megabytes
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "127.0.0.1:8501".to_string(),
            max_upload_mb: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendConfig {
    pub font_family: String,
    pub font_size_pt: f32,
    pub image_width_inches: f32,
}

impl Default for AppendConfig {
    fn default() -> Self {
        AppendConfig {
            font_family: "Times New Roman".to_string(),
            font_size_pt: 12.0,
            image_width_inches: 6.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfiumConfig {
    /// Directory searched for libpdfium before `./` and the system paths
    pub library_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from the config directory, or defaults if there is none
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject values that cannot produce a valid document
    pub fn validate(&self) -> Result<()> {
        let width = self.append.image_width_inches;
        if !(width > 0.0 && width <= MAX_IMAGE_WIDTH_INCHES) {
            bail!(
                "append.image_width_inches must be greater than 0 and at most {MAX_IMAGE_WIDTH_INCHES}, got {width}"
            );
        }

        let size = self.append.font_size_pt;
        if !(size > 0.0 && size <= 1638.0) {
            bail!("append.font_size_pt must be greater than 0 and at most 1638, got {size}");
        }

        Ok(())
    }

    /// Save config to the config directory
    pub fn save(&self) -> Result<Option<PathBuf>> {
        let Some(config_path) = Self::get_config_path() else {
            return Ok(None);
        };

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(Some(config_path))
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docappend").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<Option<PathBuf>> {
        Config::default().save()
    }

    pub fn append_settings(&self) -> AppendSettings {
        AppendSettings {
            font: FontSpec::new(self.append.font_family.clone(), self.append.font_size_pt),
            image_width_inches: self.append.image_width_inches,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
