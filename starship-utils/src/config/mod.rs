//! Configuration file loading
//!
//! Configuration files may be TOML, JSON or YAML; the format is picked from
//! the file extension. Typed configs are expected to default every field so
//! partial files only override what they mention.

use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yml" | "yaml" => Ok(Self::Yaml),
            _ => Err(crate::UtilError::Config(format!(
                "Unsupported config format: '{extension}' ({})",
                path.display()
            ))),
        }
    }
}

/// Parse configuration text in the given format
pub fn parse_config<T>(content: &str, format: ConfigFormat) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    match format {
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| crate::UtilError::Config(format!("TOML parse error: {e}"))),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| crate::UtilError::Config(format!("JSON parse error: {e}"))),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| crate::UtilError::Config(format!("YAML parse error: {e}"))),
    }
}

/// Load a typed configuration from file
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), ?format, "loading configuration");
    parse_config(&content, format)
}
