use crate::error::{AnalyzeError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chart: ChartSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSection {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSection {
    fn default() -> Self {
        Self { width: 960, height: 600 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 7860 }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory. A missing file is not
    /// an error; every section has defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            AnalyzeError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            AnalyzeError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })
    }
}
