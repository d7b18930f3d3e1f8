use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Explicit tesseract location, probed before the well-known install paths
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "eng".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            language: default_language(),
        }
    }
}

/// Image preprocessing configuration
///
/// Only the on/off switch is configurable; the filter constants are fixed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreprocessingConfig {
    pub enabled: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
}
