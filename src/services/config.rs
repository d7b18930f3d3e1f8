use crate::models::config::AppConfig;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "text-extractor";
const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ConfigError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Settings persisted as pretty JSON under the platform config directory
pub struct ConfigManager {
    dir: PathBuf,
    file: PathBuf,
}

impl ConfigManager {
    /// `<config dir>/text-extractor/config.json`; nothing is created until the first write
    pub fn new() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::in_dir(base.join(APP_DIR)))
    }

    pub fn in_dir(dir: PathBuf) -> Self {
        let file = dir.join(CONFIG_FILE);
        Self { dir, file }
    }

    pub fn config_file_path(&self) -> &Path {
        &self.file
    }

    pub fn config_exists(&self) -> bool {
        self.file.is_file()
    }

    /// Stored settings, or defaults if the file has never been written.
    ///
    /// A file that exists but does not parse is an error, not a silent reset.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let content = match fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
            Err(e) => return Err(ConfigError::io(&self.file)(e)),
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.file.clone(),
            source,
        })
    }

    /// Replace the stored settings.
    ///
    /// Written to a sibling temp file and renamed over `config.json`, so readers
    /// see either the old or the new settings.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir).map_err(ConfigError::io(&self.dir))?;

        let json = serde_json::to_vec_pretty(config).map_err(ConfigError::Serialize)?;

        let mut staged =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(ConfigError::io(&self.dir))?;
        staged.write_all(&json).map_err(ConfigError::io(&self.dir))?;
        staged
            .persist(&self.file)
            .map_err(|e| ConfigError::io(&self.file)(e.error))?;

        tracing::debug!(path = %self.file.display(), "saved config");
        Ok(())
    }

    /// Load, let `change` edit the settings, and save the result
    pub fn update<F>(&self, change: F) -> Result<AppConfig, ConfigError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)?;
        Ok(config)
    }
}
