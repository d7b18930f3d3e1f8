use super::{CommandError, ConfigCommand};
use crate::models::config::AppConfig;
use crate::services::config::ConfigManager;

/// Run a `config` subcommand against the settings file
pub fn run(manager: &ConfigManager, command: &ConfigCommand) -> Result<(), CommandError> {
    match command {
        ConfigCommand::Show => {
            let config = manager.load()?;
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            println!("{}", json);
        }
        ConfigCommand::Path => {
            println!("{}", manager.config_file_path().display());
        }
        ConfigCommand::Reset => {
            manager.save(&AppConfig::default())?;
        }
        other => {
            let config = manager.update(|config| apply(config, other))?;
            tracing::debug!(?config, "updated settings");
        }
    }

    Ok(())
}

/// Apply a mutating subcommand to `config`
fn apply(config: &mut AppConfig, command: &ConfigCommand) {
    match command {
        ConfigCommand::SetEngine { path } => config.engine.tesseract_path = Some(path.clone()),
        ConfigCommand::ClearEngine => config.engine.tesseract_path = None,
        ConfigCommand::SetLanguage { language } => config.engine.language = language.clone(),
        ConfigCommand::SetPreprocess { enabled } => config.preprocessing.enabled = *enabled,
        ConfigCommand::Reset => *config = AppConfig::default(),
        ConfigCommand::Show | ConfigCommand::Path => {}
    }
}
