pub mod config;
pub mod ocr;

use crate::error::OcrError;
use crate::models::config::AppConfig;
use crate::services::config::ConfigError;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "text-extractor", version)]
#[command(about = "Convert images of printed or handwritten text into plain text using Tesseract")]
pub struct Cli {
    /// Tesseract executable to try before the standard install locations
    #[arg(long, global = true, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract text from an image (png, jpg, jpeg, bmp)
    Extract(ExtractArgs),
    /// Locate tesseract and print its version
    Engine,
    /// Inspect or change saved settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Image to read
    pub image: PathBuf,

    /// Hand the image to tesseract as-is
    #[arg(long, conflicts_with = "preprocess")]
    pub no_preprocess: bool,

    /// Run grayscale/contrast/sharpen even if the saved settings turn it off
    #[arg(long)]
    pub preprocess: bool,

    /// Tesseract language code, e.g. eng or deu+eng
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Also write the text to this file (UTF-8)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print a JSON report instead of the bare text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,
    /// Print the settings file location
    Path,
    /// Remember an explicit tesseract location
    SetEngine { path: PathBuf },
    /// Forget the remembered tesseract location
    ClearEngine,
    /// Set the default recognition language
    SetLanguage { language: String },
    /// Turn preprocessing on or off by default
    SetPreprocess {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Restore default settings
    Reset,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    EngineNotFound(String),

    #[error("{0}")]
    Failed(String),
}

impl CommandError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::EngineNotFound(_) => 2,
            CommandError::Failed(_) => 1,
        }
    }
}

impl From<OcrError> for CommandError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::EngineNotFound { .. } => CommandError::EngineNotFound(err.to_string()),
            other => CommandError::Failed(other.to_string()),
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Failed(err.to_string())
    }
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        CommandError::Failed(message)
    }
}

/// Engine settings after merging command line flags over the saved config
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub tesseract_path: Option<PathBuf>,
    pub language: String,
    pub preprocess: bool,
}

impl EngineSettings {
    pub fn resolve(
        cli_tesseract: Option<&PathBuf>,
        args: Option<&ExtractArgs>,
        config: &AppConfig,
    ) -> Self {
        let tesseract_path = cli_tesseract
            .cloned()
            .or_else(|| config.engine.tesseract_path.clone());

        let language = args
            .and_then(|a| a.lang.clone())
            .unwrap_or_else(|| config.engine.language.clone());

        let preprocess = match args {
            Some(a) if a.preprocess => true,
            Some(a) if a.no_preprocess => false,
            _ => config.preprocessing.enabled,
        };

        Self {
            tesseract_path,
            language,
            preprocess,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn extract_args(argv: &[&str]) -> ExtractArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Extract(args) => args,
            other => panic!("Expected extract, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract_with_global_flags() {
        let cli = Cli::try_parse_from([
            "text-extractor",
            "extract",
            "scan.png",
            "--tesseract",
            "/opt/tess/tesseract",
            "-o",
            "out.txt",
            "--no-preprocess",
        ])
        .unwrap();

        assert_eq!(cli.tesseract, Some(PathBuf::from("/opt/tess/tesseract")));
        assert_eq!(cli.log_format, LogFormat::Text);
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.image, PathBuf::from("scan.png"));
                assert_eq!(args.output, Some(PathBuf::from("out.txt")));
                assert!(args.no_preprocess);
                assert!(!args.json);
            }
            other => panic!("Expected extract, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_set_preprocess() {
        let cli = Cli::try_parse_from(["text-extractor", "config", "set-preprocess", "false"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::SetPreprocess { enabled: false })
        ));
    }

    #[test]
    fn test_settings_prefer_cli_over_config() {
        let mut config = AppConfig::default();
        config.engine.tesseract_path = Some(PathBuf::from("/from/config"));
        config.engine.language = "fra".to_string();
        let args = extract_args(&["text-extractor", "extract", "a.png", "--lang", "deu"]);
        let cli_path = PathBuf::from("/from/cli");

        let settings = EngineSettings::resolve(Some(&cli_path), Some(&args), &config);

        assert_eq!(settings.tesseract_path, Some(cli_path));
        assert_eq!(settings.language, "deu");
        assert!(settings.preprocess);
    }

    #[test]
    fn test_settings_fall_back_to_config() {
        let mut config = AppConfig::default();
        config.engine.tesseract_path = Some(PathBuf::from("/from/config"));
        config.preprocessing.enabled = false;
        let args = extract_args(&["text-extractor", "extract", "a.png"]);

        let settings = EngineSettings::resolve(None, Some(&args), &config);

        assert_eq!(settings.tesseract_path, Some(PathBuf::from("/from/config")));
        assert_eq!(settings.language, "eng");
        assert!(!settings.preprocess);
    }

    #[test]
    fn test_preprocess_flag_overrides_disabled_config() {
        let mut config = AppConfig::default();
        config.preprocessing.enabled = false;
        let args = extract_args(&["text-extractor", "extract", "a.png", "--preprocess"]);

        let settings = EngineSettings::resolve(None, Some(&args), &config);

        assert!(settings.preprocess);
    }

    #[test]
    fn test_preprocess_flags_conflict() {
        let result = Cli::try_parse_from([
            "text-extractor",
            "extract",
            "a.png",
            "--preprocess",
            "--no-preprocess",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_engine_not_found_exit_code() {
        let err: CommandError = OcrError::EngineNotFound { tried: vec![] }.into();
        assert_eq!(err.exit_code(), 2);

        let err: CommandError = OcrError::InvalidInput("bad".to_string()).into();
        assert_eq!(err.exit_code(), 1);
    }
}
