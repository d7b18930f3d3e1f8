pub mod commands;
pub mod error;
pub mod models;
pub mod services;

use clap::Parser;
use commands::{Cli, CommandError, Commands, EngineSettings, LogFormat};
use models::config::AppConfig;
use services::config::ConfigManager;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub use error::OcrError;
pub use services::file_controller::FileController;
pub use services::ocr::OcrProcessor;

/// Parse the command line, run the requested command and map the outcome to an exit code
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn dispatch(cli: &Cli) -> Result<(), CommandError> {
    match &cli.command {
        Commands::Extract(args) => {
            let config = load_config();
            let settings = EngineSettings::resolve(cli.tesseract.as_ref(), Some(args), &config);
            commands::ocr::extract(&settings, args)
        }
        Commands::Engine => {
            let config = load_config();
            let settings = EngineSettings::resolve(cli.tesseract.as_ref(), None, &config);
            commands::ocr::engine_info(&settings)
        }
        Commands::Config(command) => {
            let manager = ConfigManager::new()?;
            commands::config::run(&manager, command)
        }
    }
}

/// Saved settings, or defaults when they cannot be read
fn load_config() -> AppConfig {
    match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config, using defaults");
            AppConfig::default()
        }
    }
}

/// Logs go to stderr so stdout carries only the extracted text
fn init_tracing(verbose: bool, format: LogFormat) {
    let default_filter = if verbose {
        "text_extractor_lib=debug"
    } else {
        "text_extractor_lib=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
