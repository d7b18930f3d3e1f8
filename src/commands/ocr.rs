use super::{CommandError, EngineSettings, ExtractArgs};
use crate::models::ocr_result::ExtractionReport;
use crate::services::file_controller::FileController;
use crate::services::ocr::{EngineLocator, OcrProcessor, TesseractEngine};

/// Extract text from `args.image`, optionally save it, then print the outcome
pub fn extract(settings: &EngineSettings, args: &ExtractArgs) -> Result<(), CommandError> {
    let outcome = OcrProcessor::new(settings.tesseract_path.as_deref())
        .map_err(CommandError::from)
        .and_then(|processor| {
            let processor = processor.with_language(settings.language.clone());
            let controller =
                FileController::new(processor).with_preprocessing(settings.preprocess);
            run_extraction(&controller, args)
        });

    if let Some(rendered) = render_outcome(&outcome, args.json)? {
        println!("{}", rendered);
    }

    outcome.map(|_| ())
}

/// Recognize the image and write the text to `args.output` when given.
///
/// A failed save fails the whole extraction.
fn run_extraction(
    controller: &FileController,
    args: &ExtractArgs,
) -> Result<String, CommandError> {
    let text = controller.process_image(&args.image)?;

    if let Some(output) = &args.output {
        let message = FileController::save_text(&text, output)?;
        eprintln!("{}", message);
    }

    Ok(text)
}

/// What goes to stdout: a JSON report either way, or the bare text on success
fn render_outcome(
    outcome: &Result<String, CommandError>,
    json: bool,
) -> Result<Option<String>, CommandError> {
    if !json {
        return Ok(outcome.as_ref().ok().cloned());
    }

    let report = match outcome {
        Ok(text) => ExtractionReport::success(text.as_str()),
        Err(err) => ExtractionReport::failure(err.to_string()),
    };
    serde_json::to_string_pretty(&report)
        .map(Some)
        .map_err(|e| CommandError::Failed(format!("Failed to serialize report: {}", e)))
}

/// Print the engine that would be used and its version banner
pub fn engine_info(settings: &EngineSettings) -> Result<(), CommandError> {
    let engine = EngineLocator::new(settings.tesseract_path.as_deref()).locate()?;
    let tesseract = TesseractEngine::new(engine);
    let version = tesseract.version()?;

    println!("engine:  {}", tesseract.engine_ref());
    println!("version: {}", version);
    Ok(())
}
