use super::engine::{OcrEngine, DEFAULT_LANGUAGE};
use super::locator::EngineLocator;
use super::preprocessing::PreprocessingService;
use super::tesseract::TesseractEngine;
use crate::error::{OcrError, Result};
use image::DynamicImage;
use std::path::Path;

/// Handles image processing and text extraction
pub struct OcrProcessor {
    engine: Box<dyn OcrEngine>,
    preprocessor: PreprocessingService,
    language: String,
}

impl OcrProcessor {
    /// Locate tesseract (hint first) and build a processor around it.
    ///
    /// Failing to find the engine is fatal for the caller; there is no per-call retry.
    pub fn new(tesseract_path: Option<&Path>) -> Result<Self> {
        let engine = EngineLocator::new(tesseract_path).locate()?;
        Ok(Self::with_engine(Box::new(TesseractEngine::new(engine))))
    }

    pub fn with_engine(engine: Box<dyn OcrEngine>) -> Self {
        Self {
            engine,
            preprocessor: PreprocessingService::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Recognition language passed to the engine (tesseract `-l`)
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Extract trimmed text from the image at `image_path`.
    ///
    /// Every failure comes back as `OcrError::Extraction` wrapping the cause.
    pub fn extract_text(&self, image_path: &Path, preprocess: bool) -> Result<String> {
        tracing::debug!(path = %image_path.display(), preprocess, "extract_text");

        self.try_extract(image_path, preprocess).map_err(|e| {
            tracing::warn!(path = %image_path.display(), error = %e, "text extraction failed");
            OcrError::extraction(e)
        })
    }

    fn try_extract(&self, image_path: &Path, preprocess: bool) -> Result<String> {
        if image_path.as_os_str().is_empty() {
            return Err(OcrError::InvalidInput("Image path is empty".to_string()));
        }

        let image = if preprocess {
            self.preprocessor.preprocess_file(image_path)?
        } else {
            Self::open_raw(image_path)?
        };

        self.engine.validate()?;

        let text = self.engine.recognize_with_lang(&image, &self.language)?;
        tracing::debug!(chars = text.len(), "extracted text");

        Ok(text.trim().to_string())
    }

    fn open_raw(image_path: &Path) -> Result<DynamicImage> {
        if !image_path.exists() {
            return Err(OcrError::InvalidInput(format!(
                "Image file does not exist: {}",
                image_path.display()
            )));
        }

        Ok(image::open(image_path)?)
    }
}
