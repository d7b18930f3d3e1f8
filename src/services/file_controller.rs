use crate::services::ocr::OcrProcessor;
use std::fs;
use std::path::Path;

/// Image extensions accepted by the format gate (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Entry point for the front end: validates paths and reports plain messages
pub struct FileController {
    ocr: OcrProcessor,
    preprocess: bool,
}

impl FileController {
    pub fn new(ocr: OcrProcessor) -> Self {
        Self {
            ocr,
            preprocess: true,
        }
    }

    /// Toggle the grayscale/contrast/sharpen pass (on by default)
    pub fn with_preprocessing(mut self, enabled: bool) -> Self {
        self.preprocess = enabled;
        self
    }

    /// Handles complete image-to-text processing
    pub fn process_image(&self, image_path: &Path) -> Result<String, String> {
        if image_path.as_os_str().is_empty() {
            return Err("No image path provided".to_string());
        }

        if !image_path.exists() {
            return Err("File not found".to_string());
        }

        if !is_supported_format(image_path) {
            return Err("Unsupported file format".to_string());
        }

        self.ocr
            .extract_text(image_path, self.preprocess)
            .map_err(|e| e.to_string())
    }

    /// Saves text to file as UTF-8
    pub fn save_text(text: &str, output_path: &Path) -> Result<String, String> {
        if text.is_empty() {
            return Err("No text to save".to_string());
        }
        if output_path.as_os_str().is_empty() {
            return Err("No output path provided".to_string());
        }

        fs::write(output_path, text.as_bytes())
            .map_err(|e| format!("Error saving file: {}", e))?;

        tracing::info!(path = %output_path.display(), bytes = text.len(), "saved text");
        Ok("Text saved successfully".to_string())
    }
}

/// Extension-only gate; file contents are not sniffed
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}
