use crate::error::Result;
use image::DynamicImage;

/// Language used when the caller does not pick one
pub const DEFAULT_LANGUAGE: &str = "eng";

/// OCR Engine trait - abstraction over the text recognizer
pub trait OcrEngine: Send + Sync {
    /// Recognize text from image with default language (English)
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        self.recognize_with_lang(image, DEFAULT_LANGUAGE)
    }

    /// Recognize text with specific language
    fn recognize_with_lang(&self, image: &DynamicImage, lang: &str) -> Result<String>;

    /// Check that the engine is still runnable right before it is used
    fn validate(&self) -> Result<()>;
}
