use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error(
        "Tesseract not found! Please install Tesseract-OCR \
         (https://github.com/tesseract-ocr/tesseract). Tried paths: {}",
        .tried.join(", ")
    )]
    EngineNotFound { tried: Vec<String> },

    #[error("Tesseract validation failed: {0}")]
    EngineValidation(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Image processing failed: {0}")]
    Image(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text extraction failed: {source}")]
    Extraction {
        #[source]
        source: Box<OcrError>,
    },
}

impl OcrError {
    /// Wrap an error into the uniform extraction failure. Already wrapped errors are left alone.
    pub fn extraction(err: OcrError) -> Self {
        match err {
            wrapped @ OcrError::Extraction { .. } => wrapped,
            other => OcrError::Extraction {
                source: Box::new(other),
            },
        }
    }

    /// The innermost error behind any extraction wrapper
    pub fn cause(&self) -> &OcrError {
        match self {
            OcrError::Extraction { source } => source.cause(),
            other => other,
        }
    }
}

impl From<image::ImageError> for OcrError {
    fn from(err: image::ImageError) -> Self {
        OcrError::Image(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
