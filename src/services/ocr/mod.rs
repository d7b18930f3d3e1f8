pub mod engine;
pub mod locator;
pub mod preprocessing;
pub mod processor;
pub mod tesseract;

// Re-export main types
pub use engine::{OcrEngine, DEFAULT_LANGUAGE};
pub use locator::{CandidateProbe, EngineCandidate, EngineLocator, EngineRef, SystemProbe};
pub use preprocessing::PreprocessingService;
pub use processor::OcrProcessor;
pub use tesseract::TesseractEngine;
