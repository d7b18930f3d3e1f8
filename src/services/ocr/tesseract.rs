use super::engine::OcrEngine;
use super::locator::{probe_version, EngineRef};
use crate::error::{OcrError, Result};
use image::DynamicImage;
use std::io::Write;
use std::process::Command;
use std::time::Duration;

/// Engine options: LSTM engine, page treated as a single uniform block of text
pub const TESSERACT_CONFIG: &str = "--oem 3 --psm 6";

/// Bound on the runnable check performed before each recognition
pub const VALIDATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tesseract OCR engine driven through its command line interface
pub struct TesseractEngine {
    engine: EngineRef,
}

impl TesseractEngine {
    pub fn new(engine: EngineRef) -> Self {
        Self { engine }
    }

    pub fn engine_ref(&self) -> &EngineRef {
        &self.engine
    }

    /// Version banner reported by the executable
    pub fn version(&self) -> Result<String> {
        probe_version(self.engine.program(), VALIDATE_TIMEOUT)
    }

    fn config_args() -> impl Iterator<Item = &'static str> {
        TESSERACT_CONFIG.split_whitespace()
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_with_lang(&self, image: &DynamicImage, lang: &str) -> Result<String> {
        // Convert DynamicImage to bytes (PNG format for Tesseract)
        let mut img_bytes: Vec<u8> = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut img_bytes), image::ImageFormat::Png)
            .map_err(|e| OcrError::Image(format!("Failed to encode image: {}", e)))?;

        // Removed on drop, error paths included
        let mut input = tempfile::Builder::new()
            .prefix("text-extractor-")
            .suffix(".png")
            .tempfile()?;
        input.write_all(&img_bytes)?;
        input.flush()?;

        tracing::debug!(
            engine = %self.engine,
            input = %input.path().display(),
            lang,
            config = TESSERACT_CONFIG,
            "running tesseract"
        );

        let output = Command::new(self.engine.program())
            .arg(input.path())
            .arg("stdout")
            .args(["-l", lang])
            .args(Self::config_args())
            .output()
            .map_err(|e| OcrError::Recognition(format!("Failed to execute tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| OcrError::Recognition(format!("Invalid UTF-8 output: {}", e)))?;

        tracing::debug!(chars = text.chars().count(), "tesseract finished");
        Ok(text)
    }

    fn validate(&self) -> Result<()> {
        self.version().map(|banner| {
            tracing::debug!(engine = %self.engine, version = %banner, "tesseract validated");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ocr::locator::{EngineCandidate, EngineLocator};
    use image::{Luma, Rgb, RgbImage};

    fn bogus_engine() -> TesseractEngine {
        TesseractEngine::new(EngineRef::new(EngineCandidate::Command(
            "definitely-not-a-real-ocr-binary".to_string(),
        )))
    }

    fn real_engine() -> TesseractEngine {
        let engine = EngineLocator::new(None)
            .locate()
            .expect("tesseract should be installed");
        TesseractEngine::new(engine)
    }

    #[test]
    fn test_config_selects_single_block_mode() {
        let args: Vec<&str> = TesseractEngine::config_args().collect();

        assert_eq!(args, vec!["--oem", "3", "--psm", "6"]);
    }

    #[test]
    fn test_validate_fails_for_missing_binary() {
        let err = bogus_engine().validate().unwrap_err();

        assert!(matches!(err, OcrError::EngineValidation(_)), "got: {:?}", err);
    }

    #[test]
    fn test_recognize_fails_for_missing_binary() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(10, 10, Luma([255])));

        let err = bogus_engine().recognize(&image).unwrap_err();

        assert!(matches!(err, OcrError::Recognition(_)), "got: {:?}", err);
    }

    /// Shell stand-in for tesseract: answers `--version`, copies its input next to
    /// itself and echoes the argument vector with surrounding whitespace.
    #[cfg(unix)]
    fn write_fake_tesseract(dir: &std::path::Path, version_delay_secs: u32) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("tesseract");
        let body = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"--version\" ]; then\n\
             \x20 sleep {delay}\n\
             \x20 echo 'tesseract 5.3.0'\n\
             \x20 exit 0\n\
             fi\n\
             printf '%s' \"$1\" > '{dir}/input-path'\n\
             cp \"$1\" '{dir}/seen.png'\n\
             printf '  ARGS: %s  \\n' \"$*\"\n",
            delay = version_delay_secs,
            dir = dir.display()
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        // A freshly written script can briefly report ETXTBSY while other test threads fork
        for _ in 0..50 {
            match Command::new(&script).arg("--bogus").output() {
                Err(e) if e.raw_os_error() == Some(26) => {
                    std::thread::sleep(Duration::from_millis(20))
                }
                _ => break,
            }
        }
        script
    }

    #[cfg(unix)]
    fn fake_engine(script: std::path::PathBuf) -> TesseractEngine {
        TesseractEngine::new(EngineRef::new(EngineCandidate::Path(script)))
    }

    #[cfg(unix)]
    #[test]
    fn test_recognize_passes_expected_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(write_fake_tesseract(dir.path(), 0));
        let image = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(12, 7, Luma([40])));

        let text = engine.recognize_with_lang(&image, "deu").unwrap();

        let input = std::fs::read_to_string(dir.path().join("input-path")).unwrap();
        assert_eq!(text, format!("  ARGS: {} stdout -l deu --oem 3 --psm 6  \n", input));

        let input = std::path::Path::new(&input);
        let name = input.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("text-extractor-") && name.ends_with(".png"), "got: {}", name);
        assert!(!input.exists(), "temporary PNG should be removed after the call");

        let seen = image::open(dir.path().join("seen.png")).unwrap();
        assert_eq!((seen.width(), seen.height()), (12, 7));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_and_version_through_fake_binary() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(write_fake_tesseract(dir.path(), 0));

        assert!(engine.validate().is_ok());
        assert_eq!(engine.version().unwrap(), "tesseract 5.3.0");
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_gives_up_after_bound() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(write_fake_tesseract(dir.path(), 8));

        let started = std::time::Instant::now();
        let err = engine.validate().unwrap_err();

        assert!(err.to_string().contains("timed out"), "got: {}", err);
        assert!(started.elapsed() >= VALIDATE_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(8));
    }

    #[test]
    #[ignore] // Requires tesseract on the system
    fn test_validate_real_engine() {
        assert!(real_engine().validate().is_ok());
    }

    #[test]
    #[ignore] // Requires tesseract on the system
    fn test_empty_result_on_blank_image() {
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([255, 255, 255])));

        let text = real_engine()
            .recognize(&blank)
            .expect("Recognition should succeed even on blank image");

        assert!(text.trim().is_empty(), "got: {:?}", text);
    }
}
