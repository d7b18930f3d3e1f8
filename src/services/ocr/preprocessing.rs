use crate::error::{OcrError, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::path::Path;

/// Contrast multiplier applied around the image's mean gray level
const CONTRAST_FACTOR: f32 = 2.0;

/// 3x3 sharpen kernel, row-major, normalised by `SHARPEN_SCALE`
const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];
const SHARPEN_SCALE: f32 = 16.0;

/// Image preprocessing service for OCR optimization
///
/// The pipeline is fixed: grayscale, contrast boost, sharpen.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreprocessingService;

impl PreprocessingService {
    pub fn new() -> Self {
        Self
    }

    /// Open `path` and run the full pipeline on it
    pub fn preprocess_file(&self, path: &Path) -> Result<DynamicImage> {
        if path.as_os_str().is_empty() {
            return Err(OcrError::InvalidInput("Image path is empty".to_string()));
        }
        if !path.exists() {
            return Err(OcrError::InvalidInput(format!(
                "Image file does not exist: {}",
                path.display()
            )));
        }

        tracing::debug!(path = %path.display(), "opening image");
        let image = image::open(path)?;

        Ok(self.preprocess(&image))
    }

    /// Full preprocessing pipeline: grayscale → contrast → sharpen
    pub fn preprocess(&self, image: &DynamicImage) -> DynamicImage {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "preprocessing image"
        );

        let gray = self.to_grayscale(image);
        let contrasted = self.enhance_contrast(&gray, CONTRAST_FACTOR);
        let sharpened = self.sharpen(&contrasted);

        DynamicImage::ImageLuma8(sharpened)
    }

    /// Convert image to single-channel grayscale with ITU-R 601-2 luma weights
    ///
    /// Fixed point: `(r*19595 + g*38470 + b*7471 + 0x8000) >> 16`. Alpha is ignored.
    pub fn to_grayscale(&self, image: &DynamicImage) -> GrayImage {
        let rgb = image.to_rgb8();

        ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            let luma = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
            Luma([luma as u8])
        })
    }

    /// Push every pixel away from the mean gray level by `factor`
    pub fn enhance_contrast(&self, image: &GrayImage, factor: f32) -> GrayImage {
        let mean = Self::mean_level(image);

        ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            let value = image.get_pixel(x, y)[0] as f32;
            let blended = mean + factor * (value - mean);
            Luma([Self::clamp_u8(blended)])
        })
    }

    /// Apply the 3x3 sharpen kernel. Border pixels are copied unchanged.
    pub fn sharpen(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();

        ImageBuffer::from_fn(width, height, |x, y| {
            if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
                return *image.get_pixel(x, y);
            }

            let mut acc = 0.0f32;
            for (i, weight) in SHARPEN_KERNEL.iter().enumerate() {
                let sx = x + (i as u32 % 3) - 1;
                let sy = y + (i as u32 / 3) - 1;
                acc += weight * image.get_pixel(sx, sy)[0] as f32;
            }

            Luma([Self::clamp_u8((acc / SHARPEN_SCALE).round())])
        })
    }

    /// Mean gray level rounded to the nearest integer
    fn mean_level(image: &GrayImage) -> f32 {
        let count = image.width() as u64 * image.height() as u64;
        if count == 0 {
            return 0.0;
        }

        let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
        (sum as f64 / count as f64).round() as f32
    }

    fn clamp_u8(value: f32) -> u8 {
        value.clamp(0.0, 255.0) as u8
    }
}
