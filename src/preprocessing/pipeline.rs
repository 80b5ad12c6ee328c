use crate::error::ScanError;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Binarized single-channel image (not serialized)
    #[serde(skip)]
    pub image: GrayImage,
    pub width: u32,
    pub height: u32,
    /// Skew detected before binarization, in degrees
    pub skew_degrees: f32,
    /// Whether the deskew step rotated the image
    pub rotated: bool,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Fixed receipt preprocessing pipeline
///
/// grayscale -> denoise -> deskew -> adaptive threshold -> morphology -> upscale.
/// Deterministic; any failing step aborts the whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline;

impl Pipeline {
    pub fn new() -> Self {
        Self
    }

    /// Decode encoded image bytes and preprocess them
    pub fn process_bytes(&self, data: &[u8]) -> Result<PreprocessingResult, ScanError> {
        let image = image::load_from_memory(data)
            .map_err(|e| ScanError::InvalidImage(format!("Failed to decode image: {}", e)))?;
        self.process(image)
    }

    /// Run every step in order on a decoded image
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, ScanError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanError::InvalidImage(format!(
                "Image has zero area ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let start = Instant::now();
        let mut steps_timing = Vec::new();
        let mut skew_degrees = 0.0;
        let mut rotated = false;

        tracing::debug!(
            "Preprocessing {}x{} image ({:?})",
            image.width(),
            image.height(),
            image.color()
        );

        let mut img = image;
        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply)?;
        img = self.run_step("denoise", img, &mut steps_timing, steps::denoise::apply)?;
        img = self.run_step("deskew", img, &mut steps_timing, |img| {
            let deskewed = steps::deskew::correct(img.into_luma8());
            skew_degrees = deskewed.angle;
            rotated = deskewed.rotated;
            Ok(DynamicImage::ImageLuma8(deskewed.image))
        })?;
        img = self.run_step("threshold", img, &mut steps_timing, steps::threshold::apply)?;
        img = self.run_step("morphology", img, &mut steps_timing, steps::morphology::apply)?;
        img = self.run_step("upscale", img, &mut steps_timing, steps::upscale::apply)?;

        let image = img.into_luma8();
        let total_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Preprocessed to {}x{} in {}ms (skew {:.2} degrees, rotated: {})",
            image.width(),
            image.height(),
            total_time_ms,
            skew_degrees,
            rotated
        );

        Ok(PreprocessingResult {
            width: image.width(),
            height: image.height(),
            image,
            skew_degrees,
            rotated,
            total_time_ms,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, ScanError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, ScanError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img).map_err(|e| {
            tracing::error!("Preprocessing step '{}' failed: {}", name, e);
            e
        })?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!("Step '{}' took {}ms", name, time_ms);
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms,
        });
        Ok(result)
    }
}
