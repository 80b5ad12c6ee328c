//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use super::download;
use crate::engine::TextRecognizer;
use crate::error::ScanError;
use image::{DynamicImage, GrayImage};
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Recognizer wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Load the detection and recognition models, downloading them if needed
    pub fn new() -> Result<Self, ScanError> {
        tracing::info!("Initializing ocrs recognition engine...");

        let cache_dir = download::cache_dir()?;
        let detection_model_path =
            download::ensure_downloaded(DETECTION_MODEL_URL, &cache_dir, "text-detection.rten")?;
        let recognition_model_path = download::ensure_downloaded(
            RECOGNITION_MODEL_URL,
            &cache_dir,
            "text-recognition.rten",
        )?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            ScanError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            ScanError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            ScanError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, ScanError> {
        // ImageSource::from_bytes expects interleaved RGB (HWC)
        let rgb_img = DynamicImage::ImageLuma8(image.clone()).into_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            ScanError::RecognitionUnavailable(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self.engine.prepare_input(img_source).map_err(|e| {
            ScanError::RecognitionUnavailable(format!("Failed to prepare input: {}", e))
        })?;

        let word_rects = self.engine.detect_words(&ocr_input).map_err(|e| {
            ScanError::RecognitionUnavailable(format!("Failed to detect words: {}", e))
        })?;

        // find_text_lines returns lines in reading order
        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| {
                ScanError::RecognitionUnavailable(format!("Failed to recognize text: {}", e))
            })?;

        let lines: Vec<String> = line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        tracing::debug!("ocrs recognized {} lines", lines.len());

        Ok(lines)
    }

    fn supported_languages(&self) -> Vec<String> {
        // ocrs currently only supports English/Latin alphabet
        vec!["eng".to_string()]
    }
}
