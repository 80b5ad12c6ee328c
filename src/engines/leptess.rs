//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine. Better for noisy phone photos and the only
//! engine here with Spanish language data.
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) automatically on first use.

use super::download;
use crate::classifier::split_lines;
use crate::config::Config;
use crate::engine::TextRecognizer;
use crate::error::ScanError;
use image::GrayImage;
use tesseract_static::tesseract::Tesseract;

/// Tesseract recognition engine
pub struct LeptessEngine {
    /// Path to tessdata directory
    tessdata_path: String,
    /// Recognition language (e.g., "spa")
    language: String,
}

impl LeptessEngine {
    /// Create a new Tesseract-based recognizer
    pub fn new(config: &Config) -> Result<Self, ScanError> {
        let language = config.language.clone();

        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&language)?,
        };

        // Fail at startup rather than on the first receipt
        let check = Tesseract::new(Some(&tessdata_path), Some(&language)).map_err(|e| {
            ScanError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;
        drop(check);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, language: {})",
            tessdata_path,
            language
        );

        Ok(Self {
            tessdata_path,
            language,
        })
    }
}

impl TextRecognizer for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - better for noisy/messy images like phone photos"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, ScanError> {
        let (width, height) = image.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| ScanError::Internal(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Recognizing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        // Tesseract handles are not Sync, so each call gets its own
        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(&self.language))
            .map_err(|e| {
                ScanError::RecognitionUnavailable(format!("Failed to create Tesseract: {}", e))
            })?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            ScanError::RecognitionUnavailable(format!(
                "Failed to set image ({}x{}): {}",
                width, height, e
            ))
        })?;

        tess = tess.recognize().map_err(|e| {
            ScanError::RecognitionUnavailable(format!("Failed to recognize text: {}", e))
        })?;

        let text = tess.get_text().map_err(|e| {
            ScanError::RecognitionUnavailable(format!("Failed to get text: {}", e))
        })?;

        let lines = split_lines(&text);

        tracing::debug!(
            "Tesseract recognized {} lines (mean confidence {})",
            lines.len(),
            tess.mean_text_conf()
        );

        Ok(lines)
    }

    fn supported_languages(&self) -> Vec<String> {
        vec![self.language.clone()]
    }
}

/// Ensure tessdata for `language` is cached, returning the directory
fn ensure_tessdata_available(language: &str) -> Result<String, ScanError> {
    let dir = download::cache_dir()?.join("tessdata");
    std::fs::create_dir_all(&dir).map_err(|e| {
        ScanError::InitializationError(format!("Failed to create tessdata directory: {}", e))
    })?;

    download::ensure_downloaded(
        &tessdata_url(language),
        &dir,
        &format!("{}.traineddata", language),
    )?;

    // Tesseract expects the directory, not the file
    dir.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ScanError::InitializationError("Invalid tessdata path".to_string()))
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // tessdata_fast keeps downloads small
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
