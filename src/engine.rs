use crate::error::ScanError;
use image::GrayImage;

/// Trait that all text recognition engines must implement
///
/// Engines are constructed once at startup and shared read-only, so
/// `recognize` takes `&self` and must be safe to call from several threads.
pub trait TextRecognizer: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text in a preprocessed image.
    ///
    /// Lines come back in top-to-bottom reading order. Failures are reported
    /// as [`ScanError::RecognitionUnavailable`].
    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, ScanError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}
