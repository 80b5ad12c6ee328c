//! Receipt scanning orchestration
//!
//! bytes -> preprocessing -> text recognition -> line classification.
//! The recognizer is injected by the owner of the process and shared
//! read-only; nothing is retained between scans.

use crate::classifier::{DroppedLine, LineClassifier, Locale};
use crate::engine::TextRecognizer;
use crate::error::ScanError;
use crate::preprocessing::{Pipeline, PreprocessingResult};
use image::GrayImage;
use serde::Serialize;
use std::sync::Arc;

/// Everything produced by one scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Candidate item lines, in reading order
    pub candidates: Vec<String>,
    /// Raw lines as returned by the recognizer
    pub lines: Vec<String>,
    /// Lines the classifier discarded, with the reason
    pub dropped: Vec<DroppedLine>,
    pub preprocessing: PreprocessingResult,
}

pub struct ReceiptScanner {
    recognizer: Arc<dyn TextRecognizer>,
    pipeline: Pipeline,
    classifier: LineClassifier,
}

impl ReceiptScanner {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, locale: Locale) -> Self {
        Self {
            recognizer,
            pipeline: Pipeline::new(),
            classifier: LineClassifier::new(locale),
        }
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// Decode and condition an image for recognition
    pub fn preprocess(&self, data: &[u8]) -> Result<PreprocessingResult, ScanError> {
        self.pipeline.process_bytes(data)
    }

    /// Run the injected recognizer on a preprocessed image
    pub fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, ScanError> {
        self.recognizer.recognize(image).map_err(|e| match e {
            ScanError::RecognitionUnavailable(_) => e,
            other => ScanError::RecognitionUnavailable(other.to_string()),
        })
    }

    /// Keep the lines that look like purchased items
    pub fn classify(&self, lines: &[String]) -> (Vec<String>, Vec<DroppedLine>) {
        self.classifier.partition(lines)
    }

    /// Full pipeline for one receipt photo
    pub fn scan(&self, data: &[u8]) -> Result<ScanOutcome, ScanError> {
        let preprocessing = self.preprocess(data)?;
        let lines = self.recognize(&preprocessing.image)?;
        Ok(self.assemble(preprocessing, lines))
    }

    /// Classify recognized lines and package the outcome
    pub fn assemble(&self, preprocessing: PreprocessingResult, lines: Vec<String>) -> ScanOutcome {
        let (candidates, dropped) = self.classify(&lines);

        tracing::info!(
            "Scan kept {} of {} lines using {}",
            candidates.len(),
            lines.len(),
            self.recognizer.name()
        );

        ScanOutcome {
            candidates,
            lines,
            dropped,
            preprocessing,
        }
    }
}
