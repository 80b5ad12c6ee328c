//! Receipt scanning pipeline
//!
//! Turns a photographed paper receipt into the ordered list of lines that
//! likely name purchased items: the photo is conditioned for recognition,
//! handed to a [`TextRecognizer`], and the recognized lines are filtered by
//! a rule-based junk-line classifier.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod preprocessing;
pub mod scanner;
pub mod server;

pub use classifier::{LineClassifier, Locale, Verdict};
pub use engine::TextRecognizer;
pub use error::ScanError;
pub use preprocessing::{Pipeline, PreprocessingResult};
pub use scanner::{ReceiptScanner, ScanOutcome};
