//! Image preprocessing for receipt recognition
//!
//! Conditions a noisy, skewed, unevenly lit receipt photo into a clean
//! binary image before it is handed to a recognition engine.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PreprocessingResult, StepTiming};
