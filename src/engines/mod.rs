//! Text recognition engine implementations
//!
//! This module contains implementations of the TextRecognizer trait for
//! different OCR backends. Engines are conditionally compiled based on
//! feature flags.

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
mod download;

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::Config;
use crate::engine::TextRecognizer;
use crate::error::ScanError;
use std::sync::Arc;

/// Names of the engines compiled into this build
pub fn available() -> Vec<&'static str> {
    let mut names = Vec::new();

    #[cfg(feature = "engine-ocrs")]
    names.push("ocrs");

    #[cfg(feature = "engine-leptess")]
    names.push("leptess");

    names
}

/// Construct the configured engine.
///
/// Called once at process start; the returned handle is shared read-only by
/// every scan.
pub fn create(config: &Config) -> Result<Arc<dyn TextRecognizer>, ScanError> {
    match config.engine.as_str() {
        #[cfg(feature = "engine-ocrs")]
        "ocrs" => Ok(Arc::new(ocrs::OcrsEngine::new()?)),
        #[cfg(feature = "engine-leptess")]
        "leptess" => Ok(Arc::new(leptess::LeptessEngine::new(config)?)),
        other => Err(ScanError::InitializationError(format!(
            "Engine '{}' is not available in this build (available: {})",
            other,
            available().join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_unknown_engine_is_rejected() {
        let args = crate::config::Args::parse_from([
            "receipt-scan-server",
            "--engine",
            "does-not-exist",
        ]);
        let err = create(&Config::from(args)).err().expect("engine should be rejected");
        assert!(matches!(err, ScanError::InitializationError(_)));
    }
}
