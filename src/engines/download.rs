//! Model and language-data downloads shared by the engine adapters

use crate::error::ScanError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cache directory for downloaded engine assets
pub fn cache_dir() -> Result<PathBuf, ScanError> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("receipt-scan");

    std::fs::create_dir_all(&dir).map_err(|e| {
        ScanError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    Ok(dir)
}

/// Return `dir/filename`, downloading it from `url` first if it is missing
pub fn ensure_downloaded(url: &str, dir: &Path, filename: &str) -> Result<PathBuf, ScanError> {
    let path = dir.join(filename);

    if path.exists() {
        tracing::info!("Using cached {} from {:?}", filename, path);
        return Ok(path);
    }

    tracing::info!("Downloading {} (this may take a moment)...", filename);
    download_file(url, &path)?;
    tracing::info!("Downloaded {} to {:?}", filename, path);

    Ok(path)
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), ScanError> {
    let response = ureq::get(url).call().map_err(|e| {
        ScanError::InitializationError(format!("Failed to download {}: {}", url, e))
    })?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        ScanError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    // A truncated download must never look cached
    let partial = path.with_extension("partial");
    let mut file = File::create(&partial).map_err(|e| {
        ScanError::InitializationError(format!("Failed to create {:?}: {}", partial, e))
    })?;
    file.write_all(&buffer).map_err(|e| {
        ScanError::InitializationError(format!("Failed to write {:?}: {}", partial, e))
    })?;
    std::fs::rename(&partial, path).map_err(|e| {
        ScanError::InitializationError(format!("Failed to move {:?} into place: {}", partial, e))
    })?;

    Ok(())
}
