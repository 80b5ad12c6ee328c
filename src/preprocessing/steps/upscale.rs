use crate::error::ScanError;
use image::{imageops::FilterType, DynamicImage, GrayImage};

/// Recognition accuracy drops sharply below these dimensions
pub const MIN_WIDTH: u32 = 400;
pub const MIN_HEIGHT: u32 = 100;
/// Largest image the upscaler will allocate
const MAX_UPSCALED_PIXELS: u64 = 100_000_000;

/// Upscale small images to the minimum recognizable size
/// Uses the smallest uniform factor that satisfies both minimums; never shrinks
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ScanError> {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();

    let Some((new_width, new_height)) = target_size(width, height) else {
        return Ok(DynamicImage::ImageLuma8(gray));
    };

    if new_width as u64 * new_height as u64 > MAX_UPSCALED_PIXELS {
        return Err(ScanError::PreprocessingError(format!(
            "Upscaling {}x{} to {}x{} exceeds {} pixels",
            width, height, new_width, new_height, MAX_UPSCALED_PIXELS
        )));
    }

    tracing::debug!(
        "Upscaling {}x{} to {}x{}",
        width,
        height,
        new_width,
        new_height
    );

    let resized: GrayImage =
        image::imageops::resize(&gray, new_width, new_height, FilterType::CatmullRom);
    Ok(DynamicImage::ImageLuma8(resized))
}

/// Dimensions after upscaling, or `None` if the image is already large enough
fn target_size(width: u32, height: u32) -> Option<(u32, u32)> {
    if width >= MIN_WIDTH && height >= MIN_HEIGHT {
        return None;
    }

    let scale = (MIN_WIDTH as f64 / width as f64).max(MIN_HEIGHT as f64 / height as f64);
    let new_width = ((width as f64 * scale).round() as u32).max(width);
    let new_height = ((height as f64 * scale).round() as u32).max(height);

    Some((new_width, new_height))
}
