use crate::error::ScanError;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

/// Side of the square neighbourhood each pixel is compared against
const BLOCK_SIZE: usize = 11;
/// Constant subtracted from the local weighted mean
const OFFSET: f32 = 2.0;

/// Apply Gaussian-weighted adaptive thresholding
/// Each pixel is compared with its own neighbourhood, so uneven lighting
/// across a receipt photo does not blow out one side
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ScanError> {
    let gray = image.to_luma8();
    Ok(DynamicImage::ImageLuma8(adaptive_threshold(&gray)))
}

/// Binarize against the rounded weighted mean minus `OFFSET`, floored at zero.
///
/// The floor keeps the interior of an all-black region black, so the
/// operation is idempotent on images that only contain 0 and 255.
///
/// The mean is computed in `f32`; filtering the `u8` image directly would
/// truncate after each pass and bias the threshold low.
fn adaptive_threshold(img: &GrayImage) -> GrayImage {
    let kernel = gaussian_kernel(BLOCK_SIZE);
    let levels: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
            Luma([img.get_pixel(x, y).0[0] as f32])
        });
    let local_mean = separable_filter_equal(&levels, kernel.as_slice());

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let threshold = (local_mean.get_pixel(x, y).0[0].round() - OFFSET).max(0.0);
        let pixel = img.get_pixel(x, y).0[0] as f32;
        if pixel > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Normalized 1-D Gaussian of `size` taps, with the sigma OpenCV derives
/// for that aperture
fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
