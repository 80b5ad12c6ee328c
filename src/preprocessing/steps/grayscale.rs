use crate::error::ScanError;
use image::DynamicImage;

/// Convert image to a single luminance channel
/// 8-bit grayscale input passes through untouched
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ScanError> {
    match image {
        DynamicImage::ImageLuma8(gray) => Ok(DynamicImage::ImageLuma8(gray)),
        other => Ok(DynamicImage::ImageLuma8(other.to_luma8())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_grayscale_weights_channels() {
        let mut img = RgbImage::new(10, 10);
        img.put_pixel(0, 0, Rgb([255, 0, 0])); // Red
        img.put_pixel(1, 0, Rgb([0, 255, 0])); // Green
        img.put_pixel(2, 0, Rgb([0, 0, 255])); // Blue

        let result = apply(DynamicImage::ImageRgb8(img)).unwrap();
        let gray = result.as_luma8().expect("single channel output");

        // Green carries the most luminance, blue the least
        let (r, g, b) = (
            gray.get_pixel(0, 0).0[0],
            gray.get_pixel(1, 0).0[0],
            gray.get_pixel(2, 0).0[0],
        );
        assert!(g > r && r > b, "unexpected weights: r={} g={} b={}", r, g, b);
    }

    #[test]
    fn test_grayscale_passes_single_channel_through() {
        let img = GrayImage::from_fn(12, 7, |x, y| Luma([(x * 20 + y) as u8]));
        let result = apply(DynamicImage::ImageLuma8(img.clone())).unwrap();
        assert_eq!(result.as_luma8(), Some(&img));
    }

    #[test]
    fn test_grayscale_preserves_dimensions() {
        let img = RgbImage::new(100, 50);
        let result = apply(DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(result.width(), 100);
        assert_eq!(result.height(), 50);
    }
}
