use crate::error::ScanError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

/// Morphological cleanup of a binarized receipt (ink is 0, paper is 255)
/// Closing first reconnects broken strokes, then opening drops speckle;
/// the other order would delete thin stroke fragments before they rejoin
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ScanError> {
    let gray = image.to_luma8();
    let closed = close_ink(&gray);
    Ok(DynamicImage::ImageLuma8(open_ink(&closed)))
}

/// 2x2 square element, anchored on its bottom-right or top-left cell
///
/// Ink is dark, so growing ink is a grayscale erosion and shrinking it a
/// grayscale dilation. Pairing the two anchors keeps close and open from
/// shifting the image by a pixel.
fn element(anchor: u8) -> Mask {
    Mask::from_image(&GrayImage::from_pixel(2, 2, Luma([255])), anchor, anchor)
}

/// Grow then shrink the ink: fills paper gaps smaller than the element
fn close_ink(img: &GrayImage) -> GrayImage {
    grayscale_dilate(&grayscale_erode(img, &element(1)), &element(0))
}

/// Shrink then grow the ink: removes ink blobs smaller than the element
fn open_ink(img: &GrayImage) -> GrayImage {
    grayscale_erode(&grayscale_dilate(img, &element(0)), &element(1))
}
