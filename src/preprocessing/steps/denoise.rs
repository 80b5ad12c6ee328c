use crate::error::ScanError;
use image::{DynamicImage, GrayImage, Luma};

/// Filter strength: larger values smooth more aggressively
const STRENGTH: f32 = 10.0;
/// Radius of the patches compared against each other (3x3)
const PATCH_RADIUS: i32 = 1;
/// Radius of the window searched for similar patches (7x7)
const SEARCH_RADIUS: i32 = 3;

/// Apply non-local means denoising
/// Averages pixels whose surrounding patches look alike, so flat paper
/// texture is smoothed while stroke edges (dissimilar patches) survive
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ScanError> {
    let gray = image.to_luma8();
    Ok(DynamicImage::ImageLuma8(non_local_means(&gray)))
}

fn non_local_means(img: &GrayImage) -> GrayImage {
    let padded = Padded::new(img, PATCH_RADIUS + SEARCH_RADIUS);
    let patch_area = ((2 * PATCH_RADIUS + 1) * (2 * PATCH_RADIUS + 1)) as f32;
    let h2 = STRENGTH * STRENGTH;

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let (x, y) = (x as i32, y as i32);
        let mut weight_sum = 0.0f32;
        let mut value_sum = 0.0f32;

        for sy in -SEARCH_RADIUS..=SEARCH_RADIUS {
            for sx in -SEARCH_RADIUS..=SEARCH_RADIUS {
                let distance = padded.patch_distance(x, y, x + sx, y + sy) / patch_area;
                let weight = (-distance / h2).exp();
                weight_sum += weight;
                value_sum += weight * padded.get(x + sx, y + sy);
            }
        }

        // The centre patch always matches itself, so weight_sum >= 1
        Luma([(value_sum / weight_sum).round().clamp(0.0, 255.0) as u8])
    })
}

/// Edge-replicated copy of an image, addressable up to `border` pixels
/// outside the original bounds
struct Padded {
    data: Vec<f32>,
    stride: i32,
    border: i32,
}

impl Padded {
    fn new(img: &GrayImage, border: i32) -> Self {
        let (width, height) = (img.width() as i32, img.height() as i32);
        let stride = width + 2 * border;
        let rows = height + 2 * border;
        let mut data = Vec::with_capacity((stride * rows) as usize);

        for py in 0..rows {
            let y = (py - border).clamp(0, height - 1) as u32;
            for px in 0..stride {
                let x = (px - border).clamp(0, width - 1) as u32;
                data.push(img.get_pixel(x, y).0[0] as f32);
            }
        }

        Self {
            data,
            stride,
            border,
        }
    }

    fn get(&self, x: i32, y: i32) -> f32 {
        self.data[((y + self.border) * self.stride + x + self.border) as usize]
    }

    /// Sum of squared differences between the patches centred on a and b
    fn patch_distance(&self, ax: i32, ay: i32, bx: i32, by: i32) -> f32 {
        let mut sum = 0.0f32;
        for dy in -PATCH_RADIUS..=PATCH_RADIUS {
            for dx in -PATCH_RADIUS..=PATCH_RADIUS {
                let diff = self.get(ax + dx, ay + dy) - self.get(bx + dx, by + dy);
                sum += diff * diff;
            }
        }
        sum
    }
}
