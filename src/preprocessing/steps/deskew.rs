use crate::error::ScanError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::geometry::convex_hull;
use imageproc::point::Point;

/// Rotations at or below this many degrees are left alone; resampling an
/// already-straight receipt only blurs it
pub const MIN_CORRECTION_DEGREES: f32 = 0.5;

/// Outcome of a deskew pass
#[derive(Debug, Clone)]
pub struct Deskewed {
    pub image: GrayImage,
    /// Detected skew in degrees, normalized into (-45, 45]
    pub angle: f32,
    /// Whether the image was actually rotated
    pub rotated: bool,
}

/// Deskew image by detecting and correcting rotation
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ScanError> {
    Ok(DynamicImage::ImageLuma8(correct(image.to_luma8()).image))
}

/// Detect the skew of the ink and rotate it back to horizontal
pub fn correct(gray: GrayImage) -> Deskewed {
    let angle = detect_skew_angle(&gray);

    if angle.abs() <= MIN_CORRECTION_DEGREES {
        return Deskewed {
            image: gray,
            angle,
            rotated: false,
        };
    }

    tracing::debug!("Correcting skew of {:.2} degrees", angle);
    Deskewed {
        image: rotate_replicating_edges(&gray, angle),
        angle,
        rotated: true,
    }
}

/// Detect skew angle (degrees) from the minimum-area rectangle around the ink
///
/// Ink is every pixel at or below the Otsu cutoff. The rectangle's angle is
/// only meaningful modulo 90 degrees, so it is folded into (-45, 45].
pub fn detect_skew_angle(img: &GrayImage) -> f32 {
    let points = ink_points(img);
    if points.len() < 3 {
        return 0.0;
    }

    let hull = convex_hull(points.as_slice());
    if hull.len() < 3 {
        return 0.0;
    }

    normalize_angle(min_area_rect_angle(&hull))
}

fn ink_points(img: &GrayImage) -> Vec<Point<i32>> {
    let cutoff = otsu_level(img);
    img.enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] <= cutoff)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect()
}

/// Rotating calipers: the minimum-area enclosing rectangle has one side
/// collinear with a hull edge, so test each edge direction
fn min_area_rect_angle(hull: &[Point<i32>]) -> f32 {
    let mut best_area = f64::INFINITY;
    let mut best_angle = 0.0f64;

    for (i, a) in hull.iter().enumerate() {
        let b = hull[(i + 1) % hull.len()];
        let (ex, ey) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
        let len = ex.hypot(ey);
        if len == 0.0 {
            continue;
        }
        let (ux, uy) = (ex / len, ey / len);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in hull {
            let (px, py) = (p.x as f64, p.y as f64);
            let u = px * ux + py * uy;
            let v = -px * uy + py * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if area < best_area {
            best_area = area;
            best_angle = ey.atan2(ex).to_degrees();
        }
    }

    best_angle as f32
}

/// Fold an angle into (-45, 45]
fn normalize_angle(mut degrees: f32) -> f32 {
    while degrees <= -45.0 {
        degrees += 90.0;
    }
    while degrees > 45.0 {
        degrees -= 90.0;
    }
    degrees
}

/// Rotate about the centre by `-skew` degrees, keeping the canvas size.
/// Samples falling outside the source take the nearest edge pixel, so no
/// blank border is introduced.
fn rotate_replicating_edges(img: &GrayImage, skew: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let (sin_a, cos_a) = skew.to_radians().sin_cos();
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let sx = cx + dx * cos_a - dy * sin_a;
        let sy = cy + dx * sin_a + dy * cos_a;
        Luma([sample_bilinear(img, sx, sy)])
    })
}

fn sample_bilinear(img: &GrayImage, x: f32, y: f32) -> u8 {
    let max_x = img.width() as f32 - 1.0;
    let max_y = img.height() as f32 - 1.0;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor();
    let y0 = y.floor();
    let x1 = (x0 + 1.0).min(max_x);
    let y1 = (y0 + 1.0).min(max_y);
    let fx = x - x0;
    let fy = y - y0;

    let at = |px: f32, py: f32| img.get_pixel(px as u32, py as u32).0[0] as f32;
    let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
    let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;

    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
}
