//! Image preprocessing: grayscale, blur, and thresholding.

use image::{DynamicImage, GrayImage};

/// Preprocessing controls for the locate stage.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PreprocessConfig {
    /// Gaussian blur sigma applied before thresholding.
    pub blur_sigma: f32,
    /// Side length of the adaptive-threshold neighborhood (odd, pixels).
    pub adaptive_block: u32,
    /// Constant subtracted from the neighborhood mean.
    pub adaptive_c: i16,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.4,
            adaptive_block: 11,
            adaptive_c: 2,
        }
    }
}

/// Convert a decoded image to single-channel intensity.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Gaussian blur.
pub fn blur(gray: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return gray.clone();
    }
    image::imageops::blur(gray, sigma)
}

/// Adaptive mean threshold with inverted polarity: a pixel becomes
/// foreground (255) when it is darker than its local mean minus `c`.
///
/// The neighborhood is a `block`×`block` window clamped at the image border;
/// means come from an integral image so the cost is independent of the
/// window size.
pub fn adaptive_threshold_inv(gray: &GrayImage, block: u32, c: i16) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let integral = integral_image(gray);
    let stride = width as usize + 1;
    let half = (block.max(1) / 2) as i64;

    for y in 0..height {
        for x in 0..width {
            let x0 = (x as i64 - half).max(0) as usize;
            let y0 = (y as i64 - half).max(0) as usize;
            let x1 = (x as i64 + half).min(width as i64 - 1) as usize + 1;
            let y1 = (y as i64 + half).min(height as i64 - 1) as usize + 1;

            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let count = ((x1 - x0) * (y1 - y0)) as i64;
            let mean = (sum as i64 / count) as i32;

            let src = gray.get_pixel(x, y)[0] as i32;
            let fg = src <= mean - c as i32;
            out.put_pixel(x, y, image::Luma([if fg { 255 } else { 0 }]));
        }
    }
    out
}

/// Fixed binary threshold with inverted polarity: dark strokes become
/// foreground (255), background becomes 0.
pub fn threshold_inv(gray: &GrayImage, thresh: u8) -> GrayImage {
    let mut out = gray.clone();
    for px in out.pixels_mut() {
        px[0] = if px[0] <= thresh { 255 } else { 0 };
    }
    out
}

/// Fraction of foreground pixels in a binarized image.
pub fn foreground_fraction(bin: &GrayImage) -> f32 {
    let total = bin.width() as usize * bin.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let fg = bin.pixels().filter(|px| px[0] > 0).count();
    fg as f32 / total as f32
}

fn integral_image(gray: &GrayImage) -> Vec<u64> {
    let (width, height) = gray.dimensions();
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += gray.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
    integral
}
