//! Scan pipeline glue: preprocess → locate → rectify → segment → recognize
//! → board assembly.
//!
//! Algorithmic primitives live in `crate::preprocess`, `crate::contour`,
//! `crate::rectify`, `crate::segment`, and `crate::recognize`; this module
//! owns stage order, failure behavior, and the result surface. On any
//! failure no partial board escapes: the outcome is built only after all 81
//! cells are in, and every intermediate buffer is an owned value dropped on
//! each exit path.

use image::{DynamicImage, GrayImage};

use sudoscan_core::Board;

use crate::contour::{self, LocateConfig};
use crate::preprocess::{self, PreprocessConfig};
use crate::recognize::{DigitOcr, RecognitionResult, RecognizeConfig};
use crate::rectify::{self, RectifyConfig};
use crate::segment::{self, SegmentConfig};

/// Top-level scan configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ScanConfig {
    pub preprocess: PreprocessConfig,
    pub locate: LocateConfig,
    pub rectify: RectifyConfig,
    pub segment: SegmentConfig,
    pub recognize: RecognizeConfig,
}

// ── Error type ───────────────────────────────────────────────────────────

/// Why a scan produced no board.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// No four-vertex border contour was located in the photo.
    GridNotFound,
    /// The source raster could not be decoded.
    ImageDecode(String),
    /// Recognition or another pipeline stage failed.
    ScanFailed(String),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GridNotFound => write!(f, "grid not found"),
            Self::ImageDecode(msg) => write!(f, "image decode failure: {}", msg),
            Self::ScanFailed(msg) => write!(f, "scan failed: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}

// ── Result surface ───────────────────────────────────────────────────────

/// Full scan result for a single photo.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScanOutcome {
    /// The assembled board: recognized digits in place, everything else
    /// empty.
    pub board: Board,
    /// Per-cell recognition details, row-major (81 entries).
    pub cells: Vec<RecognitionResult>,
    /// Source image dimensions [width, height].
    pub image_size: [u32; 2],
}

// ── Entry points ─────────────────────────────────────────────────────────

/// Scan a decoded image.
pub fn scan_image(image: &DynamicImage, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
    let gray = preprocess::to_gray(image);
    scan_gray(&gray, config)
}

/// Scan a grayscale frame.
pub fn scan_gray(gray: &GrayImage, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
    let (width, height) = gray.dimensions();
    tracing::info!("scanning {}x{} frame", width, height);

    let blurred = preprocess::blur(gray, config.preprocess.blur_sigma);
    let bin = preprocess::adaptive_threshold_inv(
        &blurred,
        config.preprocess.adaptive_block,
        config.preprocess.adaptive_c,
    );

    let quad = contour::find_grid_quad(&bin, &config.locate).ok_or(ScanError::GridNotFound)?;
    let ordered = quad
        .ordered(config.rectify.min_side_px)
        .ok_or(ScanError::GridNotFound)?;

    let warped = rectify::warp_to_square(gray, &ordered, &config.rectify)
        .map_err(|e| ScanError::ScanFailed(format!("rectification: {}", e)))?;
    tracing::debug!(
        "border rectified onto {}px canvas",
        config.rectify.canvas_size
    );

    let crops = segment::split_cells(&warped, &config.segment);
    debug_assert_eq!(crops.len(), 81);

    // One engine for all 81 cells; placement is keyed by cell index, so the
    // assembled grid is row-major regardless of recognition order.
    let mut ocr = DigitOcr::new(&config.recognize)?;
    let mut cells = vec![RecognitionResult::empty(); 81];
    for (idx, crop) in crops.iter().enumerate() {
        cells[idx] = ocr.recognize(crop)?;
    }

    let mut board = Board::empty();
    for (idx, cell) in cells.iter().enumerate() {
        if let Some(digit) = cell.digit {
            board.set(idx / 9, idx % 9, digit);
        }
    }
    tracing::info!("{} digits recognized", board.filled_count());

    Ok(ScanOutcome {
        board,
        cells,
        image_size: [width, height],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadless_frame_fails_with_grid_not_found_before_ocr() {
        // A blank photo must fail at the locate stage; no OCR engine is
        // required for this path.
        let gray = GrayImage::from_pixel(120, 120, image::Luma([200]));
        let err = scan_gray(&gray, &ScanConfig::default()).unwrap_err();
        assert_eq!(err, ScanError::GridNotFound);
    }

    #[test]
    fn degenerate_border_fails_with_grid_not_found() {
        // A thin sliver produces a four-vertex approximation whose ordered
        // sides collapse below the minimum side length.
        let mut gray = GrayImage::from_pixel(200, 200, image::Luma([230]));
        for y in 60..66 {
            for x in 20..180 {
                gray.put_pixel(x, y, image::Luma([20]));
            }
        }
        let err = scan_gray(&gray, &ScanConfig::default()).unwrap_err();
        assert_eq!(err, ScanError::GridNotFound);
    }

    #[test]
    fn locate_and_rectify_recover_a_drawn_border() {
        // Geometry-only check of the stages ahead of recognition: a dark
        // square outline on a light field must come back as an ordered quad
        // matching the drawn corners.
        let mut gray = GrayImage::from_pixel(300, 300, image::Luma([220]));
        let (x0, y0, x1, y1) = (40u32, 50u32, 260u32, 270u32);
        for t in 0..4u32 {
            for x in x0..x1 {
                gray.put_pixel(x, y0 + t, image::Luma([15]));
                gray.put_pixel(x, y1 - 1 - t, image::Luma([15]));
            }
            for y in y0..y1 {
                gray.put_pixel(x0 + t, y, image::Luma([15]));
                gray.put_pixel(x1 - 1 - t, y, image::Luma([15]));
            }
        }

        let config = ScanConfig::default();
        let blurred = preprocess::blur(&gray, config.preprocess.blur_sigma);
        let bin = preprocess::adaptive_threshold_inv(
            &blurred,
            config.preprocess.adaptive_block,
            config.preprocess.adaptive_c,
        );
        let quad = contour::find_grid_quad(&bin, &config.locate).unwrap();
        let ordered = quad.ordered(config.rectify.min_side_px).unwrap();

        let close = |p: [f32; 2], x: f32, y: f32| (p[0] - x).abs() <= 4.0 && (p[1] - y).abs() <= 4.0;
        assert!(close(ordered.top_left, x0 as f32, y0 as f32));
        assert!(close(ordered.bottom_right, (x1 - 1) as f32, (y1 - 1) as f32));

        let warped = rectify::warp_to_square(&gray, &ordered, &config.rectify).unwrap();
        assert_eq!(warped.dimensions(), (450, 450));
        // The border strokes land on the canvas edge; the interior stays
        // light.
        assert!(warped.get_pixel(225, 225)[0] > 150);
    }
}
