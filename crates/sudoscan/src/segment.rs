//! Cell segmentation: slicing the rectified canvas into 81 inset crops.

use image::GrayImage;

use sudoscan_core::SIZE;

/// Segmentation controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SegmentConfig {
    /// Margin cropped from each cell edge, in canvas pixels, to exclude
    /// grid-line strokes from recognition.
    pub inset: u32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self { inset: 8 }
    }
}

/// Split the rectified square canvas into 81 cell crops, row-major.
///
/// Cells are `side / 9` pixels square; `inset` is clamped so every crop
/// keeps at least one pixel.
pub fn split_cells(canvas: &GrayImage, config: &SegmentConfig) -> Vec<GrayImage> {
    let cell = canvas.width().min(canvas.height()) / SIZE as u32;
    let inset = if cell > 2 {
        config.inset.min((cell - 1) / 2)
    } else {
        0
    };
    let crop_size = cell - 2 * inset;

    let mut cells = Vec::with_capacity(SIZE * SIZE);
    for row in 0..SIZE as u32 {
        for col in 0..SIZE as u32 {
            let x = col * cell + inset;
            let y = row * cell + inset;
            cells.push(image::imageops::crop_imm(canvas, x, y, crop_size, crop_size).to_image());
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_yields_81_inset_cells() {
        let canvas = GrayImage::new(450, 450);
        let cells = split_cells(&canvas, &SegmentConfig::default());
        assert_eq!(cells.len(), 81);
        // 450 / 9 = 50 per cell, minus 8 from each edge.
        assert!(cells.iter().all(|c| c.dimensions() == (34, 34)));
    }

    #[test]
    fn crops_are_row_major_and_positioned_by_cell() {
        // Mark one pixel inside cell (2, 5): cell origin (250, 100), inset 8.
        let mut canvas = GrayImage::new(450, 450);
        canvas.put_pixel(250 + 8 + 3, 100 + 8 + 4, image::Luma([255]));
        let cells = split_cells(&canvas, &SegmentConfig::default());

        let idx = 2 * 9 + 5;
        assert_eq!(cells[idx].get_pixel(3, 4)[0], 255);
        assert!(cells
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .all(|(_, c)| c.pixels().all(|px| px[0] == 0)));
    }

    #[test]
    fn oversized_inset_is_clamped() {
        let canvas = GrayImage::new(45, 45); // 5 px cells
        let cells = split_cells(&canvas, &SegmentConfig { inset: 8 });
        assert_eq!(cells.len(), 81);
        assert!(cells.iter().all(|c| c.width() >= 1));
    }
}
