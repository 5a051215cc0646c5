//! Perspective rectification: 4-point homography estimation via DLT with
//! Hartley normalization, and inverse-map resampling onto a square canvas.

use image::GrayImage;
use nalgebra::{Matrix3, SMatrix, Vector3};

use crate::quad::OrderedQuad;

/// Rectification controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RectifyConfig {
    /// Side length of the rectified square canvas, in pixels.
    pub canvas_size: u32,
    /// Minimum accepted side length of the ordered border quad, in source
    /// pixels.
    pub min_side_px: f32,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            canvas_size: 450,
            min_side_px: 20.0,
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RectifyError {
    NumericalFailure(String),
}

impl std::fmt::Display for RectifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NumericalFailure(msg) => write!(f, "numerical failure: {}", msg),
        }
    }
}

impl std::error::Error for RectifyError {}

// ── Homography ───────────────────────────────────────────────────────────

/// Project a 2D point through a 3×3 homography: H * [x, y, 1]^T → [u, v].
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> [f64; 2] {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < 1e-15 {
        return [f64::NAN, f64::NAN];
    }
    [p[0] / p[2], p[1] / p[2]]
}

/// Estimate the homography mapping the corners of a `side`-unit square
/// (canvas frame) onto the ordered border quad (source frame).
///
/// DLT on the four exact correspondences with Hartley normalization; the
/// solution is the smallest-eigenvalue eigenvector of A^T A.
pub fn square_to_quad_homography(
    side: f64,
    quad: &OrderedQuad,
) -> Result<Matrix3<f64>, RectifyError> {
    let src = [[0.0, 0.0], [side, 0.0], [0.0, side], [side, side]];
    let dst = [
        [quad.top_left[0] as f64, quad.top_left[1] as f64],
        [quad.top_right[0] as f64, quad.top_right[1] as f64],
        [quad.bottom_left[0] as f64, quad.bottom_left[1] as f64],
        [quad.bottom_right[0] as f64, quad.bottom_right[1] as f64],
    ];

    let (t_src, src_n) = normalize_points(&src);
    let (t_dst, dst_n) = normalize_points(&dst);

    // 8×9 DLT system, two rows per correspondence.
    let mut a: SMatrix<f64, 8, 9> = SMatrix::zeros();
    for i in 0..4 {
        let (sx, sy) = (src_n[i][0], src_n[i][1]);
        let (dx, dy) = (dst_n[i][0], dst_n[i][1]);

        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }

    // h is the eigenvector of A^T A with the smallest eigenvalue.
    let ata = a.transpose() * a;
    let eig = nalgebra::SymmetricEigen::new(ata);
    let mut min_idx = 0;
    let mut min_val = eig.eigenvalues[0].abs();
    for i in 1..9 {
        let v = eig.eigenvalues[i].abs();
        if v < min_val {
            min_val = v;
            min_idx = i;
        }
    }
    let h_vec: Vec<f64> = (0..9).map(|j| eig.eigenvectors[(j, min_idx)]).collect();
    let h_norm = Matrix3::new(
        h_vec[0], h_vec[1], h_vec[2],
        h_vec[3], h_vec[4], h_vec[5],
        h_vec[6], h_vec[7], h_vec[8],
    );

    // Denormalize: H = T_dst^-1 * H_norm * T_src.
    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or_else(|| RectifyError::NumericalFailure("T_dst not invertible".into()))?;
    let h = t_dst_inv * h_norm * t_src;

    let scale = h[(2, 2)];
    if scale.abs() < 1e-15 {
        Ok(h)
    } else {
        Ok(h / scale)
    }
}

/// Compute a normalizing transform: translate centroid to origin, scale so
/// mean distance from origin is sqrt(2).
fn normalize_points(pts: &[[f64; 2]; 4]) -> (Matrix3<f64>, [[f64; 2]; 4]) {
    let n = pts.len() as f64;
    let cx: f64 = pts.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy: f64 = pts.iter().map(|p| p[1]).sum::<f64>() / n;

    let mean_dist: f64 = pts
        .iter()
        .map(|p| ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized =
        std::array::from_fn(|i| [s * (pts[i][0] - cx), s * (pts[i][1] - cy)]);
    (t, normalized)
}

// ── Resampling ───────────────────────────────────────────────────────────

/// Resample the source image through the border homography onto a square
/// canvas of `config.canvas_size` pixels.
pub fn warp_to_square(
    src: &GrayImage,
    quad: &OrderedQuad,
    config: &RectifyConfig,
) -> Result<GrayImage, RectifyError> {
    let side = config.canvas_size;
    let h = square_to_quad_homography(side as f64, quad)?;

    let mut out = GrayImage::new(side, side);
    for y in 0..side {
        for x in 0..side {
            let p = project(&h, x as f64, y as f64);
            let v = bilinear_sample(src, p[0] as f32, p[1] as f32);
            out.put_pixel(x, y, image::Luma([(v * 255.0).round() as u8]));
        }
    }
    Ok(out)
}

/// Sample a grayscale image at sub-pixel position using bilinear
/// interpolation. Returns intensity in [0, 1]; out-of-bounds reads are 0.
#[inline]
fn bilinear_sample(img: &GrayImage, x: f32, y: f32) -> f32 {
    let (w, h) = img.dimensions();
    if x < 0.0 || y < 0.0 {
        return 0.0;
    }
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    if x0 + 1 >= w || y0 + 1 >= h {
        return 0.0;
    }
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let p00 = img.get_pixel(x0, y0)[0] as f32 / 255.0;
    let p10 = img.get_pixel(x0 + 1, y0)[0] as f32 / 255.0;
    let p01 = img.get_pixel(x0, y0 + 1)[0] as f32 / 255.0;
    let p11 = img.get_pixel(x0 + 1, y0 + 1)[0] as f32 / 255.0;
    (1.0 - fx) * (1.0 - fy) * p00 + fx * (1.0 - fy) * p10 + (1.0 - fx) * fy * p01 + fx * fy * p11
}
