//! External contour extraction and polygon approximation for grid location.
//!
//! Works on a binarized image (foreground > 0). Connected foreground
//! regions are discovered by flood fill; each region's outer boundary is
//! traced with Moore-neighbor following, then simplified with the
//! Ramer–Douglas–Peucker method. The puzzle border is assumed to be the
//! largest region whose simplified boundary has exactly four vertices.

use image::GrayImage;

use crate::quad::Quad;

/// Grid location controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LocateConfig {
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_frac: f32,
    /// Foreground regions with fewer pixels than this are skipped as noise.
    pub min_component_px: usize,
    /// Minimum enclosed area (px²) for a border candidate.
    pub min_area_px: f32,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            approx_epsilon_frac: 0.02,
            min_component_px: 16,
            min_area_px: 100.0,
        }
    }
}

/// A closed boundary polyline in pixel coordinates.
#[derive(Debug, Clone)]
pub struct Contour {
    /// Boundary points in traversal order; the polyline closes implicitly.
    pub points: Vec<[f32; 2]>,
}

impl Contour {
    /// Enclosed area (shoelace formula), in px².
    pub fn area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut acc = 0.0f64;
        for i in 0..n {
            let [x0, y0] = self.points[i];
            let [x1, y1] = self.points[(i + 1) % n];
            acc += x0 as f64 * y1 as f64 - x1 as f64 * y0 as f64;
        }
        (acc.abs() * 0.5) as f32
    }

    /// Closed-polyline length, in px.
    pub fn perimeter(&self) -> f32 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut acc = 0.0f64;
        for i in 0..n {
            let [x0, y0] = self.points[i];
            let [x1, y1] = self.points[(i + 1) % n];
            acc += ((x1 - x0) as f64).hypot((y1 - y0) as f64);
        }
        acc as f32
    }

    /// Simplify the closed boundary with Ramer–Douglas–Peucker tolerance
    /// `epsilon`.
    ///
    /// The closed curve is split at two mutually distant vertices and each
    /// open chain is simplified independently, so the result is a polygon
    /// rather than a chain pinned to an arbitrary start point.
    pub fn approx_polygon(&self, epsilon: f32) -> Vec<[f32; 2]> {
        let pts = &self.points;
        let n = pts.len();
        if n <= 3 {
            return pts.clone();
        }

        let a = farthest_from(pts, pts[0]);
        let b = farthest_from(pts, pts[a]);
        let (i, j) = (a.min(b), a.max(b));
        if i == j {
            return pts.clone();
        }

        let chain_fwd = &pts[i..=j];
        let mut chain_back: Vec<[f32; 2]> = pts[j..].to_vec();
        chain_back.extend_from_slice(&pts[..=i]);

        let mut out = rdp(chain_fwd, epsilon);
        let back = rdp(&chain_back, epsilon);
        // Each simplified chain ends where the other begins.
        out.pop();
        out.extend_from_slice(&back[..back.len() - 1]);
        out
    }
}

/// Trace the outer boundaries of all foreground regions.
pub fn find_external_contours(bin: &GrayImage, min_component_px: usize) -> Vec<Contour> {
    let (width, height) = bin.dimensions();
    let (w, h) = (width as i64, height as i64);
    let mut visited = vec![false; (width * height) as usize];
    let mut contours = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if visited[idx] || !is_fg(bin, x, y) {
                continue;
            }

            // Flood-fill the 8-connected component; the scan order makes
            // (x, y) its topmost-leftmost pixel.
            let mut count = 0usize;
            let mut stack = vec![(x, y)];
            visited[idx] = true;
            while let Some((cx, cy)) = stack.pop() {
                count += 1;
                for (dx, dy) in NEIGHBORS {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if !is_fg(bin, nx, ny) {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if !visited[nidx] {
                        visited[nidx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if count >= min_component_px {
                contours.push(Contour {
                    points: trace_boundary(bin, (x, y), count),
                });
            }
        }
    }
    contours
}

/// Locate the puzzle border: the largest contour whose approximation has
/// exactly four vertices.
pub fn find_grid_quad(bin: &GrayImage, config: &LocateConfig) -> Option<Quad> {
    let contours = find_external_contours(bin, config.min_component_px);
    tracing::debug!("{} external contours traced", contours.len());

    let mut best: Option<(f32, Quad)> = None;
    for contour in &contours {
        let area = contour.area();
        if area < config.min_area_px {
            continue;
        }
        let epsilon = config.approx_epsilon_frac * contour.perimeter();
        let approx = contour.approx_polygon(epsilon);
        if approx.len() != 4 {
            continue;
        }
        if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
            best = Some((area, Quad::new([approx[0], approx[1], approx[2], approx[3]])));
        }
    }

    match &best {
        Some((area, _)) => tracing::info!("grid border candidate found, area {:.0} px²", area),
        None => tracing::warn!("no four-vertex border contour found"),
    }
    best.map(|(_, quad)| quad)
}

// Clockwise 8-neighborhood starting west, image coordinates (y down).
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn is_fg(bin: &GrayImage, x: i64, y: i64) -> bool {
    x >= 0
        && y >= 0
        && x < bin.width() as i64
        && y < bin.height() as i64
        && bin.get_pixel(x as u32, y as u32)[0] > 0
}

/// Moore-neighbor boundary following from the component's topmost-leftmost
/// pixel, with Jacob's stopping criterion.
fn trace_boundary(bin: &GrayImage, start: (i64, i64), component_px: usize) -> Vec<[f32; 2]> {
    let initial_back = (start.0 - 1, start.1);
    let mut points = vec![[start.0 as f32, start.1 as f32]];
    let mut current = start;
    let mut back = initial_back;

    // Every boundary pixel is visited at most a bounded number of times.
    let max_steps = component_px * 8 + 8;
    for _ in 0..max_steps {
        let Some((next, prev)) = next_clockwise_fg(bin, current, back) else {
            break; // isolated pixel
        };
        current = next;
        back = prev;
        if current == start && back == initial_back {
            break;
        }
        points.push([current.0 as f32, current.1 as f32]);
    }
    points
}

/// Scan the 8-neighborhood of `p` clockwise starting after `back`; returns
/// the first foreground neighbor and the (background) neighbor examined
/// just before it.
fn next_clockwise_fg(
    bin: &GrayImage,
    p: (i64, i64),
    back: (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    let offset = (back.0 - p.0, back.1 - p.1);
    let back_idx = NEIGHBORS.iter().position(|&o| o == offset)?;
    for k in 1..=8 {
        let idx = (back_idx + k) % 8;
        let cand = (p.0 + NEIGHBORS[idx].0, p.1 + NEIGHBORS[idx].1);
        if is_fg(bin, cand.0, cand.1) {
            let prev_idx = (back_idx + k - 1) % 8;
            let prev = (p.0 + NEIGHBORS[prev_idx].0, p.1 + NEIGHBORS[prev_idx].1);
            return Some((cand, prev));
        }
    }
    None
}

fn farthest_from(pts: &[[f32; 2]], from: [f32; 2]) -> usize {
    let mut best = 0usize;
    let mut best_d = -1.0f32;
    for (i, p) in pts.iter().enumerate() {
        let d = (p[0] - from[0]).powi(2) + (p[1] - from[1]).powi(2);
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn rdp(pts: &[[f32; 2]], epsilon: f32) -> Vec<[f32; 2]> {
    if pts.len() < 3 {
        return pts.to_vec();
    }
    let (first, last) = (pts[0], pts[pts.len() - 1]);
    let mut max_d = 0.0f32;
    let mut max_i = 0usize;
    for (i, p) in pts.iter().enumerate().skip(1).take(pts.len() - 2) {
        let d = segment_distance(*p, first, last);
        if d > max_d {
            max_d = d;
            max_i = i;
        }
    }
    if max_d > epsilon {
        let mut left = rdp(&pts[..=max_i], epsilon);
        let right = rdp(&pts[max_i..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Perpendicular distance from `p` to the segment `a`-`b`.
fn segment_distance(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let (vx, vy) = (b[0] - a[0], b[1] - a[1]);
    let (px, py) = (p[0] - a[0], p[1] - a[1]);
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return (px * px + py * py).sqrt();
    }
    let t = ((px * vx + py * vy) / len_sq).clamp(0.0, 1.0);
    let (dx, dy) = (px - t * vx, py - t * vy);
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
        img
    }

    #[test]
    fn square_contour_area_and_perimeter() {
        let img = filled_rect(30, 30, 5, 5, 16, 16);
        let contours = find_external_contours(&img, 16);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        // Pixel centers span 5..=15, a 10x10 square.
        assert!((c.area() - 100.0).abs() < 1.0, "area {}", c.area());
        assert!((c.perimeter() - 40.0).abs() < 1.0, "perimeter {}", c.perimeter());
    }

    #[test]
    fn rdp_collapses_collinear_runs() {
        let pts: Vec<[f32; 2]> = (0..20).map(|i| [i as f32, 0.0]).collect();
        assert_eq!(rdp(&pts, 0.5), vec![[0.0, 0.0], [19.0, 0.0]]);
    }

    #[test]
    fn rdp_keeps_a_genuine_corner() {
        let mut pts: Vec<[f32; 2]> = (0..10).map(|i| [i as f32, 0.0]).collect();
        pts.extend((1..10).map(|i| [9.0, i as f32]));
        let out = rdp(&pts, 0.5);
        assert_eq!(out, vec![[0.0, 0.0], [9.0, 0.0], [9.0, 9.0]]);
    }

    #[test]
    fn grid_quad_found_on_a_rectangle() {
        let img = filled_rect(80, 80, 10, 15, 60, 55);
        let quad = find_grid_quad(&img, &LocateConfig::default()).unwrap();
        let ordered = quad.ordered(5.0).unwrap();
        let close = |p: [f32; 2], x: f32, y: f32| (p[0] - x).abs() <= 2.0 && (p[1] - y).abs() <= 2.0;
        assert!(close(ordered.top_left, 10.0, 15.0));
        assert!(close(ordered.top_right, 59.0, 15.0));
        assert!(close(ordered.bottom_left, 10.0, 54.0));
        assert!(close(ordered.bottom_right, 59.0, 54.0));
    }

    #[test]
    fn largest_of_two_rectangles_wins() {
        let mut img = filled_rect(100, 100, 5, 5, 20, 20);
        for y in 40..90 {
            for x in 30..95 {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
        let quad = find_grid_quad(&img, &LocateConfig::default()).unwrap();
        let ordered = quad.ordered(5.0).unwrap();
        assert!((ordered.top_left[0] - 30.0).abs() <= 2.0);
        assert!((ordered.top_left[1] - 40.0).abs() <= 2.0);
    }

    #[test]
    fn no_quad_on_blank_or_round_shapes() {
        let blank = GrayImage::new(50, 50);
        assert!(find_grid_quad(&blank, &LocateConfig::default()).is_none());

        // A disk approximates to far more than four vertices.
        let mut disk = GrayImage::new(80, 80);
        for y in 0..80i32 {
            for x in 0..80i32 {
                if (x - 40).pow(2) + (y - 40).pow(2) <= 25 * 25 {
                    disk.put_pixel(x as u32, y as u32, image::Luma([255]));
                }
            }
        }
        assert!(find_grid_quad(&disk, &LocateConfig::default()).is_none());
    }
}
