//! Puzzle border quadrilateral and corner ordering.

/// Four corner points of the detected puzzle border, in the arbitrary order
/// produced by contour approximation.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Quad {
    pub corners: [[f32; 2]; 4],
}

/// A quad with corners assigned to their grid roles.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct OrderedQuad {
    pub top_left: [f32; 2],
    pub top_right: [f32; 2],
    pub bottom_left: [f32; 2],
    pub bottom_right: [f32; 2],
}

impl Quad {
    pub fn new(corners: [[f32; 2]; 4]) -> Self {
        Self { corners }
    }

    /// Assign corner roles by the extremal rule: top-left minimizes `x + y`,
    /// bottom-right maximizes it, top-right minimizes `y - x`, bottom-left
    /// maximizes it.
    ///
    /// Near-degenerate quads defeat the extremal rule (two roles can land on
    /// the same source corner), so the assignment returns `None` when roles
    /// collide or any ordered side is shorter than `min_side`.
    pub fn ordered(&self, min_side: f32) -> Option<OrderedQuad> {
        let sum = |p: [f32; 2]| p[0] + p[1];
        let diff = |p: [f32; 2]| p[1] - p[0];

        let tl = extremal_index(&self.corners, |p| -sum(p));
        let br = extremal_index(&self.corners, sum);
        let tr = extremal_index(&self.corners, |p| -diff(p));
        let bl = extremal_index(&self.corners, diff);

        let mut seen = [false; 4];
        for idx in [tl, br, tr, bl] {
            if seen[idx] {
                return None;
            }
            seen[idx] = true;
        }

        let ordered = OrderedQuad {
            top_left: self.corners[tl],
            top_right: self.corners[tr],
            bottom_left: self.corners[bl],
            bottom_right: self.corners[br],
        };
        (ordered.min_side_len() >= min_side).then_some(ordered)
    }
}

impl OrderedQuad {
    fn min_side_len(&self) -> f32 {
        let sides = [
            dist(self.top_left, self.top_right),
            dist(self.top_right, self.bottom_right),
            dist(self.bottom_right, self.bottom_left),
            dist(self.bottom_left, self.top_left),
        ];
        sides.into_iter().fold(f32::INFINITY, f32::min)
    }
}

fn extremal_index(corners: &[[f32; 2]; 4], key: impl Fn([f32; 2]) -> f32) -> usize {
    let mut best = 0usize;
    for i in 1..4 {
        if key(corners[i]) > key(corners[best]) {
            best = i;
        }
    }
    best
}

fn dist(a: [f32; 2], b: [f32; 2]) -> f32 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_corners_get_their_roles() {
        let quad = Quad::new([[90.0, 10.0], [10.0, 10.0], [95.0, 88.0], [8.0, 92.0]]);
        let ordered = quad.ordered(10.0).unwrap();
        assert_eq!(ordered.top_left, [10.0, 10.0]);
        assert_eq!(ordered.top_right, [90.0, 10.0]);
        assert_eq!(ordered.bottom_left, [8.0, 92.0]);
        assert_eq!(ordered.bottom_right, [95.0, 88.0]);
    }

    #[test]
    fn mildly_skewed_quad_still_orders() {
        // Perspective-skewed grid: top edge shorter than bottom.
        let quad = Quad::new([[30.0, 20.0], [80.0, 25.0], [100.0, 90.0], [10.0, 85.0]]);
        let ordered = quad.ordered(10.0).unwrap();
        assert_eq!(ordered.top_left, [30.0, 20.0]);
        assert_eq!(ordered.top_right, [80.0, 25.0]);
        assert_eq!(ordered.bottom_right, [100.0, 90.0]);
        assert_eq!(ordered.bottom_left, [10.0, 85.0]);
    }

    #[test]
    fn duplicated_corner_is_rejected() {
        let quad = Quad::new([[10.0, 10.0], [10.0, 10.0], [90.0, 90.0], [10.0, 90.0]]);
        assert!(quad.ordered(10.0).is_none());
    }

    #[test]
    fn collapsed_side_is_rejected() {
        let quad = Quad::new([[10.0, 10.0], [12.0, 10.5], [90.0, 90.0], [10.0, 90.0]]);
        assert!(quad.ordered(20.0).is_none());
    }
}
