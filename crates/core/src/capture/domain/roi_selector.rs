//! Region-of-interest selection from hand landmarks.
//!
//! The crop is the union box of all landmark points, padded by a margin
//! proportional to its longest side and clamped to the frame. Wider
//! multi-hand scenes get a smaller margin factor.

use crate::shared::constants::{MIN_ROI_SIDE_PX, MULTI_HAND_MARGIN, SINGLE_HAND_MARGIN};
use crate::shared::landmarks::LandmarkSet;
use crate::shared::region::Region;

pub fn select_region(frame_width: u32, frame_height: u32, sets: &[LandmarkSet]) -> Region {
    let fw = f64::from(frame_width);
    let fh = f64::from(frame_height);
    let full = Region::new(0.0, 0.0, fw, fh);

    let Some(bounds) = normalized_bounds(sets) else {
        return full;
    };

    let mut x = bounds.x * fw;
    let mut y = bounds.y * fh;
    let mut w = bounds.width * fw;
    let mut h = bounds.height * fh;

    let margin_scale = if sets.len() > 1 {
        MULTI_HAND_MARGIN
    } else {
        SINGLE_HAND_MARGIN
    };
    let margin = margin_scale * w.max(h);
    x -= margin;
    y -= margin;
    w += 2.0 * margin;
    h += 2.0 * margin;

    // Shrink rather than translate when a side crosses the frame edge.
    if x < 0.0 {
        w += x;
        x = 0.0;
    }
    if y < 0.0 {
        h += y;
        y = 0.0;
    }
    if x + w > fw {
        w = fw - x;
    }
    if y + h > fh {
        h = fh - y;
    }

    if w < MIN_ROI_SIDE_PX || h < MIN_ROI_SIDE_PX {
        return full;
    }
    Region::new(x, y, w, h)
}

/// Union box of every point, in normalized coordinates.
fn normalized_bounds(sets: &[LandmarkSet]) -> Option<Region> {
    let mut points = sets.iter().flatten().peekable();
    points.peek()?;

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Region::from_corners(min_x, min_y, max_x, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::shared::landmarks::LandmarkPoint;

    fn hand(points: &[(f64, f64)]) -> LandmarkSet {
        points.iter().map(|&(x, y)| LandmarkPoint::new(x, y)).collect()
    }

    #[test]
    fn test_no_landmarks_is_full_frame() {
        assert_eq!(
            select_region(640, 480, &[]),
            Region::new(0.0, 0.0, 640.0, 480.0)
        );
    }

    #[test]
    fn test_empty_sets_are_full_frame() {
        assert_eq!(
            select_region(640, 480, &[vec![], vec![]]),
            Region::new(0.0, 0.0, 640.0, 480.0)
        );
    }

    #[test]
    fn test_single_hand_margin_equals_max_side() {
        // box 400..600 in a 1000x1000 frame, margin 200 on each side
        let sets = [hand(&[(0.4, 0.4), (0.6, 0.6), (0.5, 0.45)])];
        let r = select_region(1000, 1000, &sets);
        assert_relative_eq!(r.x, 200.0, epsilon = 1e-9);
        assert_relative_eq!(r.y, 200.0, epsilon = 1e-9);
        assert_relative_eq!(r.width, 600.0, epsilon = 1e-9);
        assert_relative_eq!(r.height, 600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_margin_uses_longest_side() {
        // box 100 wide, 50 tall in pixels → margin 100
        let sets = [hand(&[(0.45, 0.5), (0.55, 0.55)])];
        let r = select_region(1000, 1000, &sets);
        assert_relative_eq!(r.x, 350.0, epsilon = 1e-9);
        assert_relative_eq!(r.y, 400.0, epsilon = 1e-9);
        assert_relative_eq!(r.width, 300.0, epsilon = 1e-9);
        assert_relative_eq!(r.height, 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_multiple_hands_use_smaller_margin() {
        let sets = [hand(&[(0.3, 0.4)]), hand(&[(0.5, 0.5)])];
        // union box: 200 wide, 100 tall → margin 0.8 * 200 = 160
        let r = select_region(1000, 1000, &sets);
        assert_relative_eq!(r.x, 140.0, epsilon = 1e-9);
        assert_relative_eq!(r.y, 240.0, epsilon = 1e-9);
        assert_relative_eq!(r.width, 520.0, epsilon = 1e-9);
        assert_relative_eq!(r.height, 420.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamping_shrinks_instead_of_translating() {
        // box 0..100 px, margin 100 → raw -100..200, clamped 0..200
        let sets = [hand(&[(0.0, 0.0), (0.1, 0.1)])];
        let r = select_region(1000, 1000, &sets);
        assert_eq!(r.x, 0.0);
        assert_eq!(r.y, 0.0);
        assert_relative_eq!(r.width, 200.0, epsilon = 1e-9);
        assert_relative_eq!(r.height, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamping_at_far_edges() {
        let sets = [hand(&[(0.9, 0.9), (1.0, 1.0)])];
        let r = select_region(1000, 1000, &sets);
        assert_relative_eq!(r.x, 800.0, epsilon = 1e-9);
        assert_relative_eq!(r.right(), 1000.0, epsilon = 1e-9);
        assert_relative_eq!(r.bottom(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_region_falls_back_to_full_frame() {
        // A single point has zero size, so the margin is zero too.
        let sets = [hand(&[(0.5, 0.5)])];
        assert_eq!(
            select_region(640, 480, &sets),
            Region::new(0.0, 0.0, 640.0, 480.0)
        );
    }

    #[test]
    fn test_points_outside_frame_fall_back() {
        let sets = [hand(&[(1.5, 1.5), (1.6, 1.6)])];
        assert_eq!(
            select_region(100, 100, &sets),
            Region::new(0.0, 0.0, 100.0, 100.0)
        );
    }
}
