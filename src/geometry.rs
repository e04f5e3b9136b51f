// Geometry checks used to validate proposed branches

use crate::types::{Node, Point};

#[inline]
fn near(a: Point, b: Point, tolerance: f32) -> bool {
    (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance
}

#[inline]
fn ccw(a: Point, b: Point, c: Point) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Whether segments `a` and `b` cross.
///
/// Segments sharing an endpoint (within `endpoint_tolerance` on both axes)
/// are adjacent, not crossing.
pub fn intersects(
    a_start: Point,
    a_end: Point,
    b_start: Point,
    b_end: Point,
    endpoint_tolerance: f32,
) -> bool {
    if near(a_start, b_start, endpoint_tolerance)
        || near(a_start, b_end, endpoint_tolerance)
        || near(a_end, b_start, endpoint_tolerance)
        || near(a_end, b_end, endpoint_tolerance)
    {
        return false;
    }

    ccw(a_start, b_start, b_end) != ccw(a_end, b_start, b_end)
        && ccw(a_start, a_end, b_start) != ccw(a_start, a_end, b_end)
}

#[inline]
pub fn in_bounds(point: Point, width: f32, height: f32) -> bool {
    point.x >= 0.0 && point.x <= width && point.y >= 0.0 && point.y <= height
}

pub fn overlaps_existing_node<'a>(
    point: Point,
    nodes: impl IntoIterator<Item = &'a Node>,
    tolerance: f32,
) -> bool {
    nodes
        .into_iter()
        .any(|n| near(n.point(), point, tolerance))
}

/// Slow-fast-slow easing for the line draw animation.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub fn lerp_point(a: Point, b: Point, t: f32) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn crossing_diagonals_intersect() {
        assert!(intersects(p(0.0, 0.0), p(20.0, 20.0), p(0.0, 20.0), p(20.0, 0.0), 1.0));
    }

    #[test]
    fn shared_endpoint_is_not_a_collision() {
        // Both lines meet at (21, 21)
        assert!(!intersects(p(1.0, 1.0), p(21.0, 21.0), p(21.0, 21.0), p(41.0, 1.0), 1.0));
        assert!(!intersects(p(1.0, 1.0), p(21.0, 21.0), p(41.0, 41.0), p(21.0, 21.0), 1.0));
        // Within tolerance still counts as shared
        assert!(!intersects(p(1.0, 1.0), p(21.0, 21.0), p(21.5, 20.6), p(1.0, 41.0), 1.0));
    }

    #[test]
    fn disjoint_and_parallel_segments_do_not_intersect() {
        assert!(!intersects(p(0.0, 0.0), p(10.0, 0.0), p(0.0, 5.0), p(10.0, 5.0), 1.0));
        assert!(!intersects(p(0.0, 0.0), p(10.0, 10.0), p(30.0, 0.0), p(40.0, 10.0), 1.0));
        // Would cross if extended, but stop short
        assert!(!intersects(p(0.0, 0.0), p(10.0, 0.0), p(20.0, -5.0), p(20.0, 5.0), 1.0));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(in_bounds(p(0.0, 0.0), 100.0, 100.0));
        assert!(in_bounds(p(100.0, 100.0), 100.0, 100.0));
        assert!(!in_bounds(p(-0.1, 50.0), 100.0, 100.0));
        assert!(!in_bounds(p(50.0, 100.5), 100.0, 100.0));
        assert!(!in_bounds(p(1.0, 1.0), 0.0, 0.0));
    }

    #[test]
    fn overlap_uses_per_axis_tolerance() {
        let nodes = [Node::new(21.0, 21.0)];
        assert!(overlaps_existing_node(p(24.0, 18.0), &nodes, 5.0));
        assert!(!overlaps_existing_node(p(26.0, 21.0), &nodes, 5.0));
        assert!(!overlaps_existing_node(p(26.0, 21.0), std::iter::empty(), 5.0));
    }

    #[test]
    fn easing_is_symmetric_and_pinned() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        let a = ease_in_out_cubic(0.2);
        let b = ease_in_out_cubic(0.8);
        assert!((a + b - 1.0).abs() < 1e-6);
        // Slow start compared to linear
        assert!(a < 0.2);
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = p(1.0, 1.0);
        let b = p(21.0, 1.0);
        assert_eq!(lerp_point(a, b, 0.0), a);
        assert_eq!(lerp_point(a, b, 1.0), b);
        assert_eq!(lerp_point(a, b, 0.5), p(11.0, 1.0));
    }
}
