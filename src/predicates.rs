/*!
Geometric predicates in the XY plane. The `z` coordinate of all inputs is
ignored.
*/

use glam::{dvec3, DVec3};

/// Circle in the XY plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub center: DVec3,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Circle { center, radius }
    }

    /// Circle through three points. Returns `None` if the points are
    /// collinear.
    pub fn circumcircle(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d == 0.0 {
            return None;
        }
        let (a2, b2, c2) = (
            a.x * a.x + a.y * a.y,
            b.x * b.x + b.y * b.y,
            c.x * c.x + c.y * c.y,
        );
        let center = dvec3(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
            0.0,
        );
        Some(Circle {
            center,
            radius: distance_xy(center, a),
        })
    }

    /// Strictly inside. Points on the circle are outside.
    pub fn contains(&self, p: DVec3) -> bool {
        distance_xy(self.center, p) < self.radius
    }
}

pub fn distance_xy(a: DVec3, b: DVec3) -> f64 {
    (a - b).truncate().length()
}

/// Signed cross product of `b - a` and `c - a`, i.e. twice the signed area of
/// the triangle.
pub fn cross_xy(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `a`, `b`, `c` make a counter-clockwise turn. Collinear points count
/// as counter-clockwise only if `colinear` is true.
pub fn is_ccw_xy(a: DVec3, b: DVec3, c: DVec3, colinear: bool) -> bool {
    let cross = cross_xy(a, b, c);
    if colinear { cross >= 0.0 } else { cross > 0.0 }
}

/// Whether `p` is inside the triangle `(a, b, c)`, in either winding. Points
/// on the edges are inside.
pub fn is_point_in_triangle_xy(p: DVec3, a: DVec3, b: DVec3, c: DVec3) -> bool {
    let sides = [cross_xy(a, b, p), cross_xy(b, c, p), cross_xy(c, a, p)];
    let has_neg = sides.iter().any(|s| *s < 0.0);
    let has_pos = sides.iter().any(|s| *s > 0.0);
    !(has_neg && has_pos)
}

/// Whether `p` is inside the polygon, by counting crossings of a horizontal
/// ray. The polygon is closed implicitly.
pub fn is_point_in_polygon_xy(p: DVec3, polygon: &[DVec3]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Whether the segments `(a, b)` and `(c, d)` cross. Touching or collinear
/// segments do not cross.
pub fn is_intersection_segment_segment_xy(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> bool {
    cross_xy(c, d, a) * cross_xy(c, d, b) < 0.0 && cross_xy(a, b, c) * cross_xy(a, b, d) < 0.0
}

/// Average of the points. Returns the origin for an empty slice.
pub fn centroid_points(points: &[DVec3]) -> DVec3 {
    if points.is_empty() {
        return DVec3::ZERO;
    }
    points.iter().sum::<DVec3>() / points.len() as f64
}

/// Corners of the axis aligned bounding box in the XY plane, as `(min, max)`
/// with zero `z`. Returns `None` for an empty slice.
pub fn bounding_box_xy(points: &[DVec3]) -> Option<(DVec3, DVec3)> {
    let first = points.first()?;
    let (min, max) = points
        .iter()
        .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
    Some((dvec3(min.x, min.y, 0.0), dvec3(max.x, max.y, 0.0)))
}

#[cfg(test)]
mod test {
    use glam::dvec3;

    use super::*;
    use crate::macros::assert_f64_eq;

    #[test]
    fn t_ccw() {
        let (a, b) = (dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0));
        assert!(is_ccw_xy(a, b, dvec3(0.5, 1.0, 0.0), false));
        assert!(!is_ccw_xy(a, b, dvec3(0.5, -1.0, 0.0), false));
        assert!(!is_ccw_xy(a, b, dvec3(2.0, 0.0, 0.0), false));
        assert!(is_ccw_xy(a, b, dvec3(2.0, 0.0, 0.0), true));
        // z is ignored.
        assert!(is_ccw_xy(a, b, dvec3(0.5, 1.0, -100.0), false));
    }

    #[test]
    fn t_point_in_triangle() {
        let (a, b, c) = (
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
        );
        assert!(is_point_in_triangle_xy(dvec3(0.2, 0.2, 0.0), a, b, c));
        assert!(is_point_in_triangle_xy(dvec3(0.2, 0.2, 0.0), a, c, b));
        assert!(is_point_in_triangle_xy(dvec3(0.5, 0.0, 0.0), a, b, c));
        assert!(!is_point_in_triangle_xy(dvec3(0.6, 0.6, 0.0), a, b, c));
    }

    #[test]
    fn t_circumcircle() {
        let circle = Circle::circumcircle(
            dvec3(0.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(0.0, 2.0, 0.0),
        )
        .expect("Points are collinear");
        assert_f64_eq!(circle.center.x, 1.0);
        assert_f64_eq!(circle.center.y, 1.0);
        assert_f64_eq!(circle.radius, 2f64.sqrt());
        assert!(circle.contains(dvec3(1.5, 1.5, 0.0)));
        // On the circle.
        assert!(!circle.contains(dvec3(2.0, 2.0, 0.0)));
        assert!(Circle::circumcircle(
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 1.0, 0.0),
            dvec3(2.0, 2.0, 0.0)
        )
        .is_none());
    }

    #[test]
    fn t_point_in_polygon() {
        let square = [
            dvec3(0.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(2.0, 2.0, 0.0),
            dvec3(0.0, 2.0, 0.0),
        ];
        assert!(is_point_in_polygon_xy(dvec3(1.0, 1.0, 0.0), &square));
        assert!(!is_point_in_polygon_xy(dvec3(3.0, 1.0, 0.0), &square));
        assert!(!is_point_in_polygon_xy(dvec3(1.0, 1.0, 0.0), &square[..2]));
    }

    #[test]
    fn t_segment_intersection() {
        let (a, b) = (dvec3(0.0, 0.0, 0.0), dvec3(2.0, 2.0, 0.0));
        assert!(is_intersection_segment_segment_xy(
            a,
            b,
            dvec3(0.0, 2.0, 0.0),
            dvec3(2.0, 0.0, 0.0)
        ));
        assert!(!is_intersection_segment_segment_xy(
            a,
            b,
            dvec3(3.0, 0.0, 0.0),
            dvec3(4.0, 1.0, 0.0)
        ));
        // Shared endpoint.
        assert!(!is_intersection_segment_segment_xy(
            a,
            b,
            b,
            dvec3(4.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn t_centroid_and_bbox() {
        let points = [
            dvec3(0.0, 0.0, 1.0),
            dvec3(4.0, 0.0, 1.0),
            dvec3(4.0, 2.0, 1.0),
            dvec3(0.0, 2.0, 1.0),
        ];
        assert_eq!(centroid_points(&points), dvec3(2.0, 1.0, 1.0));
        assert_eq!(
            bounding_box_xy(&points),
            Some((dvec3(0.0, 0.0, 0.0), dvec3(4.0, 2.0, 0.0)))
        );
        assert_eq!(bounding_box_xy(&[]), None);
    }
}
