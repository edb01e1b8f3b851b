//! Geometry primitives shared by the walkers and the loop utilities
//!
//! Small, allocation-free vector and plane helpers. The 2D containment test goes
//! through `geo` so that polygon edge cases (points on the boundary, collinear runs)
//! follow one well-tested implementation.

use crate::float_types::Real;
use crate::plane::Plane;
use geo::{Contains, Coord, LineString, Polygon as GeoPolygon};
use nalgebra::{Point2, Point3, Vector3};

/// Orthogonal projection of `p` onto the infinite line through `a` and `b`.
///
/// Returns the projected point and its parameter `t` (`a + t (b - a)`); `t` in `[0, 1]`
/// means the projection lands on the segment. A zero-length line projects onto `a`
/// with `t = 0`.
pub fn closest_point_on_line(
    p: &Point3<Real>,
    a: &Point3<Real>,
    b: &Point3<Real>,
) -> (Point3<Real>, Real) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= Real::EPSILON * Real::EPSILON {
        return (*a, 0.0);
    }
    let t = (p - a).dot(&ab) / len_sq;
    (a + ab * t, t)
}

/// Closest point to `p` on the segment `a`-`b`
pub fn closest_point_on_segment(p: &Point3<Real>, a: &Point3<Real>, b: &Point3<Real>) -> Point3<Real> {
    let (_, t) = closest_point_on_line(p, a, b);
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Whether `p` lies on the segment `a`-`b` within `epsilon`
pub fn point_on_segment(p: &Point3<Real>, a: &Point3<Real>, b: &Point3<Real>, epsilon: Real) -> bool {
    (closest_point_on_segment(p, a, b) - p).norm() <= epsilon
}

/// Intersection of the infinite line through `a` and `b` with `plane`.
///
/// `None` when the line is parallel to the plane (within `epsilon`).
pub fn intersect_line_plane(
    a: &Point3<Real>,
    b: &Point3<Real>,
    plane: &Plane,
    epsilon: Real,
) -> Option<Point3<Real>> {
    let ab = b - a;
    let denom = plane.normal.dot(&ab);
    if denom.abs() <= epsilon {
        return None;
    }
    let t = -plane.signed_distance(a) / denom;
    Some(a + ab * t)
}

/// Unsigned distance from `p` to `plane`
#[inline]
pub fn distance_point_to_plane(p: &Point3<Real>, plane: &Plane) -> Real {
    plane.signed_distance(p).abs()
}

/// Closest points between the infinite lines `a1`-`a2` and `b1`-`b2`.
///
/// Returns `(on_a, on_b)`; the lines intersect when the two points coincide. `None`
/// for parallel or degenerate lines.
pub fn intersect_lines(
    a1: &Point3<Real>,
    a2: &Point3<Real>,
    b1: &Point3<Real>,
    b2: &Point3<Real>,
    epsilon: Real,
) -> Option<(Point3<Real>, Point3<Real>)> {
    let da = a2 - a1;
    let db = b2 - b1;
    let r = a1 - b1;
    let aa = da.dot(&da);
    let bb = db.dot(&db);
    let ab = da.dot(&db);
    let denom = aa * bb - ab * ab;
    if aa <= epsilon || bb <= epsilon || denom.abs() <= epsilon * aa * bb {
        return None;
    }
    let ar = da.dot(&r);
    let br = db.dot(&r);
    let s = (ab * br - bb * ar) / denom;
    let t = (aa * br - ab * ar) / denom;
    Some((a1 + da * s, b1 + db * t))
}

/// Point-in-polygon test in 2D; points on the boundary are outside.
pub fn point_in_polygon_2d(point: &Point2<Real>, polygon: &[Point2<Real>]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let ring: LineString<Real> = polygon
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    GeoPolygon::new(ring, vec![]).contains(&geo::Point::new(point.x, point.y))
}

/// Barycentric point-in-triangle test for a point already in the triangle's plane.
pub fn point_in_triangle(
    p: &Point3<Real>,
    a: &Point3<Real>,
    b: &Point3<Real>,
    c: &Point3<Real>,
) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d02 = v0.dot(&v2);
    let d11 = v1.dot(&v1);
    let d12 = v1.dot(&v2);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() <= Real::EPSILON {
        return false;
    }
    let u = (d11 * d02 - d01 * d12) / denom;
    let v = (d00 * d12 - d01 * d02) / denom;
    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

/// A deterministic orthonormal pair `(x, y)` spanning the plane with `normal`, such
/// that `x × y` points along `normal`.
pub fn plane_axes(normal: &Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let n = normal.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::z);
    // Seed with the world axis least aligned with the normal
    let seed = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
        Vector3::x()
    } else if n.y.abs() <= n.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let x = (seed - n * n.dot(&seed)).normalize();
    let y = n.cross(&x);
    (x, y)
}

/// Whether `point` falls inside the closed loop `points` after both are projected
/// into the plane through `points[0]` with `normal`.
pub fn point_in_loop(point: &Point3<Real>, points: &[Point3<Real>], normal: &Vector3<Real>) -> bool {
    let Some(origin) = points.first() else {
        return false;
    };
    let (x, y) = plane_axes(normal);
    let flatten = |p: &Point3<Real>| {
        let d = p - origin;
        Point2::new(d.dot(&x), d.dot(&y))
    };
    let polygon: Vec<Point2<Real>> = points.iter().map(flatten).collect();
    point_in_polygon_2d(&flatten(point), &polygon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn skew_lines_closest_points() {
        let (pa, pb) = intersect_lines(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.5, -1.0, 1.0),
            &Point3::new(0.5, 1.0, 1.0),
            1e-12,
        )
        .unwrap();
        assert_relative_eq!(pa, Point3::new(0.5, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(pb, Point3::new(0.5, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        assert!(
            intersect_lines(
                &Point3::origin(),
                &Point3::new(1.0, 0.0, 0.0),
                &Point3::new(0.0, 1.0, 0.0),
                &Point3::new(2.0, 1.0, 0.0),
                1e-12,
            )
            .is_none()
        );
    }

    #[test]
    fn projection_parameter() {
        let (p, t) = closest_point_on_line(
            &Point3::new(3.0, 1.0, 0.0),
            &Point3::origin(),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert_relative_eq!(t, 1.5);
        assert_relative_eq!(p, Point3::new(3.0, 0.0, 0.0));
        assert!(!point_on_segment(&Point3::new(3.0, 0.0, 0.0), &Point3::origin(), &Point3::new(2.0, 0.0, 0.0), 1e-9));
    }

    #[test]
    fn square_contains_centre() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(point_in_polygon_2d(&Point2::new(0.5, 0.5), &square));
        assert!(!point_in_polygon_2d(&Point2::new(1.5, 0.5), &square));
    }

    #[test]
    fn loop_in_tilted_plane() {
        let normal = Vector3::new(1.0, 1.0, 1.0);
        let (x, y) = plane_axes(&normal);
        assert_relative_eq!(x.dot(&y), 0.0, epsilon = 1e-12);
        assert!(x.cross(&y).dot(&normal) > 0.0);

        let centre = Point3::new(1.0, 2.0, 3.0);
        let ring: Vec<Point3<Real>> = (0..6)
            .map(|i| {
                let a = i as Real * crate::float_types::TAU / 6.0;
                centre + x * a.cos() + y * a.sin()
            })
            .collect();
        assert!(point_in_loop(&centre, &ring, &normal));
        assert!(!point_in_loop(&(centre + x * 2.0), &ring, &normal));
    }

    #[test]
    fn barycentric_triangle() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        assert!(point_in_triangle(&Point3::new(0.2, 0.2, 0.0), &a, &b, &c));
        assert!(!point_in_triangle(&Point3::new(0.8, 0.8, 0.0), &a, &b, &c));
    }
}
