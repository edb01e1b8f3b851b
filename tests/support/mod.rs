//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use contourcut::{float_types::Real, mesh::PolyMesh, plane::Plane};
use nalgebra::{Point3, Vector3};

/// Returns the bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]` of a point set.
pub fn bounding_box(points: &[Point3<Real>]) -> [Real; 6] {
    let mut bounds = [
        Real::MAX,
        Real::MAX,
        Real::MAX,
        Real::MIN,
        Real::MIN,
        Real::MIN,
    ];
    for p in points {
        for axis in 0..3 {
            bounds[axis] = bounds[axis].min(p[axis]);
            bounds[axis + 3] = bounds[axis + 3].max(p[axis]);
        }
    }
    bounds
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Whether every point lies within `eps` of `plane`.
pub fn all_on_plane(points: &[Point3<Real>], plane: &Plane, eps: Real) -> bool {
    points.iter().all(|p| plane.signed_distance(p).abs() < eps)
}

/// `n` points evenly spaced counter-clockwise on a circle of `radius` at height `z`.
pub fn circle(n: usize, radius: Real, z: Real) -> Vec<Point3<Real>> {
    (0..n)
        .map(|i| {
            let a = contourcut::float_types::TAU * i as Real / n as Real;
            Point3::new(radius * a.cos(), radius * a.sin(), z)
        })
        .collect()
}

/// `mesh` next to a copy of itself moved `dx` along X; the copy's faces follow the
/// original's, so face `f` of the copy is `f + mesh.face_count()`.
pub fn side_by_side(mesh: &PolyMesh, dx: Real) -> PolyMesh {
    mesh.merged(&mesh.translated(Vector3::new(dx, 0.0, 0.0)))
        .expect("merging two valid meshes")
}

/// Whether four points, in order, are the corners of a unit square.
pub fn is_unit_square(points: &[Point3<Real>], eps: Real) -> bool {
    points.len() == 4
        && (0..4).all(|i| {
            let side = (points[(i + 1) % 4] - points[i]).norm();
            let diagonal = (points[(i + 2) % 4] - points[i]).norm();
            approx_eq(side, 1.0, eps) && approx_eq(diagonal, Real::sqrt(2.0), eps)
        })
}
