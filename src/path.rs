//! Polyline helpers for cross sections after extraction
//!
//! Everything here works on plain point slices: a path is open unless a function takes
//! a `cyclic` flag. These are the small operations an interactive tool runs between
//! cuts: measuring, smoothing, blending two paths and finding where paths meet.

use crate::classify::{EdgeClassification, classify_edge};
use crate::errors::LoopError;
use crate::float_types::{PI, Real};
use crate::geometry::{closest_point_on_line, intersect_lines, plane_axes};
use crate::plane::Plane;
use nalgebra::{Matrix3, Point3, Rotation3, SymmetricEigen, Unit, Vector3};

/// Blend weight pulled towards the neighbours' midpoint by [`relax`].
pub const DEFAULT_RELAX_FACTOR: Real = 0.75;

/// Sum of segment lengths of an open path
pub fn path_length(points: &[Point3<Real>]) -> Real {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Mean of `points`; `None` when empty
pub fn center_of_mass(points: &[Point3<Real>]) -> Option<Point3<Real>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as Real))
}

/// Mean distance from `center` to `points`, 0 when empty
pub fn approx_radius(points: &[Point3<Real>], center: &Point3<Real>) -> Real {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| (p - center).norm()).sum::<Real>() / points.len() as Real
}

/// One Laplacian smoothing pass.
///
/// Every interior point moves `factor` of the way towards the midpoint of its two
/// neighbours, all computed from the unsmoothed positions. The ends stay put. Paths of
/// fewer than four points come back unchanged.
pub fn relax(points: &[Point3<Real>], factor: Real) -> Vec<Point3<Real>> {
    let mut relaxed = points.to_vec();
    if points.len() < 4 {
        log::debug!("not relaxing a path of {} points", points.len());
        return relaxed;
    }
    for i in 1..points.len() - 1 {
        let midpoint = points[i - 1] + (points[i + 1] - points[i - 1]) * 0.5;
        relaxed[i] = points[i] + (midpoint - points[i]) * factor;
    }
    relaxed
}

/// Whether [`intersect_path_plane`] stops at the first crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntersectMode {
    #[default]
    First,
    All,
}

/// Where the open path `points` meets `plane`, in path order.
///
/// A crossing exactly at a shared vertex is reported once. A segment lying in the
/// plane contributes its start. Pass a closed loop with its first point repeated at the
/// end to include the closing segment.
pub fn intersect_path_plane(
    points: &[Point3<Real>],
    plane: &Plane,
    mode: IntersectMode,
    epsilon: Real,
) -> Vec<Point3<Real>> {
    let mut hits: Vec<Point3<Real>> = Vec::new();
    for w in points.windows(2) {
        let hit = match classify_edge(&w[0], &w[1], plane, epsilon) {
            EdgeClassification::Coplanar { a, .. } => Some(a),
            other => other.point(),
        };
        let Some(hit) = hit else { continue };
        if hits.last().is_some_and(|last| (last - hit).norm() <= epsilon) {
            continue;
        }
        hits.push(hit);
        if mode == IntersectMode::First {
            break;
        }
    }
    hits
}

/// A meeting of two paths found by [`intersect_paths`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathHit {
    pub point: Point3<Real>,
    /// Segment `i` of the first path runs from point `i` to point `i + 1` (wrapping when cyclic)
    pub segment_a: usize,
    pub segment_b: usize,
}

/// Segment pairs of two paths that cross.
///
/// Two segments cross when the closest points of their supporting lines are within
/// `threshold` of each other and lie strictly inside both segments; the hit point is
/// their midpoint. Each segment takes part in at most one hit, the first found.
pub fn intersect_paths(
    a: &[Point3<Real>],
    b: &[Point3<Real>],
    cyclic_a: bool,
    cyclic_b: bool,
    threshold: Real,
) -> Vec<PathHit> {
    let segments = |path: &[Point3<Real>], cyclic: bool| -> Vec<(usize, Point3<Real>, Point3<Real>)> {
        let n = path.len();
        let count = match n {
            0 | 1 => 0,
            _ if cyclic => n,
            _ => n - 1,
        };
        (0..count).map(|i| (i, path[i], path[(i + 1) % n])).collect()
    };
    let (segments_a, segments_b) = (segments(a, cyclic_a), segments(b, cyclic_b));

    let mut hits: Vec<PathHit> = Vec::new();
    for &(i, a0, a1) in &segments_a {
        for &(j, b0, b1) in &segments_b {
            if hits.iter().any(|h| h.segment_a == i || h.segment_b == j) {
                continue;
            }
            let Some((on_a, on_b)) = intersect_lines(&a0, &a1, &b0, &b1, Real::EPSILON) else {
                continue;
            };
            if (on_b - on_a).norm() >= threshold {
                continue;
            }
            let (_, ta) = closest_point_on_line(&on_a, &a0, &a1);
            let (_, tb) = closest_point_on_line(&on_b, &b0, &b1);
            if ta <= 0.0 || ta >= 1.0 || tb <= 0.0 || tb >= 1.0 {
                continue;
            }
            hits.push(PathHit {
                point: on_a + (on_b - on_a) * 0.5,
                segment_a: i,
                segment_b: j,
            });
        }
    }
    hits
}

/// Rotate, scale and translate `points` so the path runs from `start` to `end`.
///
/// The end-to-end vector of the path is rotated onto `end - start` and scaled to its
/// length, with the first point landing on `start`. Paths shorter than three points or
/// with coincident ends come back unchanged.
pub fn fit_path_to_endpoints(
    points: &[Point3<Real>],
    start: &Point3<Real>,
    end: &Point3<Real>,
) -> Vec<Point3<Real>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let origin = points[0];
    let initial = points[points.len() - 1] - origin;
    let target = end - start;
    if initial.norm() < 1e-7 {
        return points.to_vec();
    }
    let scale = target.norm() / initial.norm();
    let rotation = Rotation3::rotation_between(&initial, &target).unwrap_or_else(|| {
        // Opposite directions: half turn about any perpendicular axis
        let (axis, _) = plane_axes(&initial);
        Rotation3::from_axis_angle(&Unit::new_normalize(axis), PI)
    });
    points
        .iter()
        .map(|p| start + rotation * (p - origin) * scale)
        .collect()
}

/// Point-by-point blend: `a + t (b - a)`.
///
/// ## Errors
/// [`LoopError::LengthMismatch`] when the paths differ in length.
pub fn mix_paths(
    a: &[Point3<Real>],
    b: &[Point3<Real>],
    t: Real,
) -> Result<Vec<Point3<Real>>, LoopError> {
    if a.len() != b.len() {
        return Err(LoopError::LengthMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(p, q)| p + (q - p) * t).collect())
}

/// Least-squares plane through `points`.
///
/// The plane passes through the centroid; its normal is the eigenvector of the
/// covariance matrix with the smallest eigenvalue. `None` for fewer than three points.
pub fn best_fit_plane(points: &[Point3<Real>]) -> Option<Plane> {
    if points.len() < 3 {
        return None;
    }
    let center = center_of_mass(points)?;
    let covariance = points.iter().fold(Matrix3::zeros(), |acc, p| {
        let d = p - center;
        acc + d * d.transpose()
    });
    let eigen = SymmetricEigen::new(covariance);
    let smallest = eigen.eigenvalues.imin();
    let normal: Vector3<Real> = eigen.eigenvectors.column(smallest).into_owned();
    Plane::new(center, normal).ok()
}
