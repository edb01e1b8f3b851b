//! Correspondence between two loops of equal length
//!
//! Before two cross sections can be bridged by a strip of quads, point `i` of one
//! must face point `i` of the other. [`align`] makes the candidate run the same way
//! around as the reference and, for closed loops, picks the circular shift that
//! minimises the total distance between corresponding points.

use crate::contour::Loop;
use crate::errors::LoopError;
use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// A candidate loop reordered to match a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub contour: Loop,
    /// Whether the candidate's direction was reversed
    pub reversed: bool,
    /// Circular shift applied after any reversal; point `shift` of the (reversed)
    /// candidate became point 0
    pub shift: usize,
    /// Sum of distances between corresponding points after alignment
    pub residual: Real,
}

/// Total signed turning of a loop about `axis`.
///
/// Each edge vector is projected into the plane perpendicular to `axis`, and the
/// signed angles between consecutive projected edges (positive counter-clockwise seen
/// from the tip of `axis`) are summed, wrapping around the loop. A simple loop winds
/// `±TAU`; the sign gives its direction. A duplicated closing point is ignored.
///
/// `None` for fewer than three points.
pub fn discrete_curl(points: &[Point3<Real>], axis: &Vector3<Real>) -> Option<Real> {
    let closed = points.len() > 1 && points.first() == points.last();
    let n = if closed { points.len() - 1 } else { points.len() };
    if n < 3 {
        return None;
    }
    let z = axis.try_normalize(Real::EPSILON)?;
    let flatten = |v: Vector3<Real>| v - z * z.dot(&v);

    let mut curl = 0.0;
    for b in 0..n {
        let a = (b + n - 1) % n;
        let c = (b + 1) % n;
        let t0 = flatten(points[b] - points[a]);
        let t1 = flatten(points[c] - points[b]);
        if t0.norm() <= Real::EPSILON || t1.norm() <= Real::EPSILON {
            continue;
        }
        let angle = t0.angle(&t1);
        curl += if t0.cross(&t1).dot(&z) < 0.0 { -angle } else { angle };
    }
    Some(curl)
}

/// Align `candidate` to `reference`.
///
/// The result takes its cyclic flag from `reference`.
///
/// - Closed: the candidate is reversed when its [`discrete_curl`] about the shared
///   axis has the opposite sign to the reference's, then every circular shift is
///   scored by the summed distance between corresponding points and the lowest score
///   (first on ties) is applied.
/// - Open: the candidate is reversed when its end-to-end displacement opposes the
///   reference's; no shift is applied.
///
/// ## Errors
/// [`LoopError::LengthMismatch`] when the loops have different point counts.
pub fn align(reference: &Loop, candidate: &Loop) -> Result<Alignment, LoopError> {
    let n = reference.len();
    if candidate.len() != n {
        return Err(LoopError::LengthMismatch {
            expected: n,
            found: candidate.len(),
        });
    }
    let target = &reference.points;
    let mut points = candidate.points.clone();
    let mut reversed = false;
    let mut shift = 0;

    if reference.cyclic {
        let axis = shared_axis(target, &points);
        if let (Some(a), Some(b)) = (discrete_curl(target, &axis), discrete_curl(&points, &axis)) {
            if a * b < 0.0 {
                log::debug!("curls {} and {} disagree; reversing candidate", a, b);
                points.reverse();
                reversed = true;
            }
        }
        let mut best = Real::INFINITY;
        for s in 0..n {
            let score = residual(target, &points, s);
            if score < best {
                best = score;
                shift = s;
            }
        }
        points.rotate_left(shift);
    } else if n >= 2 {
        let span_ref = target[n - 1] - target[0];
        let span_candidate = points[n - 1] - points[0];
        if span_ref.dot(&span_candidate) < 0.0 {
            points.reverse();
            reversed = true;
        }
    }

    let residual = residual(target, &points, 0);
    Ok(Alignment {
        contour: Loop::new(points, reference.cyclic),
        reversed,
        shift,
        residual,
    })
}

/// `Σ |b[(i + shift) % n] - a[i]|`
fn residual(a: &[Point3<Real>], b: &[Point3<Real>], shift: usize) -> Real {
    let n = a.len();
    (0..n).map(|i| (b[(i + shift) % n] - a[i]).norm()).sum()
}

/// Normal of the plane through the first three points, or the Newell normal of the
/// whole loop when those are collinear
fn loop_normal(points: &[Point3<Real>]) -> Vector3<Real> {
    if points.len() >= 3 {
        let n = (points[1] - points[0]).cross(&(points[2] - points[1]));
        if let Some(unit) = n.try_normalize(Real::EPSILON) {
            return unit;
        }
    }
    let mut normal = Vector3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::z)
}

/// Average of the two loop normals after flipping the second onto the first's side
fn shared_axis(a: &[Point3<Real>], b: &[Point3<Real>]) -> Vector3<Real> {
    let na = loop_normal(a);
    let mut nb = loop_normal(b);
    if na.dot(&nb) < 0.0 {
        nb = -nb;
    }
    (na + nb).try_normalize(Real::EPSILON).unwrap_or(na)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::TAU;
    use approx::assert_relative_eq;

    fn hexagon(z: Real) -> Loop {
        Loop::closed(
            (0..6)
                .map(|i| {
                    let a = i as Real * TAU / 6.0;
                    Point3::new(a.cos(), a.sin(), z)
                })
                .collect(),
        )
    }

    #[test]
    fn curl_sign_follows_direction() {
        let ccw = hexagon(0.0);
        let curl = discrete_curl(&ccw.points, &Vector3::z()).unwrap();
        assert_relative_eq!(curl, TAU, epsilon = 1e-9);
        let cw = discrete_curl(&ccw.reversed().points, &Vector3::z()).unwrap();
        assert_relative_eq!(cw, -TAU, epsilon = 1e-9);
        assert!(discrete_curl(&ccw.points[..2], &Vector3::z()).is_none());
    }

    #[test]
    fn recovers_rotation() {
        let reference = hexagon(0.0);
        let candidate = hexagon(1.0).rotated(2);
        let aligned = align(&reference, &candidate).unwrap();
        assert!(!aligned.reversed);
        assert_eq!(aligned.shift, 4);
        assert_relative_eq!(aligned.residual, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn reverses_opposite_winding() {
        let reference = hexagon(0.0);
        let aligned = align(&reference, &reference.reversed()).unwrap();
        assert!(aligned.reversed);
        assert_eq!(aligned.shift, 0);
        assert_relative_eq!(aligned.residual, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn open_chains_only_flip() {
        let reference = Loop::open(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
        let aligned = align(&reference, &reference.reversed()).unwrap();
        assert!(aligned.reversed);
        assert_eq!(aligned.shift, 0);
        assert_eq!(aligned.contour, reference);
    }

    #[test]
    fn length_mismatch() {
        assert_eq!(
            align(&hexagon(0.0), &Loop::closed(vec![Point3::origin(); 5])),
            Err(LoopError::LengthMismatch { expected: 6, found: 5 })
        );
    }
}
