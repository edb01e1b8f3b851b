//! Iterative feature-point simplification of polylines
//!
//! A Douglas–Peucker variant that refines breadth-first: every pass looks at each
//! interval between two kept points and keeps the interior point that deviates most
//! from the interval's chord, provided the deviation reaches the threshold. Passes
//! repeat until one adds nothing.

use crate::float_types::Real;
use crate::geometry::closest_point_on_segment;
use nalgebra::Point3;

/// How far a point is from the chord `a`-`b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviationMetric {
    /// Euclidean distance to the chord segment
    Perpendicular,
    /// `|p - a| * sin(angle between a->b and a->p)`, the altitude above the chord's
    /// supporting line measured from `a`
    #[default]
    Altitude,
}

impl DeviationMetric {
    pub fn deviation(&self, p: &Point3<Real>, a: &Point3<Real>, b: &Point3<Real>) -> Real {
        match self {
            DeviationMetric::Perpendicular => (closest_point_on_segment(p, a, b) - p).norm(),
            DeviationMetric::Altitude => {
                let chord = b - a;
                let arm = p - a;
                if arm.norm() == 0.0 {
                    return 0.0;
                }
                if chord.norm() == 0.0 {
                    return arm.norm();
                }
                chord.angle(&arm).sin() * arm.norm()
            },
        }
    }
}

/// Indices of the points of `points` worth keeping, ascending.
///
/// The first and last index are always kept. A point is added when its deviation
/// from the chord of the kept interval around it is the interval's largest (first one
/// on ties) and reaches `error`. A non-positive `error` keeps only the endpoints;
/// fewer than three points are returned whole.
///
/// ```
/// use contourcut::simplify::{DeviationMetric, simplify};
/// use nalgebra::Point3;
///
/// let zigzag = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.5, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
/// ];
/// assert_eq!(simplify(&zigzag, 0.1, DeviationMetric::Perpendicular), vec![0, 2, 3]);
/// ```
pub fn simplify(points: &[Point3<Real>], error: Real, metric: DeviationMetric) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }
    let mut kept = vec![0, n - 1];
    if error <= 0.0 {
        return kept;
    }

    loop {
        let added: Vec<usize> = kept
            .windows(2)
            .filter_map(|w| farthest_in_interval(points, w[0], w[1], error, metric))
            .collect();
        if added.is_empty() {
            break;
        }
        kept.extend(added);
        kept.sort_unstable();
    }
    log::trace!("simplified {} points to {}", n, kept.len());
    kept
}

/// The interior index between `start` and `end` of largest deviation, if it reaches
/// `error`
fn farthest_in_interval(
    points: &[Point3<Real>],
    start: usize,
    end: usize,
    error: Real,
    metric: DeviationMetric,
) -> Option<usize> {
    let (a, b) = (&points[start], &points[end]);
    let mut best: Option<(usize, Real)> = None;
    for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
        let deviation = metric.deviation(p, a, b);
        if best.is_none_or(|(_, d)| deviation > d) {
            best = Some((i, deviation));
        }
    }
    best.filter(|&(_, d)| d >= error).map(|(i, _)| i)
}
