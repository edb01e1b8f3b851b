//! Arc-length resampling of open and closed polylines

use crate::contour::Loop;
use crate::errors::LoopError;
use crate::float_types::Real;
use nalgebra::Point3;

/// Redistribute a polyline into `segments` equal-length pieces.
///
/// The chain is cyclic when its last connectivity pair closes onto index 0.
///
/// - Open chains return `segments + 1` points; the first and last are the input
///   endpoints exactly and point `i` lies at arc length `i / segments * L`.
/// - Cyclic chains return `segments` points and `segments` pairs. Point `i` lies at arc
///   length `(i + shift) / segments * L`, wrapped around the loop, so `shift` (usually
///   in `-1..=1`) slides the samples along the loop by a fraction of a segment.
///
/// `shift` is ignored for open chains.
///
/// ## Errors
/// - [`LoopError::TooFewPoints`] for fewer than two points
/// - [`LoopError::InvalidSegmentCount`] for `segments == 0`
pub fn resample(
    points: &[Point3<Real>],
    edges: &[(usize, usize)],
    segments: usize,
    shift: Real,
) -> Result<Loop, LoopError> {
    if points.len() < 2 {
        return Err(LoopError::TooFewPoints {
            needed: 2,
            found: points.len(),
        });
    }
    if segments == 0 {
        return Err(LoopError::InvalidSegmentCount);
    }
    // A lone pair (0, 1) is a two-point open chain, not a loop
    let cyclic = edges.len() > 1 && edges.last().is_some_and(|&(a, b)| a == 0 || b == 0);
    if !cyclic && shift != 0.0 {
        log::warn!("ignoring shift {} on an open chain", shift);
    }

    // Cumulative arc length at every point; a cyclic chain repeats point 0 at the end
    let mut path: Vec<Point3<Real>> = points.to_vec();
    if cyclic {
        path.push(points[0]);
    }
    let mut cumulative = Vec::with_capacity(path.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for w in path.windows(2) {
        total += (w[1] - w[0]).norm();
        cumulative.push(total);
    }

    let samples = if cyclic {
        (0..segments)
            .map(|i| {
                let s = (i as Real + shift) / segments as Real * total;
                point_at(&path, &cumulative, s.rem_euclid(total.max(Real::MIN_POSITIVE)))
            })
            .collect()
    } else {
        let mut samples: Vec<Point3<Real>> = (0..=segments)
            .map(|i| point_at(&path, &cumulative, i as Real / segments as Real * total))
            .collect();
        samples[0] = points[0];
        samples[segments] = points[points.len() - 1];
        samples
    };
    Ok(Loop::new(samples, cyclic))
}

/// The point at arc length `s` along `path`
fn point_at(path: &[Point3<Real>], cumulative: &[Real], s: Real) -> Point3<Real> {
    // Index of the first vertex strictly past `s`, kept inside the last segment
    let j = cumulative
        .partition_point(|&c| c <= s)
        .clamp(1, path.len() - 1);
    let (a, b) = (path[j - 1], path[j]);
    let span = cumulative[j] - cumulative[j - 1];
    if span <= 0.0 {
        return a;
    }
    a + (b - a) * ((s - cumulative[j - 1]) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Point3<Real>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn square_loop_into_eight() {
        let closed = Loop::closed(square());
        let out = resample(&closed.points, &closed.edges, 8, 0.0).unwrap();
        assert!(out.cyclic);
        assert_eq!(out.len(), 8);
        assert_eq!(out.edges.len(), 8);
        assert_relative_eq!(out.points[0], Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(out.points[1], Point3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(out.points[7], Point3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn shift_slides_samples() {
        let closed = Loop::closed(square());
        let out = resample(&closed.points, &closed.edges, 4, 0.5).unwrap();
        assert_relative_eq!(out.points[0], Point3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(out.points[3], Point3::new(0.0, 0.5, 0.0));
        let back = resample(&closed.points, &closed.edges, 4, -0.5).unwrap();
        assert_relative_eq!(back.points[0], Point3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn open_chain_keeps_endpoints() {
        let open = Loop::open(square());
        let out = resample(&open.points, &open.edges, 6, 0.7).unwrap();
        assert!(!out.cyclic);
        assert_eq!(out.len(), 7);
        assert_eq!(out.points[0], square()[0]);
        assert_eq!(out.points[6], square()[3]);
        assert_relative_eq!(out.points[3], Point3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn contract_violations() {
        assert_eq!(
            resample(&[Point3::origin()], &[], 4, 0.0),
            Err(LoopError::TooFewPoints { needed: 2, found: 1 })
        );
        let open = Loop::open(square());
        assert_eq!(
            resample(&open.points, &open.edges, 0, 0.0),
            Err(LoopError::InvalidSegmentCount)
        );
    }
}
