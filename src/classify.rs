//! Plane-edge classification
//!
//! Every walk step reduces to one question: where does this edge meet the cutting plane?
//! [`classify_edge`] answers it with one of four outcomes.
//!
//! ## **Consistency across shared vertices**
//! The endpoint tests are made on the endpoints' own signed distances, never on the
//! interpolated parameter `t`. Two edges sharing a vertex therefore always agree on
//! whether that vertex lies on the plane, so a crossing through a vertex is reported
//! once as [`EdgeClassification::Point`] by both edges and never as a pair of
//! near-endpoint [`EdgeClassification::Cross`] hits.

use crate::float_types::Real;
use crate::plane::Plane;
use nalgebra::Point3;

/// Which end of a segment a [`EdgeClassification::Point`] hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    A,
    B,
}

/// Outcome tag of [`classify_edge`], without the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Cross,
    Point,
    Coplanar,
    None,
}

/// Result of testing one segment against a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeClassification {
    /// Interior crossing; `t` is strictly inside (0, 1)
    Cross { point: Point3<Real>, t: Real },
    /// The plane passes through one endpoint of the segment
    Point { point: Point3<Real>, endpoint: Endpoint },
    /// Both endpoints lie in the plane
    Coplanar { a: Point3<Real>, b: Point3<Real> },
    /// No intersection within the segment
    None,
}

impl EdgeClassification {
    pub const fn kind(&self) -> EdgeKind {
        match self {
            EdgeClassification::Cross { .. } => EdgeKind::Cross,
            EdgeClassification::Point { .. } => EdgeKind::Point,
            EdgeClassification::Coplanar { .. } => EdgeKind::Coplanar,
            EdgeClassification::None => EdgeKind::None,
        }
    }

    /// The single intersection point of a `Cross` or `Point` hit.
    pub fn point(&self) -> Option<Point3<Real>> {
        match self {
            EdgeClassification::Cross { point, .. } | EdgeClassification::Point { point, .. } => {
                Some(*point)
            },
            _ => None,
        }
    }

    /// True for `Cross` and `Point`: the plane meets the segment in exactly one point.
    pub const fn intersects(&self) -> bool {
        matches!(
            self,
            EdgeClassification::Cross { .. } | EdgeClassification::Point { .. }
        )
    }
}

/// Classify the segment `a`-`b` against `plane`.
///
/// # Parameters
/// - `a`, `b`: segment endpoints, in the plane's coordinate space
/// - `plane`: the cutting plane
/// - `epsilon`: distance under which a point counts as lying in the plane
///
/// # Returns
/// - `Coplanar` when the segment is parallel to the plane and `a` lies in it
/// - `Point` when exactly one endpoint lies in the plane
/// - `Cross` when the endpoints lie strictly on opposite sides
/// - `None` otherwise
///
/// # Example
/// ```
/// use contourcut::classify::{EdgeKind, classify_edge};
/// use contourcut::plane::Plane;
/// use nalgebra::{Point3, Vector3};
///
/// let plane = Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::z()).unwrap();
/// let hit = classify_edge(&Point3::new(1.0, 0.0, 0.0), &Point3::new(1.0, 0.0, 1.0), &plane, 1e-9);
/// assert_eq!(hit.kind(), EdgeKind::Cross);
/// assert_eq!(hit.point(), Some(Point3::new(1.0, 0.0, 0.5)));
/// ```
pub fn classify_edge(
    a: &Point3<Real>,
    b: &Point3<Real>,
    plane: &Plane,
    epsilon: Real,
) -> EdgeClassification {
    let da = plane.signed_distance(a);
    let db = plane.signed_distance(b);
    // Projection of AB onto the normal
    let projected = db - da;

    let a_on = da.abs() <= epsilon;
    let b_on = db.abs() <= epsilon;

    if projected.abs() <= epsilon {
        return if a_on {
            EdgeClassification::Coplanar { a: *a, b: *b }
        } else {
            EdgeClassification::None
        };
    }
    match (a_on, b_on) {
        (true, true) => EdgeClassification::Coplanar { a: *a, b: *b },
        (true, false) => EdgeClassification::Point {
            point: *a,
            endpoint: Endpoint::A,
        },
        (false, true) => EdgeClassification::Point {
            point: *b,
            endpoint: Endpoint::B,
        },
        (false, false) if da * db < 0.0 => {
            let t = da / (da - db);
            EdgeClassification::Cross {
                point: a + (b - a) * t,
                t,
            }
        },
        _ => EdgeClassification::None,
    }
}
