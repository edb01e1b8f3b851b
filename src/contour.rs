//! `Loop`: an ordered cross-section polyline, open or closed

use crate::float_types::Real;
use nalgebra::{Matrix4, Point3};

/// Ordered points plus explicit connectivity.
///
/// A cyclic loop with N points has N pairs `(i, (i + 1) % N)`; an open chain with N
/// points has N - 1 pairs `(i, i + 1)`. Use [`Loop::open`] / [`Loop::closed`] to keep
/// the two in step.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loop {
    pub points: Vec<Point3<Real>>,
    pub edges: Vec<(usize, usize)>,
    pub cyclic: bool,
}

impl Loop {
    /// An open chain through `points`
    pub fn open(points: Vec<Point3<Real>>) -> Self {
        let edges = (1..points.len()).map(|i| (i - 1, i)).collect();
        Loop {
            points,
            edges,
            cyclic: false,
        }
    }

    /// A closed loop through `points`
    pub fn closed(points: Vec<Point3<Real>>) -> Self {
        let n = points.len();
        let edges = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Loop {
            points,
            edges,
            cyclic: true,
        }
    }

    pub fn new(points: Vec<Point3<Real>>, cyclic: bool) -> Self {
        if cyclic {
            Self::closed(points)
        } else {
            Self::open(points)
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether `edges` matches the canonical connectivity for `points` and `cyclic`
    pub fn is_consistent(&self) -> bool {
        let n = self.points.len();
        let expected = if self.cyclic { n } else { n.saturating_sub(1) };
        self.edges.len() == expected
            && self.edges.iter().enumerate().all(|(i, &(a, b))| {
                a == i && b == if self.cyclic { (i + 1) % n } else { i + 1 }
            })
    }

    /// Total length along the connectivity, including the closing segment of a cyclic loop
    pub fn length(&self) -> Real {
        self.edges
            .iter()
            .map(|&(a, b)| (self.points[b] - self.points[a]).norm())
            .sum()
    }

    /// Same loop with point order reversed
    pub fn reversed(&self) -> Loop {
        let mut points = self.points.clone();
        points.reverse();
        Loop::new(points, self.cyclic)
    }

    /// Rotate a closed loop so that point `shift` becomes point 0.
    /// Open chains are returned unchanged.
    pub fn rotated(&self, shift: usize) -> Loop {
        if !self.cyclic || self.points.is_empty() {
            return self.clone();
        }
        let mut points = self.points.clone();
        points.rotate_left(shift % self.points.len());
        Loop::closed(points)
    }

    /// Map every point through `matrix`, e.g. to bring a local-space section back to
    /// world space.
    pub fn transformed(&self, matrix: &Matrix4<Real>) -> Loop {
        Loop {
            points: self.points.iter().map(|p| matrix.transform_point(p)).collect(),
            edges: self.edges.clone(),
            cyclic: self.cyclic,
        }
    }
}
