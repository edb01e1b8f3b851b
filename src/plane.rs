//! Cutting planes in mesh-local space
//!
//! A [`Plane`] is stored as a point on the plane plus a unit normal, which is the form
//! callers hand in (a click location and a view direction, or a ray hit and a tangent).
//! The implicit offset `w = n·p` is available through [`Plane::offset`].

use crate::errors::ExtractionError;
use crate::float_types::Real;
use nalgebra::{Matrix4, Point3, Vector3};

// Point classification constants
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// An oriented plane: every `x` with `normal · (x - point) = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    /// A point on the plane
    pub point: Point3<Real>,
    /// Unit normal vector of the plane
    pub normal: Vector3<Real>,
}

impl Plane {
    /// Create a plane through `point` with the given (not necessarily unit) normal.
    ///
    /// ## Errors
    /// [`ExtractionError::DegenerateNormal`] if `normal` has (numerically) zero length
    /// or is not finite.
    pub fn new(point: Point3<Real>, normal: Vector3<Real>) -> Result<Self, ExtractionError> {
        let length = normal.norm();
        if !length.is_finite() || length <= Real::EPSILON {
            return Err(ExtractionError::DegenerateNormal);
        }
        Ok(Plane {
            point,
            normal: normal / length,
        })
    }

    /// Create a plane from three points.
    /// The normal direction follows the right-hand rule: (p2-p1) × (p3-p1)
    pub fn from_points(
        p1: Point3<Real>,
        p2: Point3<Real>,
        p3: Point3<Real>,
    ) -> Result<Self, ExtractionError> {
        Self::new(p1, (p2 - p1).cross(&(p3 - p1)))
    }

    /// Convert a plane given in world space into the local space of an object whose
    /// local-to-world matrix is `world`.
    ///
    /// Points map through `world⁻¹`. Normals map through the inverse-transpose of that
    /// map, `(world⁻¹)⁻ᵀ = worldᵀ`, so non-uniform scale keeps the plane orientation
    /// correct.
    ///
    /// ## Errors
    /// - [`ExtractionError::SingularTransform`] if `world` cannot be inverted
    /// - [`ExtractionError::DegenerateNormal`] if the normal collapses
    pub fn from_world(
        world: &Matrix4<Real>,
        point: Point3<Real>,
        normal: Vector3<Real>,
    ) -> Result<Self, ExtractionError> {
        let inverse = world.try_inverse().ok_or(ExtractionError::SingularTransform)?;
        let local_point = inverse.transform_point(&point);
        let linear = world.fixed_view::<3, 3>(0, 0);
        let local_normal = linear.transpose() * normal;
        Self::new(local_point, local_normal)
    }

    /// Distance from the origin along the normal (plane equation: n·x = w)
    #[inline]
    pub fn offset(&self) -> Real {
        self.normal.dot(&self.point.coords)
    }

    /// Signed distance of `p`; positive on the side the normal points to.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<Real>) -> Real {
        self.normal.dot(&(p - self.point))
    }

    /// Orthogonal projection of `p` onto the plane
    pub fn project(&self, p: &Point3<Real>) -> Point3<Real> {
        p - self.normal * self.signed_distance(p)
    }

    /// Flip the plane orientation in place
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// The same plane moved `distance` along its normal
    pub fn nudged(&self, distance: Real) -> Plane {
        Plane {
            point: self.point + self.normal * distance,
            normal: self.normal,
        }
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] within `epsilon`.
    pub fn orient_point(&self, p: &Point3<Real>, epsilon: Real) -> i8 {
        let d = self.signed_distance(p);
        if d > epsilon {
            FRONT
        } else if d < -epsilon {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Classify a point set: [`SPANNING`] when it has points strictly on both sides,
    /// otherwise the union of its point classes.
    pub fn orient_points<'a, I>(&self, points: I, epsilon: Real) -> i8
    where
        I: IntoIterator<Item = &'a Point3<Real>>,
    {
        points
            .into_iter()
            .fold(COPLANAR, |acc, p| acc | self.orient_point(p, epsilon))
    }

    /// Transform the plane with a local-to-world `matrix`, the inverse of
    /// [`Plane::from_world`].
    pub fn transformed(&self, matrix: &Matrix4<Real>) -> Result<Plane, ExtractionError> {
        let inverse = matrix.try_inverse().ok_or(ExtractionError::SingularTransform)?;
        let linear = inverse.fixed_view::<3, 3>(0, 0);
        Plane::new(matrix.transform_point(&self.point), linear.transpose() * self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_normal_is_rejected() {
        let err = Plane::new(Point3::origin(), Vector3::zeros()).unwrap_err();
        assert_eq!(err, ExtractionError::DegenerateNormal);
    }

    #[test]
    fn world_plane_with_non_uniform_scale() {
        // Object scaled 2x along x: a world plane tilted 45° about z must stay
        // perpendicular to the same world direction once brought into local space.
        let world = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let normal = Vector3::new(1.0, 1.0, 0.0);
        let plane = Plane::from_world(&world, Point3::new(2.0, 0.0, 0.0), normal).unwrap();

        assert_relative_eq!(plane.point, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        // Local points on the world plane: world x + y = 2 -> 2 lx + ly = 2
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 2.0, 0.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.5, 1.0, 3.0)), 0.0, epsilon = 1e-12);

        let back = plane.transformed(&world).unwrap();
        assert_relative_eq!(back.normal, normal.normalize(), epsilon = 1e-12);
    }

    #[test]
    fn singular_world_matrix() {
        let world = Matrix4::new_nonuniform_scaling(&Vector3::new(0.0, 1.0, 1.0));
        assert_eq!(
            Plane::from_world(&world, Point3::origin(), Vector3::z()),
            Err(ExtractionError::SingularTransform)
        );
    }

    #[test]
    fn orient_points_spanning() {
        let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        let pts = [Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0)];
        assert_eq!(plane.orient_points(&pts, 1e-9), SPANNING);
        assert_eq!(plane.orient_points(&pts[..1], 1e-9), BACK);
        assert_eq!(plane.orient_point(&Point3::new(5.0, 1.0, 0.0), 1e-9), COPLANAR);
    }
}
