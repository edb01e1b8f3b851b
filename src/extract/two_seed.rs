//! Cross sections between two seed faces
//!
//! Typical use: the user clicks twice on the surface and wants the section running
//! from the first click to the second. Every way out of the first seed face is walked
//! until it arrives on the second seed face; the shortest arriving chain wins and is
//! framed by the two hit points.

use super::{CrossSection, ExtractOptions, Termination, check_face, drive, local_point, seed_crossings};
use crate::contour::Loop;
use crate::errors::ExtractionError;
use crate::float_types::Real;
use crate::mesh::MeshTopology;
use crate::plane::Plane;
use crate::walker::{Frontier, TraversalContext};
use nalgebra::{Matrix4, Point3};

/// A point on the surface together with the face it lies on, e.g. a ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedHit {
    pub face: usize,
    pub point: Point3<Real>,
}

impl SeedHit {
    pub const fn new(face: usize, point: Point3<Real>) -> Self {
        SeedHit { face, point }
    }
}

/// Cut from seed `a` to seed `b` with the world-space `cut` plane. Seeds are given in
/// world space as well; the result is open and in local space.
///
/// ## Errors
/// - [`ExtractionError::SecondSeedUnreached`] when no walk from `a` arrives on `b`
/// - [`ExtractionError::SingularTransform`], [`ExtractionError::InvalidFace`] and the
///   walk errors
pub fn extract_between_seeds<M: MeshTopology + ?Sized>(
    mesh: &M,
    world: &Matrix4<Real>,
    cut: &Plane,
    a: SeedHit,
    b: SeedHit,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    let plane = Plane::from_world(world, cut.point, cut.normal)?;
    let a = SeedHit::new(a.face, local_point(world, &a.point)?);
    let b = SeedHit::new(b.face, local_point(world, &b.point)?);
    between_seeds_local(mesh, &plane, a, b, options)
}

/// [`extract_between_seeds`] with the plane and seeds already in mesh-local space.
pub fn between_seeds_local<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    a: SeedHit,
    b: SeedHit,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    options.validate()?;
    check_face(mesh, a.face)?;
    check_face(mesh, b.face)?;
    if a.face == b.face {
        return Ok(CrossSection {
            contour: Loop::open(vec![a.point, b.point]),
            termination: Termination::SecondSeed,
            steps: 0,
            plane: *plane,
        });
    }

    let mut ctx = TraversalContext::new(options.epsilon, options.max_steps);
    let target = Frontier::Face(b.face);
    let mut best: Option<Vec<Point3<Real>>> = None;
    for crossing in seed_crossings(mesh, plane, a.face, &mut ctx) {
        let Some(start) = crossing.next else {
            continue;
        };
        ctx.points.push(a.point);
        ctx.points.push(crossing.point);
        let reached = start == target || {
            let (termination, _) = drive(mesh, plane, start, &mut ctx, |next, _| {
                (next == Some(target)).then_some(Termination::SecondSeed)
            })?;
            termination == Termination::SecondSeed
        };
        let mut chain = ctx.take_points();
        if !reached {
            log::trace!("direction through {:?} missed face {}", start, b.face);
            continue;
        }
        chain.push(b.point);
        if best.as_ref().is_none_or(|current| chain.len() < current.len()) {
            best = Some(chain);
        }
    }

    let points = best.ok_or(ExtractionError::SecondSeedUnreached {
        from: a.face,
        to: b.face,
    })?;
    log::debug!(
        "face {} reaches face {} with {} points",
        a.face,
        b.face,
        points.len()
    );
    Ok(CrossSection {
        contour: Loop::open(points),
        termination: Termination::SecondSeed,
        steps: ctx.steps(),
        plane: *plane,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;
    use nalgebra::Vector3;

    #[test]
    fn neighbouring_faces() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
        let a = SeedHit::new(2, Point3::new(0.5, 0.0, 0.5));
        let b = SeedHit::new(5, Point3::new(1.0, 0.5, 0.5));
        let section = between_seeds_local(&cube, &plane, a, b, &ExtractOptions::default()).unwrap();
        assert_eq!(section.termination, Termination::SecondSeed);
        assert_eq!(
            section.contour.points,
            vec![a.point, Point3::new(1.0, 0.0, 0.5), b.point]
        );
    }

    #[test]
    fn opposite_faces_take_the_short_way() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
        let a = SeedHit::new(2, Point3::new(0.5, 0.0, 0.5));
        let b = SeedHit::new(3, Point3::new(0.5, 1.0, 0.5));
        let section = between_seeds_local(&cube, &plane, a, b, &ExtractOptions::default()).unwrap();
        // seed point, two corners, seed point
        assert_eq!(section.contour.len(), 4);
        assert_eq!(section.contour.points[0], a.point);
        assert_eq!(section.contour.points[3], b.point);
    }

    #[test]
    fn same_face_is_a_segment() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
        let a = SeedHit::new(2, Point3::new(0.25, 0.0, 0.5));
        let b = SeedHit::new(2, Point3::new(0.75, 0.0, 0.5));
        let section = between_seeds_local(&cube, &plane, a, b, &ExtractOptions::default()).unwrap();
        assert_eq!(section.contour.points, vec![a.point, b.point]);
        assert_eq!(section.steps, 0);
    }
}
