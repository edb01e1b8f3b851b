//! Walks bounded by a second plane
//!
//! [`extract_until_plane`] walks every way out of the seed face and cuts each chain
//! where it first crosses a stop plane. [`extract_directional`] walks only the way
//! that heads along a caller-supplied direction, optionally bounded by a stop plane
//! too. Both return open chains starting at the cut plane's anchor point.

use super::{CrossSection, ExtractOptions, Termination, check_face, drive, seed_crossings};
use crate::classify::{EdgeClassification, classify_edge};
use crate::contour::Loop;
use crate::errors::ExtractionError;
use crate::float_types::Real;
use crate::mesh::MeshTopology;
use crate::path::path_length;
use crate::plane::Plane;
use crate::walker::{Frontier, TraversalContext};
use nalgebra::{Matrix4, Point3, Vector3};

/// Minimum cosine between the seed chord and the requested heading for the walk to
/// follow the chord's first end
pub const HEADING_THRESHOLD: Real = 0.1;

/// If the last segment of the chain meets `stop`, move its end onto the stop plane
/// and release the edge just crossed so a later direction may cross it again.
///
/// A segment that meets the stop plane at its start is dropped instead, leaving that
/// start as the end of the chain.
fn clip_at(stop: &Plane, ctx: &mut TraversalContext) -> Option<Termination> {
    let [.., a, b] = ctx.points[..] else {
        return None;
    };
    let hit = match classify_edge(&a, &b, stop, ctx.epsilon()) {
        EdgeClassification::Coplanar { b, .. } => b,
        other => other.point()?,
    };
    if (hit - a).norm() <= ctx.epsilon() {
        ctx.points.pop();
    } else if let Some(last) = ctx.points.last_mut() {
        *last = hit;
    }
    ctx.unvisit_last();
    Some(Termination::StopPlane)
}

/// Cut with the world-space `cut` plane from `seed` until each direction crosses the
/// world-space `stop` plane.
///
/// Of the chains that reach the stop plane the shortest (by length) is returned; when
/// none does, the chain ending closest to the stop plane is returned instead, with the
/// termination of its walk.
///
/// ## Errors
/// - [`ExtractionError::InsufficientSeedCrossings`] when no crossing of the seed face
///   leads into the mesh
/// - [`ExtractionError::SingularTransform`], [`ExtractionError::InvalidFace`] and the
///   walk errors
pub fn extract_until_plane<M: MeshTopology + ?Sized>(
    mesh: &M,
    world: &Matrix4<Real>,
    cut: &Plane,
    seed: usize,
    stop: &Plane,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    let plane = Plane::from_world(world, cut.point, cut.normal)?;
    let stop = Plane::from_world(world, stop.point, stop.normal)?;
    until_plane_local(mesh, &plane, seed, &stop, options)
}

/// [`extract_until_plane`] with both planes already in mesh-local space.
pub fn until_plane_local<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    stop: &Plane,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    options.validate()?;
    check_face(mesh, seed)?;
    let mut ctx = TraversalContext::new(options.epsilon, options.max_steps);
    let crossings = seed_crossings(mesh, plane, seed, &mut ctx);
    let starts: Vec<(Point3<Real>, Frontier)> = crossings
        .iter()
        .filter_map(|c| c.next.map(|next| (c.point, next)))
        .collect();
    if starts.is_empty() {
        return Err(ExtractionError::InsufficientSeedCrossings {
            face: seed,
            found: crossings.len(),
        });
    }

    // (length, chain) of the shortest chain reaching the stop plane, and
    // (distance to stop plane, chain, termination) of the best one that did not
    let mut arrived: Option<(Real, Vec<Point3<Real>>)> = None;
    let mut loose: Option<(Real, Vec<Point3<Real>>, Termination)> = None;
    for (point, start) in starts {
        ctx.points.push(plane.point);
        ctx.points.push(point);
        let (termination, _) = drive(mesh, plane, start, &mut ctx, |_, ctx| clip_at(stop, ctx))?;
        let chain = ctx.take_points();
        if termination == Termination::StopPlane {
            let length = path_length(&chain);
            if arrived.as_ref().is_none_or(|(best, _)| length < *best) {
                arrived = Some((length, chain));
            }
        } else {
            let distance = chain
                .last()
                .map_or(Real::INFINITY, |p| stop.signed_distance(p).abs());
            if loose.as_ref().is_none_or(|(best, ..)| distance < *best) {
                loose = Some((distance, chain, termination));
            }
        }
    }

    let (points, termination) = match (arrived, loose) {
        (Some((_, chain)), _) => (chain, Termination::StopPlane),
        (None, Some((distance, chain, termination))) => {
            log::debug!(
                "no direction from face {} reached the stop plane; best ends {} away",
                seed,
                distance
            );
            (chain, termination)
        },
        (None, None) => {
            return Err(ExtractionError::InsufficientSeedCrossings {
                face: seed,
                found: crossings.len(),
            });
        },
    };
    Ok(CrossSection {
        contour: Loop::open(points),
        termination,
        steps: ctx.steps(),
        plane: *plane,
    })
}

/// Cut with the world-space `cut` plane from `seed`, walking only the way that heads
/// along the world-space `direction`, optionally stopping at the world-space `stop`
/// plane.
///
/// The seed face must be crossed by exactly two of its edges. The walk follows the
/// first crossing when the chord from the second crossing to the first points along
/// `direction` (cosine above [`HEADING_THRESHOLD`]), the second one otherwise.
///
/// ## Errors
/// - [`ExtractionError::InsufficientSeedCrossings`] unless exactly two seed edges
///   cross the plane
/// - [`ExtractionError::SingularTransform`], [`ExtractionError::InvalidFace`] and the
///   walk errors
pub fn extract_directional<M: MeshTopology + ?Sized>(
    mesh: &M,
    world: &Matrix4<Real>,
    cut: &Plane,
    seed: usize,
    direction: &Vector3<Real>,
    stop: Option<&Plane>,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    let inverse = world.try_inverse().ok_or(ExtractionError::SingularTransform)?;
    let plane = Plane::from_world(world, cut.point, cut.normal)?;
    let stop = stop
        .map(|s| Plane::from_world(world, s.point, s.normal))
        .transpose()?;
    let heading = inverse.transform_vector(direction);
    directional_local(mesh, &plane, seed, &heading, stop.as_ref(), options)
}

/// [`extract_directional`] with every input already in mesh-local space.
pub fn directional_local<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    direction: &Vector3<Real>,
    stop: Option<&Plane>,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    options.validate()?;
    check_face(mesh, seed)?;
    let mut ctx = TraversalContext::new(options.epsilon, options.max_steps);
    let crossings: Vec<_> = seed_crossings(mesh, plane, seed, &mut ctx)
        .into_iter()
        .filter(|c| !matches!(c.next, Some(Frontier::Vertex(_))))
        .collect();
    let [first, second] = crossings[..] else {
        return Err(ExtractionError::InsufficientSeedCrossings {
            face: seed,
            found: crossings.len(),
        });
    };

    let chord = (first.point - second.point)
        .try_normalize(Real::EPSILON)
        .unwrap_or_else(Vector3::zeros);
    let heading = direction
        .try_normalize(Real::EPSILON)
        .unwrap_or_else(Vector3::zeros);
    let chosen = if chord.dot(&heading) > HEADING_THRESHOLD {
        first
    } else {
        second
    };
    log::debug!("walking from face {} through {:?}", seed, chosen.point);

    ctx.points.push(plane.point);
    ctx.points.push(chosen.point);
    let termination = match chosen.next {
        Some(start) => {
            let mut first_step = true;
            drive(mesh, plane, start, &mut ctx, |_, ctx| {
                // The first walked segment is never clipped
                if std::mem::take(&mut first_step) {
                    return None;
                }
                stop.and_then(|stop| clip_at(stop, ctx))
            })?
            .0
        },
        None => Termination::Boundary,
    };

    Ok(CrossSection {
        contour: Loop::open(ctx.take_points()),
        termination,
        steps: ctx.steps(),
        plane: *plane,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;

    fn mid_plane() -> Plane {
        Plane::new(Point3::new(0.5, 0.0, 0.5), Vector3::z()).unwrap()
    }

    #[test]
    fn stops_at_plane() {
        let grid = PolyMesh::grid(4.0, 1.0, 4, 1);
        let plane = Plane::new(Point3::new(1.5, 0.5, 0.0), Vector3::y()).unwrap();
        let stop = Plane::new(Point3::new(2.5, 0.0, 0.0), Vector3::x()).unwrap();
        let section = until_plane_local(&grid, &plane, 1, &stop, &ExtractOptions::default()).unwrap();
        assert_eq!(section.termination, Termination::StopPlane);
        let last = section.contour.points[section.contour.len() - 1];
        assert!((last.x - 2.5).abs() < 1e-12);
        assert_eq!(section.contour.points[0], plane.point);
    }

    #[test]
    fn seed_crossing_on_the_stop_plane_ends_the_chain() {
        let grid = PolyMesh::grid(4.0, 1.0, 4, 1);
        let plane = Plane::new(Point3::new(1.5, 0.5, 0.0), Vector3::y()).unwrap();
        let stop = Plane::new(Point3::new(2.0, 0.0, 0.0), Vector3::x()).unwrap();
        let section = until_plane_local(&grid, &plane, 1, &stop, &ExtractOptions::default()).unwrap();
        assert_eq!(section.termination, Termination::StopPlane);
        assert_eq!(
            section.contour.points,
            vec![Point3::new(1.5, 0.5, 0.0), Point3::new(2.0, 0.5, 0.0)]
        );
    }

    #[test]
    fn loose_chain_when_plane_is_missed() {
        let grid = PolyMesh::grid(4.0, 1.0, 4, 1);
        let plane = Plane::new(Point3::new(1.5, 0.5, 0.0), Vector3::y()).unwrap();
        let stop = Plane::new(Point3::new(9.0, 0.0, 0.0), Vector3::x()).unwrap();
        let section = until_plane_local(&grid, &plane, 1, &stop, &ExtractOptions::default()).unwrap();
        assert_eq!(section.termination, Termination::Boundary);
        let last = section.contour.points[section.contour.len() - 1];
        assert!((last.x - 4.0).abs() < 1e-12);
    }

    #[test]
    fn heading_picks_the_direction() {
        let cube = PolyMesh::cube(1.0);
        // Front face crossings: (1,0,0.5) first, (0,0,0.5) second
        let towards_x = directional_local(&cube, &mid_plane(), 2, &Vector3::x(), None, &ExtractOptions::default())
            .unwrap();
        assert_eq!(towards_x.contour.points[1], Point3::new(1.0, 0.0, 0.5));
        assert_eq!(towards_x.contour.points[2], Point3::new(1.0, 1.0, 0.5));

        let stop = Plane::new(Point3::new(0.5, 0.0, 0.0), Vector3::x()).unwrap();
        let towards_minus_x = directional_local(
            &cube,
            &mid_plane(),
            2,
            &-Vector3::x(),
            Some(&stop),
            &ExtractOptions::default(),
        )
        .unwrap();
        assert_eq!(towards_minus_x.termination, Termination::StopPlane);
        assert_eq!(
            towards_minus_x.contour.points,
            vec![
                Point3::new(0.5, 0.0, 0.5),
                Point3::new(0.0, 0.0, 0.5),
                Point3::new(0.0, 1.0, 0.5),
                Point3::new(0.5, 1.0, 0.5),
            ]
        );
    }
}
