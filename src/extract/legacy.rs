//! First-crossing policy
//!
//! The seed face must be crossed exactly twice (edge crossings and on-plane vertices
//! both count). Direction A is walked with [`walker::step`](crate::walker::step) until
//! it arrives at the element direction B would start from, which closes the loop.
//! Otherwise direction B is walked too and the two halves are joined into an open
//! chain running from the end of A, through the seed, to the end of B.
//!
//! Arriving there with fewer than three points on the loop is not a closure: it means
//! A slipped back across the seed, and A is treated as a dead end.

use super::{CrossSection, ExtractOptions, Termination, drive, open_termination, seed_crossings};
use crate::contour::Loop;
use crate::errors::ExtractionError;
use crate::mesh::MeshTopology;
use crate::plane::Plane;
use crate::walker::{Frontier, TraversalContext};

/// Single-seed extraction with [`TraversalPolicy::Legacy`](super::TraversalPolicy::Legacy)
/// in mesh-local space.
///
/// ## Errors
/// - [`ExtractionError::InsufficientSeedCrossings`] unless the seed face has exactly
///   two crossings
/// - [`ExtractionError::AmbiguousCoplanarFace`] and
///   [`ExtractionError::BudgetExceeded`] from the walk
pub fn extract<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    let mut ctx = TraversalContext::new(options.epsilon, options.max_steps);
    let crossings = seed_crossings(mesh, plane, seed, &mut ctx);
    let [first, second] = crossings[..] else {
        return Err(ExtractionError::InsufficientSeedCrossings {
            face: seed,
            found: crossings.len(),
        });
    };

    ctx.points.push(first.point);
    let end_a = match first.next {
        Some(start) => {
            let target = second.next;
            let owed = usize::from(owes_second_point(target));
            drive(mesh, plane, start, &mut ctx, |next, ctx| {
                if next.is_none() || next != target {
                    return None;
                }
                if ctx.points.len() + owed >= 3 {
                    Some(Termination::Closed)
                } else {
                    log::debug!("walk from face {} came back after {} points", seed, ctx.points.len());
                    if owed == 0 {
                        // Direction B starts on that vertex again
                        ctx.points.pop();
                    }
                    Some(Termination::DeadEnd)
                }
            })?
            .0
        },
        None => Termination::Boundary,
    };
    let mut points = ctx.take_points();

    if end_a == Termination::Closed {
        if owes_second_point(second.next) {
            points.push(second.point);
        }
        log::debug!("legacy walk from face {} closed after {} points", seed, points.len());
        return Ok(CrossSection {
            contour: Loop::closed(points),
            termination: Termination::Closed,
            steps: ctx.steps(),
            plane: *plane,
        });
    }

    ctx.points.push(second.point);
    let end_b = match second.next {
        Some(start) => drive(mesh, plane, start, &mut ctx, |_, _| None)?.0,
        None => Termination::Boundary,
    };
    points.reverse();
    points.extend(ctx.take_points());
    log::debug!(
        "legacy walk from face {} stayed open ({:?}, {:?}) with {} points",
        seed,
        end_a,
        end_b,
        points.len()
    );

    Ok(CrossSection {
        contour: Loop::open(points),
        termination: open_termination(end_a, end_b),
        steps: ctx.steps(),
        plane: *plane,
    })
}

/// Whether closing at `start` still has to append the second seed point; a vertex
/// start was already appended when the walk pivoted onto it.
fn owes_second_point(start: Option<Frontier>) -> bool {
    matches!(start, Some(Frontier::Face(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TraversalPolicy;
    use crate::mesh::PolyMesh;
    use nalgebra::{Point3, Vector3};

    fn options() -> ExtractOptions {
        ExtractOptions::default()
            .with_epsilon(1e-9)
            .with_policy(TraversalPolicy::Legacy)
    }

    #[test]
    fn cube_mid_height_closes() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
        let section = extract(&cube, &plane, 2, &options()).unwrap();
        assert_eq!(section.termination, Termination::Closed);
        assert_eq!(
            section.contour.points,
            vec![
                Point3::new(1.0, 0.0, 0.5),
                Point3::new(1.0, 1.0, 0.5),
                Point3::new(0.0, 1.0, 0.5),
                Point3::new(0.0, 0.0, 0.5),
            ]
        );
        assert_eq!(section.contour.edges, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
    }

    #[test]
    fn diagonal_through_vertices_closes() {
        let cube = PolyMesh::cube(1.0);
        // x = z passes through vertices 0, 3, 5 and 6
        let plane = Plane::new(Point3::origin(), Vector3::new(1.0, 0.0, -1.0)).unwrap();
        let section = extract(&cube, &plane, 2, &options()).unwrap();
        assert_eq!(section.termination, Termination::Closed);
        assert_eq!(section.contour.len(), 4);
        for p in &section.contour.points {
            assert!((p.x - p.z).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_strip_stays_open() {
        let grid = PolyMesh::grid(3.0, 1.0, 3, 1);
        let plane = Plane::new(Point3::new(0.0, 0.5, 0.0), Vector3::y()).unwrap();
        let section = extract(&grid, &plane, 1, &options()).unwrap();
        assert_eq!(section.termination, Termination::Boundary);
        assert!(!section.contour.cyclic);
        let xs: Vec<f64> = section.contour.points.iter().map(|p| p.x as f64).collect();
        assert_eq!(xs, vec![3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn seed_must_straddle() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.0, 0.0, 2.0), Vector3::z()).unwrap();
        assert_eq!(
            extract(&cube, &plane, 2, &options()),
            Err(ExtractionError::InsufficientSeedCrossings { face: 2, found: 0 })
        );
    }
}
