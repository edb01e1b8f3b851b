//! Farthest-crossing policy
//!
//! Within each face the walk leaves through the crossing edge farthest from the point
//! where it entered, which keeps it moving across faces the plane only grazes. Each
//! face entered is remembered in a breadcrumb map together with the index of its entry
//! point; entering a remembered face again closes the loop, and when that face is not
//! the seed the points before its entry point (the tail of a P-shaped walk) are
//! dropped.
//!
//! A plane through a vertex is met by both edges at that vertex. The walk still moves
//! on through such an exit but appends its point only once, so no two consecutive
//! contour points are closer than `epsilon`.

use super::{CrossSection, ExtractOptions, Termination, open_termination};
use crate::contour::Loop;
use crate::errors::ExtractionError;
use crate::float_types::Real;
use crate::geometry::{closest_point_on_segment, intersect_line_plane};
use crate::mesh::MeshTopology;
use crate::plane::{BACK, FRONT, Plane};
use crate::walker::TraversalContext;
use hashbrown::HashMap;
use nalgebra::Point3;

/// One half of a farthest-crossing walk
#[derive(Debug, Clone)]
struct Walk {
    points: Vec<Point3<Real>>,
    looped: bool,
    end: Termination,
}

/// Single-seed extraction with
/// [`TraversalPolicy::FarthestCrossing`](super::TraversalPolicy::FarthestCrossing) in
/// mesh-local space.
///
/// A seed face lying wholly on one side of the plane is not an error: the plane is
/// moved along its normal until it just reaches the nearest seed vertex, and the moved
/// plane is reported in [`CrossSection::plane`].
///
/// ## Errors
/// - [`ExtractionError::InsufficientSeedCrossings`] when fewer than two seed edges
///   meet the plane
/// - [`ExtractionError::BudgetExceeded`] from the walk
pub fn extract<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    let epsilon = options.epsilon;
    let plane = straddling_plane(mesh, plane, seed, epsilon);
    let crossings = seed_edges(mesh, &plane, seed, epsilon);
    let (first, second) = match crossings.len() {
        found @ 0..=1 => {
            return Err(ExtractionError::InsufficientSeedCrossings { face: seed, found });
        },
        2 => (crossings[0], crossings[1]),
        _ => farthest_pair(&crossings),
    };

    let mut ctx = TraversalContext::new(epsilon, options.max_steps);
    let walk_a = walk(mesh, &plane, seed, first, &mut ctx)?;
    if walk_a.looped {
        return Ok(closed(walk_a.points, &ctx, plane));
    }
    let walk_b = walk(mesh, &plane, seed, second, &mut ctx)?;
    if walk_b.looped {
        log::warn!(
            "walk from face {} looped in its second direction but not its first",
            seed
        );
        return Ok(closed(walk_b.points, &ctx, plane));
    }

    let mut points = walk_a.points;
    points.reverse();
    for point in walk_b.points {
        push_distinct(&mut points, point, epsilon);
    }
    Ok(CrossSection {
        contour: Loop::open(points),
        termination: open_termination(walk_a.end, walk_b.end),
        steps: ctx.steps(),
        plane,
    })
}

fn closed(points: Vec<Point3<Real>>, ctx: &TraversalContext, plane: Plane) -> CrossSection {
    CrossSection {
        contour: Loop::closed(points),
        termination: Termination::Closed,
        steps: ctx.steps(),
        plane,
    }
}

/// Append `point` unless it lies within `epsilon` of the current last point.
fn push_distinct(points: &mut Vec<Point3<Real>>, point: Point3<Real>, epsilon: Real) -> bool {
    let repeated = points.last().is_some_and(|last| (last - point).norm() <= epsilon);
    if !repeated {
        points.push(point);
    }
    !repeated
}

/// `plane`, or a parallel copy that reaches the seed face when every seed vertex lies
/// more than `epsilon` to one side.
fn straddling_plane<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    epsilon: Real,
) -> Plane {
    let positions: Vec<Point3<Real>> = mesh
        .face_vertices(seed)
        .iter()
        .map(|&v| mesh.position(v))
        .collect();
    let all_on = |side: i8| positions.iter().all(|p| plane.orient_point(p, epsilon) == side);
    let above = all_on(FRONT);
    if !above && !all_on(BACK) {
        return *plane;
    }
    let distances = positions.iter().map(|p| plane.signed_distance(p));
    let shift = if above {
        distances.fold(Real::INFINITY, Real::min) + epsilon
    } else {
        distances.fold(Real::NEG_INFINITY, Real::max) - epsilon
    };
    log::debug!("seed face {} misses the plane; nudging it by {}", seed, shift);
    plane.nudged(shift)
}

/// Where the segment `a`-`b` meets the plane, unless both endpoints lie more than
/// `epsilon` to the same side or the segment runs parallel to the plane.
fn crossing(a: &Point3<Real>, b: &Point3<Real>, plane: &Plane, epsilon: Real) -> Option<Point3<Real>> {
    let da = plane.signed_distance(a);
    let db = plane.signed_distance(b);
    if (da > epsilon && db > epsilon) || (da < -epsilon && db < -epsilon) {
        return None;
    }
    intersect_line_plane(a, b, plane, epsilon).map(|p| closest_point_on_segment(&p, a, b))
}

/// Whether `a`-`b` has endpoints strictly on opposite sides of the plane
fn strictly_crosses(a: &Point3<Real>, b: &Point3<Real>, plane: &Plane, epsilon: Real) -> bool {
    let da = plane.signed_distance(a);
    let db = plane.signed_distance(b);
    (da > epsilon && db < -epsilon) || (da < -epsilon && db > epsilon)
}

fn seed_edges<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    epsilon: Real,
) -> Vec<(usize, Point3<Real>)> {
    mesh.face_edges(seed)
        .iter()
        .filter_map(|&edge| {
            let [a, b] = mesh.edge_positions(edge);
            crossing(&a, &b, plane, epsilon).map(|p| (edge, p))
        })
        .collect()
}

/// The two crossings of a many-sided seed face that lie farthest apart
fn farthest_pair(
    crossings: &[(usize, Point3<Real>)],
) -> ((usize, Point3<Real>), (usize, Point3<Real>)) {
    let mut best = (crossings[0], crossings[1]);
    let mut best_distance = -1.0;
    for (i, a) in crossings.iter().enumerate() {
        for b in &crossings[i + 1..] {
            let distance = (a.1 - b.1).norm();
            if distance > best_distance {
                best_distance = distance;
                best = (*a, *b);
            }
        }
    }
    best
}

/// The crossing edge of `face` other than `entry` farthest from `from`.
///
/// Triangles have only one way out, so the first edge crossing strictly is taken
/// without measuring.
fn farthest_crossing<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    face: usize,
    entry: usize,
    from: &Point3<Real>,
    epsilon: Real,
) -> Option<(usize, Point3<Real>)> {
    let edges = mesh.face_edges(face);
    if edges.len() == 3 {
        let shortcut = edges.iter().filter(|&&e| e != entry).find_map(|&edge| {
            let [a, b] = mesh.edge_positions(edge);
            if strictly_crosses(&a, &b, plane, epsilon) {
                crossing(&a, &b, plane, epsilon).map(|p| (edge, p))
            } else {
                None
            }
        });
        if shortcut.is_some() {
            return shortcut;
        }
    }

    let mut best: Option<(usize, Point3<Real>)> = None;
    let mut best_distance = -1.0;
    for &edge in edges.iter().filter(|&&e| e != entry) {
        let [a, b] = mesh.edge_positions(edge);
        if let Some(p) = crossing(&a, &b, plane, epsilon) {
            let distance = (from - p).norm();
            if distance > best_distance {
                best_distance = distance;
                best = Some((edge, p));
            }
        }
    }
    best
}

/// Walk away from `seed` through the seed edge `start` until the walk re-enters a face
/// it already crossed, leaves the mesh or finds no way on.
fn walk<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    (start_edge, start_point): (usize, Point3<Real>),
    ctx: &mut TraversalContext,
) -> Result<Walk, ExtractionError> {
    let mut points = vec![start_point];
    let Some(mut face) = mesh.other_face(start_edge, seed) else {
        return Ok(Walk {
            points,
            looped: false,
            end: Termination::Boundary,
        });
    };
    let mut crumbs: HashMap<usize, usize> = HashMap::new();
    crumbs.insert(seed, 0);
    crumbs.insert(face, 0);

    let mut entry = start_edge;
    loop {
        ctx.count_step()?;
        let from = points[points.len() - 1];
        let Some((exit, point)) = farthest_crossing(mesh, plane, face, entry, &from, ctx.epsilon())
        else {
            log::trace!("face {} has no way out", face);
            return Ok(Walk {
                points,
                looped: false,
                end: Termination::DeadEnd,
            });
        };
        if !push_distinct(&mut points, point, ctx.epsilon()) {
            log::trace!("face {} leaves through the vertex it was entered at", face);
        }

        let Some(next) = mesh.other_face(exit, face) else {
            return Ok(Walk {
                points,
                looped: false,
                end: Termination::Boundary,
            });
        };
        if let Some(&crumb) = crumbs.get(&next) {
            if crumb != 0 {
                log::debug!("dropping a {}-point tail before face {}", crumb, next);
                points.drain(..crumb);
            }
            if points.len() > 1 && (points[0] - points[points.len() - 1]).norm() <= ctx.epsilon() {
                points.pop();
            }
            return Ok(Walk {
                points,
                looped: true,
                end: Termination::Closed,
            });
        }
        crumbs.insert(next, points.len() - 1);
        log::trace!("face {} -> face {} through edge {}", face, next, exit);
        entry = exit;
        face = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;
    use nalgebra::Vector3;

    #[test]
    fn cube_mid_height_closes() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
        let section = extract(&cube, &plane, 2, &ExtractOptions::default()).unwrap();
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
        assert_eq!(section.plane, plane);
    }

    #[test]
    fn plane_missing_the_seed_is_nudged() {
        let cube = PolyMesh::cube(1.0);
        // The plane sits just below the bottom face; seeding on the right face pulls it up
        let plane = Plane::new(Point3::new(0.0, 0.0, -0.25), Vector3::z()).unwrap();
        let section = extract(&cube, &plane, 5, &ExtractOptions::default().with_epsilon(1e-6)).unwrap();
        assert!(section.plane.point.z > -0.25);
        assert!(section.plane.point.z.abs() < 1e-5);
        assert_eq!(section.termination, Termination::Closed);
    }

    #[test]
    fn triangle_takes_first_strict_crossing() {
        let mesh = PolyMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        )
        .unwrap();
        let plane = Plane::new(Point3::new(0.5, 0.0, 0.0), Vector3::x()).unwrap();
        let entry = mesh.find_edge(0, 1).unwrap();
        let (edge, point) =
            farthest_crossing(&mesh, &plane, 0, entry, &Point3::new(0.5, 0.0, 0.0), 1e-9).unwrap();
        assert_eq!(edge, mesh.find_edge(1, 2).unwrap());
        assert!((point.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn open_strip_joins_both_halves() {
        let grid = PolyMesh::grid(3.0, 1.0, 3, 1);
        let plane = Plane::new(Point3::new(0.0, 0.5, 0.0), Vector3::y()).unwrap();
        let section = extract(&grid, &plane, 1, &ExtractOptions::default()).unwrap();
        assert_eq!(section.termination, Termination::Boundary);
        assert_eq!(section.contour.len(), 4);
        assert!(!section.contour.cyclic);
    }

    #[test]
    fn vertex_exits_are_appended_once() {
        let grid = PolyMesh::grid(3.0, 3.0, 3, 3);
        let diagonal = Plane::new(Point3::origin(), Vector3::new(1.0, -1.0, 0.0)).unwrap();
        let section = extract(&grid, &diagonal, 0, &ExtractOptions::default()).unwrap();
        assert_eq!(section.termination, Termination::Boundary);
        assert_eq!(section.contour.len(), 4);
        for (i, p) in section.contour.points.iter().enumerate() {
            assert!((p - Point3::new(i as Real, i as Real, 0.0)).norm() < 1e-12, "{:?}", p);
        }
    }

    #[test]
    fn distinct_push_skips_repeats() {
        let mut points = vec![Point3::origin()];
        assert!(!push_distinct(&mut points, Point3::new(0.0, 0.0, 1e-12), 1e-9));
        assert!(push_distinct(&mut points, Point3::new(1.0, 0.0, 0.0), 1e-9));
        assert_eq!(points.len(), 2);
    }
}
