//! Topology walker: one step of a cross-section traversal
//!
//! A traversal frontier is either a face the plane passes through or a vertex lying on
//! the plane. [`step`] inspects the unvisited edges around the frontier, appends the
//! intersection it finds to the [`TraversalContext`] and reports where to go next.
//!
//! ## **Termination**
//! Every tested edge is recorded in the context's visited set and never consumed twice
//! within one request. Each step either consumes at least one fresh edge or
//! terminates, so a walk performs at most `edge_count` useful steps; the step budget
//! bounds the rest.
//!
//! ## **Vertex pivots**
//! Moving between two on-plane vertices that share a mesh edge walks along that edge,
//! so the move consumes the edge and is refused once the edge is visited. This keeps a
//! walk from doubling back along an in-plane edge it (or the seed face) already used.
//! In-plane edges of a pivot's link are left untouched until the walk stands on one of
//! their endpoints.

use crate::classify::{EdgeClassification, EdgeKind, Endpoint, classify_edge};
use crate::errors::ExtractionError;
use crate::float_types::Real;
use crate::mesh::MeshTopology;
use crate::plane::{COPLANAR, Plane};
use hashbrown::HashSet;
use nalgebra::Point3;

/// The mesh element a walk currently stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frontier {
    Face(usize),
    Vertex(usize),
}

/// Outcome of a single [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One point was appended; continue from the new frontier
    Advance(Frontier),
    /// One point was appended on a boundary edge; there is no face beyond it
    Boundary,
    /// No unvisited edge around the frontier meets the plane; nothing was appended
    DeadEnd,
}

/// Mutable state of one cross-section request.
///
/// The visited set is shared by every direction walked within the request; the point
/// list holds the chain of the direction currently being walked (see
/// [`TraversalContext::take_points`]).
#[derive(Debug, Clone)]
pub struct TraversalContext {
    visited: HashSet<usize>,
    last_visited: Option<usize>,
    pivots: HashSet<usize>,
    /// Intersection points of the chain being walked, in walk order
    pub points: Vec<Point3<Real>>,
    steps: usize,
    max_steps: usize,
    epsilon: Real,
}

impl TraversalContext {
    pub fn new(epsilon: Real, max_steps: usize) -> Self {
        TraversalContext {
            visited: HashSet::new(),
            last_visited: None,
            pivots: HashSet::new(),
            points: Vec::new(),
            steps: 0,
            max_steps,
            epsilon,
        }
    }

    pub const fn epsilon(&self) -> Real {
        self.epsilon
    }

    /// Steps taken so far across every direction of the request
    pub const fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_visited(&self, edge: usize) -> bool {
        self.visited.contains(&edge)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Mark `edge` visited; `false` if it already was.
    pub fn visit(&mut self, edge: usize) -> bool {
        let fresh = self.visited.insert(edge);
        if fresh {
            self.last_visited = Some(edge);
        }
        fresh
    }

    /// Forget the most recently visited edge so a later step may test it again.
    pub fn unvisit_last(&mut self) {
        if let Some(edge) = self.last_visited.take() {
            self.visited.remove(&edge);
        }
    }

    /// Whether the walk has already pivoted through `vertex`
    pub fn has_pivoted(&self, vertex: usize) -> bool {
        self.pivots.contains(&vertex)
    }

    /// Count one step against the budget.
    pub fn count_step(&mut self) -> Result<(), ExtractionError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(ExtractionError::BudgetExceeded { steps: self.steps });
        }
        Ok(())
    }

    /// Hand over the current chain and start an empty one, keeping the visited set.
    pub fn take_points(&mut self) -> Vec<Point3<Real>> {
        std::mem::take(&mut self.points)
    }
}

/// Advance the walk by one element.
///
/// # Errors
/// - [`ExtractionError::BudgetExceeded`] once the context's step budget is spent
/// - [`ExtractionError::AmbiguousCoplanarFace`] when a vertex pivot meets an in-plane
///   edge shared by two in-plane faces
pub fn step<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    frontier: Frontier,
    ctx: &mut TraversalContext,
) -> Result<Step, ExtractionError> {
    ctx.count_step()?;
    if let Frontier::Vertex(vertex) = frontier {
        ctx.pivots.insert(vertex);
    }
    let outcome = match frontier {
        Frontier::Face(face) => face_step(mesh, plane, face, ctx),
        Frontier::Vertex(vertex) => vertex_step(mesh, plane, vertex, ctx)?,
    };
    log::trace!("{:?} -> {:?}", frontier, outcome);
    Ok(outcome)
}

fn face_step<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    face: usize,
    ctx: &mut TraversalContext,
) -> Step {
    for &edge in mesh.face_edges(face) {
        if !ctx.visit(edge) {
            continue;
        }
        let [a, b] = mesh.edge_vertices(edge);
        match classify_edge(&mesh.position(a), &mesh.position(b), plane, ctx.epsilon) {
            EdgeClassification::Cross { point, .. } => {
                ctx.points.push(point);
                return match mesh.other_face(edge, face) {
                    Some(next) => Step::Advance(Frontier::Face(next)),
                    None => Step::Boundary,
                };
            },
            EdgeClassification::Point { point, endpoint } => {
                let vertex = match endpoint {
                    Endpoint::A => a,
                    Endpoint::B => b,
                };
                if !ctx.has_pivoted(vertex) {
                    ctx.points.push(point);
                    return Step::Advance(Frontier::Vertex(vertex));
                }
            },
            EdgeClassification::Coplanar { .. } | EdgeClassification::None => {},
        }
    }
    Step::DeadEnd
}

fn vertex_step<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    vertex: usize,
    ctx: &mut TraversalContext,
) -> Result<Step, ExtractionError> {
    for &face in mesh.vertex_faces(vertex) {
        for &edge in mesh.face_edges(face) {
            if ctx.is_visited(edge) {
                continue;
            }
            let [a, b] = mesh.edge_vertices(edge);
            let hit = classify_edge(&mesh.position(a), &mesh.position(b), plane, ctx.epsilon);
            let incident = a == vertex || b == vertex;
            if !incident && hit.kind() == EdgeKind::Coplanar {
                continue;
            }
            ctx.visit(edge);
            match hit {
                EdgeClassification::Cross { point, .. } => {
                    ctx.points.push(point);
                    return Ok(match mesh.other_face(edge, face) {
                        Some(next) => Step::Advance(Frontier::Face(next)),
                        None => Step::Boundary,
                    });
                },
                EdgeClassification::Point { point, endpoint } => {
                    let target = match endpoint {
                        Endpoint::A => a,
                        Endpoint::B => b,
                    };
                    if target != vertex
                        && !ctx.has_pivoted(target)
                        && walk_along(mesh, vertex, target, ctx)
                    {
                        ctx.points.push(point);
                        return Ok(Step::Advance(Frontier::Vertex(target)));
                    }
                },
                EdgeClassification::Coplanar { .. } => {
                    let in_plane = mesh
                        .edge_faces(edge)
                        .iter()
                        .filter(|&&f| face_in_plane(mesh, f, plane, ctx.epsilon))
                        .count();
                    if in_plane >= 2 {
                        return Err(ExtractionError::AmbiguousCoplanarFace { vertex, edge });
                    }
                    let next = mesh.other_vertex(edge, vertex);
                    if !ctx.has_pivoted(next) {
                        ctx.points.push(mesh.position(next));
                        return Ok(Step::Advance(Frontier::Vertex(next)));
                    }
                },
                EdgeClassification::None => {},
            }
        }
    }
    Ok(Step::DeadEnd)
}

/// Claim the mesh edge between two on-plane vertices, if there is one; `false` when
/// the walk already used it.
fn walk_along<M: MeshTopology + ?Sized>(
    mesh: &M,
    from: usize,
    to: usize,
    ctx: &mut TraversalContext,
) -> bool {
    mesh.find_edge(from, to).is_none_or(|joining| ctx.visit(joining))
}

/// Whether every vertex of `face` lies within `epsilon` of `plane`
pub fn face_in_plane<M: MeshTopology + ?Sized>(mesh: &M, face: usize, plane: &Plane, epsilon: Real) -> bool {
    let positions: Vec<Point3<Real>> = mesh.face_vertices(face).iter().map(|&v| mesh.position(v)).collect();
    plane.orient_points(&positions, epsilon) == COPLANAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;
    use nalgebra::{Point3, Vector3};

    fn z_plane(z: Real) -> Plane {
        Plane::new(Point3::new(0.5, 0.5, z), Vector3::z()).unwrap()
    }

    #[test]
    fn face_step_crosses_to_neighbour() {
        let cube = PolyMesh::cube(1.0);
        let mut ctx = TraversalContext::new(1e-9, 100);
        // front face [0,1,5,4]: first crossing edge is 1-5, shared with the right face
        let outcome = step(&cube, &z_plane(0.5), Frontier::Face(2), &mut ctx).unwrap();
        assert_eq!(outcome, Step::Advance(Frontier::Face(5)));
        assert_eq!(ctx.points, vec![Point3::new(1.0, 0.0, 0.5)]);
        assert_eq!(ctx.steps(), 1);
    }

    #[test]
    fn face_step_pivots_on_vertex_hit() {
        let cube = PolyMesh::cube(1.0);
        let mut ctx = TraversalContext::new(1e-9, 100);
        // A plane through vertex 1 only
        let plane = Plane::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(3.0, -1.0, 2.0)).unwrap();
        let outcome = step(&cube, &plane, Frontier::Face(2), &mut ctx).unwrap();
        assert_eq!(outcome, Step::Advance(Frontier::Vertex(1)));
        assert_eq!(ctx.points, vec![Point3::new(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn visited_edges_are_skipped() {
        let cube = PolyMesh::cube(1.0);
        let mut ctx = TraversalContext::new(1e-9, 100);
        for &e in cube.face_edges(2) {
            ctx.visit(e);
        }
        assert_eq!(step(&cube, &z_plane(0.5), Frontier::Face(2), &mut ctx).unwrap(), Step::DeadEnd);
        assert!(ctx.points.is_empty());
    }

    #[test]
    fn budget_is_enforced() {
        let cube = PolyMesh::cube(1.0);
        let mut ctx = TraversalContext::new(1e-9, 1);
        assert!(step(&cube, &z_plane(0.5), Frontier::Face(2), &mut ctx).is_ok());
        assert_eq!(
            step(&cube, &z_plane(0.5), Frontier::Face(5), &mut ctx),
            Err(ExtractionError::BudgetExceeded { steps: 2 })
        );
    }

    #[test]
    fn two_in_plane_faces_are_ambiguous() {
        // Two quads lying in z = 0 sharing edge 1-4, and a wall hanging below edge 0-1
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
        ];
        let faces = vec![
            vec![0, 1, 4, 3],
            vec![1, 2, 5, 4],
            vec![6, 7, 1, 0],
        ];
        let mesh = PolyMesh::new(vertices, faces).unwrap();
        let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        let shared = mesh.find_edge(1, 4).unwrap();

        let mut ctx = TraversalContext::new(1e-9, 100);
        for e in 0..mesh.edge_count() {
            if e != shared {
                ctx.visit(e);
            }
        }
        assert_eq!(
            step(&mesh, &plane, Frontier::Vertex(1), &mut ctx),
            Err(ExtractionError::AmbiguousCoplanarFace { vertex: 1, edge: shared })
        );
    }

    #[test]
    fn single_in_plane_face_is_skipped_along() {
        // Cube cut exactly at its top: the top rim edges each border one in-plane face
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::z()).unwrap();
        let mut ctx = TraversalContext::new(1e-9, 100);
        let outcome = step(&cube, &plane, Frontier::Vertex(4), &mut ctx).unwrap();
        match outcome {
            Step::Advance(Frontier::Vertex(next)) => {
                assert!([5, 7].contains(&next));
                assert_eq!(ctx.points, vec![cube.position(next)]);
            },
            other => panic!("expected a pivot along the rim, got {:?}", other),
        }
    }

    #[test]
    fn rim_link_edges_stay_unvisited() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::z()).unwrap();
        let mut ctx = TraversalContext::new(1e-9, 100);
        ctx.visit(cube.find_edge(4, 5).unwrap());
        let outcome = step(&cube, &plane, Frontier::Vertex(7), &mut ctx).unwrap();
        // 5-6 is scanned before 6-7 but does not touch vertex 7
        assert_eq!(outcome, Step::Advance(Frontier::Vertex(6)));
        assert!(!ctx.is_visited(cube.find_edge(5, 6).unwrap()));
        assert!(ctx.is_visited(cube.find_edge(6, 7).unwrap()));
    }

    #[test]
    fn pivot_does_not_reuse_a_walked_edge() {
        // Bottom face in the plane; both rim edges at vertex 1 already walked
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        let mut ctx = TraversalContext::new(1e-9, 100);
        ctx.visit(cube.find_edge(0, 1).unwrap());
        ctx.visit(cube.find_edge(1, 2).unwrap());
        assert_eq!(step(&cube, &plane, Frontier::Vertex(1), &mut ctx).unwrap(), Step::DeadEnd);
        assert!(ctx.points.is_empty());
    }
}
