//! Cross-section extraction
//!
//! Every extractor follows the same shape: convert the caller's world-space plane into
//! mesh-local space, find where the plane crosses the seed face, then drive
//! [`walker::step`](crate::walker::step) outward from each crossing until the walk
//! terminates. The variants differ only in which seed directions they walk and in the
//! stop condition they test after each step.
//!
//! | entry point                 | walks                            | stops at                 |
//! |-----------------------------|----------------------------------|--------------------------|
//! | [`extract_cross_section`]   | both seed directions             | closure or boundary      |
//! | [`extract_between_seeds`]   | every seed direction             | the second seed face     |
//! | [`extract_until_plane`]     | every seed direction             | a stop plane             |
//! | [`extract_directional`]     | the direction along a heading    | boundary or a stop plane |
//! | [`section_mesh`]            | no walk: every edge is tested    | n/a                      |

use crate::classify::{EdgeClassification, Endpoint, classify_edge};
use crate::contour::Loop;
use crate::errors::ExtractionError;
use crate::float_types::{Real, tolerance};
use crate::mesh::MeshTopology;
use crate::plane::Plane;
use crate::walker::{self, Frontier, Step, TraversalContext};
use nalgebra::{Matrix4, Point3, Vector3};

/// Concurrent extraction of many independent requests
pub mod batch;
/// Farthest-crossing walk with breadcrumb closure detection
pub mod farthest;
/// First-crossing walk with explicit closure detection
pub mod legacy;
/// Brute-force section of a whole mesh
pub mod section;
/// Walks bounded by a stop plane, and heading-guided walks
pub mod stop_plane;
/// Walks from one seed face to another
pub mod two_seed;

pub use batch::{SectionRequest, extract_many};
pub use section::{Section, section_mesh};
pub use stop_plane::{extract_directional, extract_until_plane};
pub use two_seed::{SeedHit, extract_between_seeds};

/// Default step budget of a request
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// How a single-seed extraction picks its way across each face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraversalPolicy {
    /// Take the first unvisited crossing of each element, pivoting through on-plane
    /// vertices. Closure is detected when one direction reaches the start of the other.
    Legacy,
    /// Take the crossing farthest from the entry point of each face; closure is
    /// detected by re-entering an already walked face.
    #[default]
    FarthestCrossing,
}

/// Per-request configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractOptions {
    /// Distance under which a vertex counts as lying on the plane
    pub epsilon: Real,
    /// Walker steps allowed across every direction of the request
    pub max_steps: usize,
    pub policy: TraversalPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            epsilon: tolerance(),
            max_steps: DEFAULT_MAX_STEPS,
            policy: TraversalPolicy::default(),
        }
    }
}

impl ExtractOptions {
    pub const fn with_epsilon(mut self, epsilon: Real) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub const fn with_policy(mut self, policy: TraversalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// ## Errors
    /// [`ExtractionError::InvalidOptions`] for a non-finite or non-positive `epsilon`,
    /// or a zero step budget.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ExtractionError::InvalidOptions(format!(
                "epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        if self.max_steps == 0 {
            return Err(ExtractionError::InvalidOptions(
                "max_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The walk came back around to its start; the contour is cyclic
    Closed,
    /// Both ends of the contour lie on mesh boundary edges
    Boundary,
    /// The contour was clipped at a stop plane
    StopPlane,
    /// The walk reached the second seed face
    SecondSeed,
    /// At least one end ran out of unvisited crossings
    DeadEnd,
}

/// Where a walk stands between two steps.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Seed crossings found, no step taken yet
    Seeded,
    Walking(Frontier),
    Terminated(Termination),
    Failed(ExtractionError),
}

/// The result of a successful extraction, in mesh-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    pub contour: Loop,
    pub termination: Termination,
    /// Walker steps taken by the request
    pub steps: usize,
    /// The local-space plane actually cut, which differs from the requested one when the
    /// seed face had to be nudged onto it
    pub plane: Plane,
}

impl CrossSection {
    /// The contour, if and only if it closed on itself.
    ///
    /// ## Errors
    /// [`ExtractionError::NonManifoldBoundary`] for any open result.
    pub fn require_closed(self) -> Result<Loop, ExtractionError> {
        if self.contour.cyclic {
            Ok(self.contour)
        } else {
            Err(ExtractionError::NonManifoldBoundary {
                points: self.contour.len(),
            })
        }
    }
}

/// Cut `mesh` with the world-space plane through `point` with `normal`, walking from
/// `seed`. `world` is the mesh's local-to-world matrix; the returned contour is in
/// local space.
///
/// ## Errors
/// Everything in [`ExtractionError`] except `SecondSeedUnreached`.
///
/// ## Example
/// ```rust
/// # use contourcut::extract::{ExtractOptions, Termination, extract_cross_section};
/// # use contourcut::mesh::PolyMesh;
/// # use nalgebra::{Matrix4, Point3, Vector3};
/// let cube = PolyMesh::cube(1.0);
/// let section = extract_cross_section(
///     &cube,
///     &Matrix4::identity(),
///     Point3::new(0.5, 0.5, 0.5),
///     Vector3::z(),
///     2,
///     &ExtractOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(section.termination, Termination::Closed);
/// assert_eq!(section.contour.len(), 4);
/// ```
pub fn extract_cross_section<M: MeshTopology + ?Sized>(
    mesh: &M,
    world: &Matrix4<Real>,
    point: Point3<Real>,
    normal: Vector3<Real>,
    seed: usize,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    let plane = Plane::from_world(world, point, normal)?;
    extract_local(mesh, &plane, seed, options)
}

/// [`extract_cross_section`] with a plane already in mesh-local space.
pub fn extract_local<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    options: &ExtractOptions,
) -> Result<CrossSection, ExtractionError> {
    options.validate()?;
    check_face(mesh, seed)?;
    log::debug!("extracting from face {} with {:?}", seed, options.policy);
    match options.policy {
        TraversalPolicy::Legacy => legacy::extract(mesh, plane, seed, options),
        TraversalPolicy::FarthestCrossing => farthest::extract(mesh, plane, seed, options),
    }
}

pub(crate) fn check_face<M: MeshTopology + ?Sized>(mesh: &M, face: usize) -> Result<(), ExtractionError> {
    if face < mesh.face_count() {
        Ok(())
    } else {
        Err(ExtractionError::InvalidFace(face))
    }
}

/// A world-space point mapped into the local space of `world`
pub(crate) fn local_point(
    world: &Matrix4<Real>,
    point: &Point3<Real>,
) -> Result<Point3<Real>, ExtractionError> {
    world
        .try_inverse()
        .map(|inverse| inverse.transform_point(point))
        .ok_or(ExtractionError::SingularTransform)
}

/// One way out of a seed face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SeedCrossing {
    /// Where the plane leaves the seed face
    pub point: Point3<Real>,
    /// Where the walk continues; `None` across a boundary edge
    pub next: Option<Frontier>,
}

/// Every crossing of the seed face, in edge order: edge crossings lead into the
/// neighbouring face, on-plane vertices (each reported once) lead into a vertex pivot.
///
/// All seed edges are marked visited so no direction can walk back through the seed.
pub(crate) fn seed_crossings<M: MeshTopology + ?Sized>(
    mesh: &M,
    plane: &Plane,
    seed: usize,
    ctx: &mut TraversalContext,
) -> Vec<SeedCrossing> {
    let mut crossings = Vec::new();
    let mut vertices = Vec::new();
    for &edge in mesh.face_edges(seed) {
        ctx.visit(edge);
        let [a, b] = mesh.edge_vertices(edge);
        match classify_edge(&mesh.position(a), &mesh.position(b), plane, ctx.epsilon()) {
            EdgeClassification::Cross { point, .. } => crossings.push(SeedCrossing {
                point,
                next: mesh.other_face(edge, seed).map(Frontier::Face),
            }),
            EdgeClassification::Point { point, endpoint } => {
                let vertex = match endpoint {
                    Endpoint::A => a,
                    Endpoint::B => b,
                };
                if !vertices.contains(&vertex) {
                    vertices.push(vertex);
                    crossings.push(SeedCrossing {
                        point,
                        next: Some(Frontier::Vertex(vertex)),
                    });
                }
            },
            EdgeClassification::Coplanar { .. } | EdgeClassification::None => {},
        }
    }
    crossings
}

/// Step from `start` until the walker stops or `stop` asks to.
///
/// `stop` runs after every step that appended a point: with the new frontier after an
/// advance, with `None` after a boundary crossing. Returning `Some` ends the walk with
/// that termination. Returns the termination and the last frontier reached.
pub(crate) fn drive<M, F>(
    mesh: &M,
    plane: &Plane,
    start: Frontier,
    ctx: &mut TraversalContext,
    mut stop: F,
) -> Result<(Termination, Frontier), ExtractionError>
where
    M: MeshTopology + ?Sized,
    F: FnMut(Option<Frontier>, &mut TraversalContext) -> Option<Termination>,
{
    let mut phase = Phase::Seeded;
    let mut current = start;
    loop {
        phase = match phase {
            Phase::Seeded => Phase::Walking(start),
            Phase::Walking(frontier) => {
                current = frontier;
                match walker::step(mesh, plane, frontier, ctx) {
                    Ok(Step::Advance(next)) => {
                        current = next;
                        match stop(Some(next), ctx) {
                            Some(termination) => Phase::Terminated(termination),
                            None => Phase::Walking(next),
                        }
                    },
                    Ok(Step::Boundary) => {
                        Phase::Terminated(stop(None, ctx).unwrap_or(Termination::Boundary))
                    },
                    Ok(Step::DeadEnd) => Phase::Terminated(Termination::DeadEnd),
                    Err(err) => Phase::Failed(err),
                }
            },
            Phase::Terminated(termination) => return Ok((termination, current)),
            Phase::Failed(err) => return Err(err),
        };
    }
}

/// Termination of an open result whose two ends stopped for `a` and `b`
pub(crate) fn open_termination(a: Termination, b: Termination) -> Termination {
    if a == Termination::Boundary && b == Termination::Boundary {
        Termination::Boundary
    } else {
        Termination::DeadEnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;

    #[test]
    fn options_validate() {
        assert!(ExtractOptions::default().validate().is_ok());
        assert!(matches!(
            ExtractOptions::default().with_epsilon(0.0).validate(),
            Err(ExtractionError::InvalidOptions(_))
        ));
        assert!(matches!(
            ExtractOptions::default().with_max_steps(0).validate(),
            Err(ExtractionError::InvalidOptions(_))
        ));
        let options = ExtractOptions::default().with_policy(TraversalPolicy::Legacy);
        assert_eq!(options.policy, TraversalPolicy::Legacy);
        assert_eq!(options.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn seed_crossings_report_each_vertex_once() {
        let cube = PolyMesh::cube(1.0);
        // Diagonal plane through vertices 0 and 5 of the front face [0,1,5,4]
        let plane = Plane::new(Point3::origin(), Vector3::new(1.0, 0.0, -1.0)).unwrap();
        let mut ctx = TraversalContext::new(1e-9, 100);
        let crossings = seed_crossings(&cube, &plane, 2, &mut ctx);
        assert_eq!(crossings.len(), 2);
        assert_eq!(crossings[0].next, Some(Frontier::Vertex(0)));
        assert_eq!(crossings[1].next, Some(Frontier::Vertex(5)));
        assert_eq!(ctx.visited_count(), 4);
    }

    #[test]
    fn drive_stops_on_request() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
        let mut ctx = TraversalContext::new(1e-9, 100);
        let (termination, last) = drive(&cube, &plane, Frontier::Face(2), &mut ctx, |next, _| {
            (next == Some(Frontier::Face(5))).then_some(Termination::SecondSeed)
        })
        .unwrap();
        assert_eq!(termination, Termination::SecondSeed);
        assert_eq!(last, Frontier::Face(5));
        assert_eq!(ctx.points.len(), 1);
    }

    #[test]
    fn open_result_requires_closure() {
        let section = CrossSection {
            contour: Loop::open(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]),
            termination: Termination::Boundary,
            steps: 1,
            plane: Plane::new(Point3::origin(), Vector3::z()).unwrap(),
        };
        assert_eq!(
            section.require_closed(),
            Err(ExtractionError::NonManifoldBoundary { points: 2 })
        );
    }

    #[test]
    fn invalid_seed_face() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        assert_eq!(
            extract_local(&cube, &plane, 6, &ExtractOptions::default()),
            Err(ExtractionError::InvalidFace(6))
        );
    }
}
