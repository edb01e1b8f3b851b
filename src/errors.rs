//! Error types for mesh construction, cross-section extraction and loop post-processing

use crate::float_types::Real;
use nalgebra::Point3;

/// Everything that can stop a cross-section request.
///
/// Expected mesh degeneracies come back as one of these values rather than a panic;
/// callers should read any of them as "no cross-section here" and may retry with a
/// perturbed plane or a different seed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    /// (DegenerateNormal) The plane normal has zero length
    #[error("(DegenerateNormal) plane normal has zero length")]
    DegenerateNormal,
    /// (SingularTransform) The world matrix cannot be inverted
    #[error("(SingularTransform) world matrix is not invertible")]
    SingularTransform,
    /// (InvalidFace) A seed face index is not part of the mesh
    #[error("(InvalidFace) face {0} is out of range")]
    InvalidFace(usize),
    /// (InsufficientSeedCrossings) The seed face does not straddle the plane as expected
    #[error("(InsufficientSeedCrossings) seed face {face} has {found} plane crossings")]
    InsufficientSeedCrossings { face: usize, found: usize },
    /// (AmbiguousCoplanarFace) Two in-plane faces meet at an in-plane edge
    #[error("(AmbiguousCoplanarFace) edge {edge} at vertex {vertex} joins two faces lying in the plane")]
    AmbiguousCoplanarFace { vertex: usize, edge: usize },
    /// (NonManifoldBoundary) The walk ended on a mesh boundary where a closed loop was required
    #[error("(NonManifoldBoundary) walk reached a mesh boundary after {points} points")]
    NonManifoldBoundary { points: usize },
    /// (BudgetExceeded) The step budget ran out before the walk terminated
    #[error("(BudgetExceeded) traversal gave up after {steps} steps")]
    BudgetExceeded { steps: usize },
    /// (SecondSeedUnreached) No walk from the first seed reached the second seed face
    #[error("(SecondSeedUnreached) no walk from face {from} reached face {to}")]
    SecondSeedUnreached { from: usize, to: usize },
    /// (InvalidOptions) Extraction options are out of range
    #[error("(InvalidOptions) {0}")]
    InvalidOptions(String),
}

/// Contract violations of the loop post-processing functions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoopError {
    /// (LengthMismatch) Two loops that must correspond point for point differ in length
    #[error("(LengthMismatch) expected {expected} points, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    /// (TooFewPoints) The loop is too short for the requested operation
    #[error("(TooFewPoints) need at least {needed} points, found {found}")]
    TooFewPoints { needed: usize, found: usize },
    /// (InvalidSegmentCount) Resampling needs at least one segment
    #[error("(InvalidSegmentCount) segment count must be positive")]
    InvalidSegmentCount,
}

/// Problems found while building a [`crate::mesh::PolyMesh`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// (VertexOutOfRange) A face references a vertex that does not exist
    #[error("(VertexOutOfRange) face {face} references vertex {vertex} (vertices.len = {len})")]
    VertexOutOfRange { face: usize, vertex: usize, len: usize },
    /// (FaceTooSmall) A face has fewer than three vertices
    #[error("(FaceTooSmall) face {face} has only {len} vertices")]
    FaceTooSmall { face: usize, len: usize },
    /// (RepeatedVertex) A face lists the same vertex twice
    #[error("(RepeatedVertex) face {face} repeats vertex {vertex}")]
    RepeatedVertex { face: usize, vertex: usize },
    /// (InvalidCoordinate) A vertex coordinate is NaN or infinite
    #[error("(InvalidCoordinate) the coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
}
