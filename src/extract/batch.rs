//! Many independent extractions over one mesh
//!
//! Requests share nothing but the read-only mesh, so with the `parallel` feature they
//! are spread over rayon's thread pool; without it they run one after another. Results
//! come back in request order either way.

use super::{
    CrossSection, ExtractOptions, SeedHit, extract_between_seeds, extract_cross_section,
    extract_until_plane,
};
use crate::errors::ExtractionError;
use crate::float_types::Real;
use crate::mesh::MeshTopology;
use crate::plane::Plane;
use nalgebra::Matrix4;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One extraction, with every plane and point in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionRequest {
    /// [`extract_cross_section`]
    Seed { cut: Plane, seed: usize },
    /// [`extract_between_seeds`]
    BetweenSeeds { cut: Plane, a: SeedHit, b: SeedHit },
    /// [`extract_until_plane`]
    UntilPlane { cut: Plane, seed: usize, stop: Plane },
}

impl SectionRequest {
    /// Run this request against `mesh`.
    pub fn run<M: MeshTopology + ?Sized>(
        &self,
        mesh: &M,
        world: &Matrix4<Real>,
        options: &ExtractOptions,
    ) -> Result<CrossSection, ExtractionError> {
        match *self {
            SectionRequest::Seed { cut, seed } => {
                extract_cross_section(mesh, world, cut.point, cut.normal, seed, options)
            },
            SectionRequest::BetweenSeeds { cut, a, b } => {
                extract_between_seeds(mesh, world, &cut, a, b, options)
            },
            SectionRequest::UntilPlane { cut, seed, stop } => {
                extract_until_plane(mesh, world, &cut, seed, &stop, options)
            },
        }
    }
}

/// Run every request against `mesh`; the i-th result belongs to the i-th request.
pub fn extract_many<M: MeshTopology + Sync + ?Sized>(
    mesh: &M,
    world: &Matrix4<Real>,
    requests: &[SectionRequest],
    options: &ExtractOptions,
) -> Vec<Result<CrossSection, ExtractionError>> {
    log::debug!("running {} section requests", requests.len());

    #[cfg(feature = "parallel")]
    let results = requests
        .par_iter()
        .map(|request| request.run(mesh, world, options))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = requests
        .iter()
        .map(|request| request.run(mesh, world, options))
        .collect();

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Termination;
    use crate::mesh::PolyMesh;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn results_follow_request_order() {
        let cube = PolyMesh::cube(1.0);
        let requests: Vec<SectionRequest> = [0.25, 0.5, 0.75]
            .iter()
            .map(|&z| SectionRequest::Seed {
                cut: Plane::new(Point3::new(0.0, 0.0, z), Vector3::z()).unwrap(),
                seed: 2,
            })
            .chain(std::iter::once(SectionRequest::Seed {
                cut: Plane::new(Point3::origin(), Vector3::z()).unwrap(),
                seed: 42,
            }))
            .collect();
        let results = extract_many(&cube, &Matrix4::identity(), &requests, &ExtractOptions::default());
        assert_eq!(results.len(), 4);
        for (result, z) in results.iter().zip([0.25, 0.5, 0.75]) {
            let section = result.as_ref().unwrap();
            assert_eq!(section.termination, Termination::Closed);
            assert!(section.contour.points.iter().all(|p| (p.z - z).abs() < 1e-12));
        }
        assert_eq!(results[3], Err(ExtractionError::InvalidFace(42)));
    }
}
