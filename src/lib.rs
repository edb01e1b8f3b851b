//! Planar **cross sections of polygon meshes**, walked face by face from a seed.
//!
//! Given a mesh, a cutting plane and a face the plane passes through, the walkers in
//! [`extract`] follow the plane across neighbouring faces and return the ordered
//! polyline ([`Loop`]) where plane and surface meet, closed when the walk comes back to
//! where it started and open when it runs off a mesh boundary. Only the faces the
//! section actually touches are visited.
//!
//! Around the walkers sit the tools a retopology workflow needs between cuts:
//! [`simplify`] (feature-point reduction), [`resample`] (equal arc-length spacing),
//! [`align`] (point correspondence between two loops) and the polyline helpers in
//! [`path`].
//!
//! ```
//! use contourcut::extract::{ExtractOptions, Termination, extract_cross_section};
//! use contourcut::mesh::PolyMesh;
//! use nalgebra::{Matrix4, Point3, Vector3};
//!
//! let cube = PolyMesh::cube(1.0);
//! let section = extract_cross_section(
//!     &cube,
//!     &Matrix4::identity(),
//!     Point3::new(0.0, 0.0, 0.5),
//!     Vector3::z(),
//!     2,
//!     &ExtractOptions::default(),
//! )?;
//! assert_eq!(section.termination, Termination::Closed);
//! assert_eq!(section.contour.len(), 4);
//! # Ok::<(), contourcut::errors::ExtractionError>(())
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for [`extract::extract_many`]
//! - **serde**: `Serialize`/`Deserialize` for planes, loops, options and requests

#![forbid(unsafe_code)]
#![warn(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod align;
pub mod classify;
pub mod contour;
pub mod errors;
pub mod extract;
pub mod float_types;
pub mod geometry;
pub mod mesh;
pub mod path;
pub mod plane;
pub mod resample;
pub mod simplify;
pub mod walker;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use align::{Alignment, align};
pub use contour::Loop;
pub use errors::{ExtractionError, LoopError, MeshError};
pub use extract::{CrossSection, ExtractOptions, Termination, TraversalPolicy, extract_cross_section};
pub use mesh::{MeshTopology, PolyMesh};
pub use plane::Plane;
pub use resample::resample;
pub use simplify::{DeviationMetric, simplify};
