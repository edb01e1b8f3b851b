//! Read-only polygon mesh topology consumed by the cross-section walkers
//!
//! The walkers only ever ask a handful of adjacency questions (edges of a face, faces
//! of an edge, faces and edges around a vertex), captured by the [`MeshTopology`]
//! trait. [`PolyMesh`] is the crate's own implementation: an indexed n-gon mesh that
//! derives a deduplicated edge table and every adjacency list once at construction.

use crate::errors::MeshError;
use crate::float_types::{
    Real,
    parry3d::{
        bounding_volume::Aabb,
        query::{Ray, RayCast},
        shape::Triangle,
    },
};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// Shape generation functions for PolyMesh
pub mod shapes;

/// Manifold topology analysis and pole detection
pub mod manifold;

/// Adjacency queries a cross-section walk needs from a mesh.
///
/// Faces are ordered vertex loops. Edges are undirected and identified by index;
/// `edge_faces` has one entry on a boundary edge, two on a manifold interior edge
/// and more on a non-manifold edge.
pub trait MeshTopology {
    fn vertex_count(&self) -> usize;
    fn edge_count(&self) -> usize;
    fn face_count(&self) -> usize;

    /// Local-space position of a vertex
    fn position(&self, vertex: usize) -> Point3<Real>;
    /// The two vertices of an edge
    fn edge_vertices(&self, edge: usize) -> [usize; 2];
    /// Vertex loop of a face
    fn face_vertices(&self, face: usize) -> &[usize];
    /// Edges of a face, in loop order
    fn face_edges(&self, face: usize) -> &[usize];
    /// Faces using an edge
    fn edge_faces(&self, edge: usize) -> &[usize];
    /// Faces around a vertex
    fn vertex_faces(&self, vertex: usize) -> &[usize];
    /// Edges around a vertex
    fn vertex_edges(&self, vertex: usize) -> &[usize];

    /// Endpoint positions of an edge
    fn edge_positions(&self, edge: usize) -> [Point3<Real>; 2] {
        let [a, b] = self.edge_vertices(edge);
        [self.position(a), self.position(b)]
    }

    /// The face across `edge` from `face`, `None` on a boundary
    fn other_face(&self, edge: usize, face: usize) -> Option<usize> {
        self.edge_faces(edge).iter().copied().find(|&f| f != face)
    }

    /// The endpoint of `edge` that is not `vertex`
    fn other_vertex(&self, edge: usize, vertex: usize) -> usize {
        let [a, b] = self.edge_vertices(edge);
        if a == vertex { b } else { a }
    }

    /// Index of the edge joining `a` and `b`, if any
    fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        self.vertex_edges(a)
            .iter()
            .copied()
            .find(|&e| a != b && self.other_vertex(e, a) == b)
    }

    fn is_boundary_edge(&self, edge: usize) -> bool {
        self.edge_faces(edge).len() < 2
    }

    /// Unit face normal by Newell's method, robust for non-planar n-gons.
    /// Degenerate faces yield the zero vector.
    fn face_normal(&self, face: usize) -> Vector3<Real> {
        let verts = self.face_vertices(face);
        let mut normal = Vector3::zeros();
        for (i, &vi) in verts.iter().enumerate() {
            let current = self.position(vi);
            let next = self.position(verts[(i + 1) % verts.len()]);
            normal.x += (current.y - next.y) * (current.z + next.z);
            normal.y += (current.z - next.z) * (current.x + next.x);
            normal.z += (current.x - next.x) * (current.y + next.y);
        }
        normal.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Average of a face's vertex positions
    fn face_centroid(&self, face: usize) -> Point3<Real> {
        let verts = self.face_vertices(face);
        let sum = verts
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + self.position(v).coords);
        Point3::from(sum / verts.len().max(1) as Real)
    }
}

/// An indexed polygon mesh with precomputed adjacency.
#[derive(Debug, Clone)]
pub struct PolyMesh {
    vertices: Vec<Point3<Real>>,
    faces: Vec<Vec<usize>>,
    edges: Vec<[usize; 2]>,
    face_edges: Vec<Vec<usize>>,
    edge_faces: Vec<Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
    vertex_edges: Vec<Vec<usize>>,
    bounding_box: OnceLock<Aabb>,
}

impl PolyMesh {
    /// Build a mesh from vertex positions and face vertex loops.
    ///
    /// Edges are created once per unordered vertex pair, in order of first
    /// appearance while scanning faces, so edge indices are deterministic.
    ///
    /// ## Errors
    /// - [`MeshError::InvalidCoordinate`] for NaN or infinite positions
    /// - [`MeshError::FaceTooSmall`] for faces with fewer than three vertices
    /// - [`MeshError::VertexOutOfRange`] for indices past `vertices.len()`
    /// - [`MeshError::RepeatedVertex`] when a face lists a vertex twice
    pub fn new(vertices: Vec<Point3<Real>>, faces: Vec<Vec<usize>>) -> Result<Self, MeshError> {
        if let Some(bad) = vertices.iter().find(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(MeshError::InvalidCoordinate(*bad));
        }

        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut edge_lookup: HashMap<(usize, usize), usize> = HashMap::new();
        let mut face_edges = Vec::with_capacity(faces.len());
        let mut edge_faces: Vec<Vec<usize>> = Vec::new();
        let mut vertex_faces = vec![Vec::new(); vertices.len()];
        let mut vertex_edges = vec![Vec::new(); vertices.len()];

        for (face, loop_indices) in faces.iter().enumerate() {
            if loop_indices.len() < 3 {
                return Err(MeshError::FaceTooSmall {
                    face,
                    len: loop_indices.len(),
                });
            }
            for (i, &vertex) in loop_indices.iter().enumerate() {
                if vertex >= vertices.len() {
                    return Err(MeshError::VertexOutOfRange {
                        face,
                        vertex,
                        len: vertices.len(),
                    });
                }
                if loop_indices[..i].contains(&vertex) {
                    return Err(MeshError::RepeatedVertex { face, vertex });
                }
            }

            let mut this_face_edges = Vec::with_capacity(loop_indices.len());
            for (&a, &b) in loop_indices
                .iter()
                .zip(loop_indices.iter().cycle().skip(1))
            {
                let key = (a.min(b), a.max(b));
                let edge = *edge_lookup.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edge_faces.push(Vec::new());
                    vertex_edges[key.0].push(edges.len() - 1);
                    vertex_edges[key.1].push(edges.len() - 1);
                    edges.len() - 1
                });
                edge_faces[edge].push(face);
                this_face_edges.push(edge);
                vertex_faces[a].push(face);
            }
            face_edges.push(this_face_edges);
        }

        Ok(PolyMesh {
            vertices,
            faces,
            edges,
            face_edges,
            edge_faces,
            vertex_faces,
            vertex_edges,
            bounding_box: OnceLock::new(),
        })
    }

    pub fn vertices(&self) -> &[Point3<Real>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Axis aligned bounding box of all vertices (cached after first call)
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            if self.vertices.is_empty() {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for p in &self.vertices {
                mins = mins.inf(p);
                maxs = maxs.sup(p);
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Fan triangulation of one face as vertex index triples.
    ///
    /// The fan apex is the vertex whose fan has the smallest maximum interior angle,
    /// which keeps slivers out of quads and convex n-gons.
    pub fn triangulate_face(&self, face: usize) -> Vec<[usize; 3]> {
        let indices = &self.faces[face];
        let n = indices.len();
        if n == 3 {
            return vec![[indices[0], indices[1], indices[2]]];
        }
        let start = self.best_fan_start(indices);
        (1..n - 1)
            .map(|i| {
                [
                    indices[start],
                    indices[(start + i) % n],
                    indices[(start + i + 1) % n],
                ]
            })
            .collect()
    }

    fn best_fan_start(&self, indices: &[usize]) -> usize {
        let n = indices.len();
        let mut best_start = 0;
        let mut best_score = Real::MAX;
        for start in 0..n {
            let max_angle = (1..n - 1)
                .flat_map(|i| {
                    triangle_angles(
                        self.vertices[indices[start]],
                        self.vertices[indices[(start + i) % n]],
                        self.vertices[indices[(start + i + 1) % n]],
                    )
                })
                .fold(0.0, Real::max);
            if max_angle < best_score {
                best_score = max_angle;
                best_start = start;
            }
        }
        best_start
    }

    /// Split every n-gon into triangles.
    ///
    /// Returns the triangulated mesh together with a map from each new face to the
    /// face it came from, so a seed found on the original mesh can be relocated.
    pub fn triangulated(&self) -> Result<(PolyMesh, Vec<usize>), MeshError> {
        let mut faces = Vec::new();
        let mut source = Vec::new();
        for face in 0..self.faces.len() {
            for tri in self.triangulate_face(face) {
                faces.push(tri.to_vec());
                source.push(face);
            }
        }
        Ok((PolyMesh::new(self.vertices.clone(), faces)?, source))
    }

    /// Cast a ray against the mesh and return the nearest hit as `(face, point)`.
    ///
    /// This is how a caller normally finds a seed face: cast from the eye through the
    /// cursor, then cut with a plane through the returned point.
    pub fn ray_cast_face(
        &self,
        origin: &Point3<Real>,
        direction: &Vector3<Real>,
    ) -> Option<(usize, Point3<Real>)> {
        let ray = Ray::new(*origin, *direction);
        if !self.bounding_box().intersects_local_ray(&ray, Real::MAX) {
            return None;
        }
        (0..self.faces.len())
            .flat_map(|face| {
                self.triangulate_face(face)
                    .into_iter()
                    .map(move |tri| (face, tri))
            })
            .filter_map(|(face, [a, b, c])| {
                let triangle = Triangle::new(self.vertices[a], self.vertices[b], self.vertices[c]);
                triangle
                    .cast_local_ray_and_get_normal(&ray, Real::MAX, true)
                    .map(|hit| (face, hit.time_of_impact))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(face, toi)| (face, ray.point_at(toi)))
    }
}

/// The three interior angles of a triangle
fn triangle_angles(a: Point3<Real>, b: Point3<Real>, c: Point3<Real>) -> [Real; 3] {
    let ab = b - a;
    let ac = c - a;
    let bc = c - b;
    [ab.angle(&ac), (-ab).angle(&bc), (-ac).angle(&(-bc))]
}

impl MeshTopology for PolyMesh {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn position(&self, vertex: usize) -> Point3<Real> {
        self.vertices[vertex]
    }

    fn edge_vertices(&self, edge: usize) -> [usize; 2] {
        self.edges[edge]
    }

    fn face_vertices(&self, face: usize) -> &[usize] {
        &self.faces[face]
    }

    fn face_edges(&self, face: usize) -> &[usize] {
        &self.face_edges[face]
    }

    fn edge_faces(&self, edge: usize) -> &[usize] {
        &self.edge_faces[edge]
    }

    fn vertex_faces(&self, vertex: usize) -> &[usize] {
        &self.vertex_faces[vertex]
    }

    fn vertex_edges(&self, vertex: usize) -> &[usize] {
        &self.vertex_edges[vertex]
    }
}
