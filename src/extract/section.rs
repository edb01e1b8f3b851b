//! Brute-force section of a whole mesh
//!
//! Unlike the seeded walks this tests every edge, so it finds every component of the
//! section at the cost of touching the whole mesh. The result is an unordered graph;
//! [`Section::chains`] orders it into loops.

use crate::classify::{EdgeClassification, Endpoint, classify_edge};
use crate::contour::Loop;
use crate::errors::ExtractionError;
use crate::float_types::Real;
use crate::mesh::MeshTopology;
use crate::plane::Plane;
use crate::walker::face_in_plane;
use hashbrown::{HashMap, HashSet};
use nalgebra::{Matrix4, Point3};

/// Section points and the segments joining them, in no particular order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub points: Vec<Point3<Real>>,
    pub edges: Vec<(usize, usize)>,
}

impl Section {
    /// Order the section graph into polylines.
    ///
    /// Open chains are traced first, each from an unused end (a point with one
    /// segment), then whatever remains is traced as cycles. Every segment is used
    /// exactly once.
    pub fn chains(&self) -> Vec<Loop> {
        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.points.len()];
        for (i, &(a, b)) in self.edges.iter().enumerate() {
            adjacency[a].push((i, b));
            adjacency[b].push((i, a));
        }
        let mut used = vec![false; self.edges.len()];
        let mut chains = Vec::new();

        let ends = (0..self.points.len()).filter(|&p| adjacency[p].len() == 1);
        let anywhere = self.edges.iter().map(|&(a, _)| a);
        for start in ends.chain(anywhere).collect::<Vec<_>>() {
            if adjacency[start].iter().all(|&(e, _)| used[e]) {
                continue;
            }
            let mut indices = vec![start];
            let mut current = start;
            while let Some(&(edge, next)) = adjacency[current].iter().find(|&&(e, _)| !used[e]) {
                used[edge] = true;
                indices.push(next);
                current = next;
            }
            let cyclic = indices.len() > 2 && indices[0] == indices[indices.len() - 1];
            if cyclic {
                indices.pop();
            }
            let points = indices.iter().map(|&i| self.points[i]).collect();
            chains.push(Loop::new(points, cyclic));
        }
        chains
    }
}

/// Section `mesh` (local-to-world matrix `world`) with the world-space `cut` plane.
///
/// ## Errors
/// [`ExtractionError::SingularTransform`] and [`ExtractionError::DegenerateNormal`]
/// from the plane conversion.
pub fn section_mesh<M: MeshTopology + ?Sized>(
    mesh: &M,
    world: &Matrix4<Real>,
    cut: &Plane,
    epsilon: Real,
) -> Result<Section, ExtractionError> {
    let plane = Plane::from_world(world, cut.point, cut.normal)?;
    Ok(section_local(mesh, &plane, epsilon))
}

/// [`section_mesh`] with the plane in mesh-local space.
///
/// Edge crossings and on-plane vertices become section points (each vertex once).
/// Two points are joined when they lie on a common face that is not itself in the
/// plane; in-plane faces contribute their outline through their neighbours.
pub fn section_local<M: MeshTopology + ?Sized>(mesh: &M, plane: &Plane, epsilon: Real) -> Section {
    let mut points = Vec::new();
    let mut edge_point: HashMap<usize, usize> = HashMap::new();
    let mut vertex_point: HashMap<usize, usize> = HashMap::new();
    let mut add_vertex = |vertex: usize, points: &mut Vec<Point3<Real>>| {
        vertex_point.entry(vertex).or_insert_with(|| {
            points.push(mesh.position(vertex));
            points.len() - 1
        });
    };

    for edge in 0..mesh.edge_count() {
        let [a, b] = mesh.edge_vertices(edge);
        match classify_edge(&mesh.position(a), &mesh.position(b), plane, epsilon) {
            EdgeClassification::Cross { point, .. } => {
                points.push(point);
                edge_point.insert(edge, points.len() - 1);
            },
            EdgeClassification::Point { endpoint, .. } => {
                add_vertex(if endpoint == Endpoint::A { a } else { b }, &mut points);
            },
            EdgeClassification::Coplanar { .. } => {
                add_vertex(a, &mut points);
                add_vertex(b, &mut points);
            },
            EdgeClassification::None => {},
        }
    }

    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for face in 0..mesh.face_count() {
        if face_in_plane(mesh, face, plane, epsilon) {
            continue;
        }
        let mut on_face: Vec<usize> = Vec::new();
        for (&vertex, &edge) in mesh.face_vertices(face).iter().zip(mesh.face_edges(face)) {
            let hits = [vertex_point.get(&vertex), edge_point.get(&edge)];
            for &index in hits.into_iter().flatten() {
                if !on_face.contains(&index) {
                    on_face.push(index);
                }
            }
        }
        for (i, &p) in on_face.iter().enumerate() {
            for &q in &on_face[i + 1..] {
                if seen.insert((p.min(q), p.max(q))) {
                    edges.push((p, q));
                }
            }
        }
    }
    log::debug!("mesh section: {} points, {} segments", points.len(), edges.len());

    Section { points, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;
    use nalgebra::Vector3;

    #[test]
    fn cube_section_is_one_square() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::z()).unwrap();
        let section = section_local(&cube, &plane, 1e-9);
        assert_eq!(section.points.len(), 4);
        assert_eq!(section.edges.len(), 4);
        let chains = section.chains();
        assert_eq!(chains.len(), 1);
        assert!(chains[0].cyclic);
        assert_eq!(chains[0].len(), 4);
    }

    #[test]
    fn finds_every_component() {
        let a = PolyMesh::cube(1.0);
        let both = a.merged(&a.translated(Vector3::new(3.0, 0.0, 0.0))).unwrap();
        let plane = Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::z()).unwrap();
        let chains = section_local(&both, &plane, 1e-9).chains();
        assert_eq!(chains.len(), 2);
        assert!(chains.iter().all(|c| c.cyclic && c.len() == 4));
    }

    #[test]
    fn open_strip_gives_open_chain() {
        let grid = PolyMesh::grid(3.0, 1.0, 3, 1);
        let plane = Plane::new(Point3::new(0.0, 0.5, 0.0), Vector3::y()).unwrap();
        let chains = section_local(&grid, &plane, 1e-9).chains();
        assert_eq!(chains.len(), 1);
        assert!(!chains[0].cyclic);
        assert_eq!(chains[0].len(), 4);
    }

    #[test]
    fn cut_along_the_top_face_outlines_it() {
        let cube = PolyMesh::cube(1.0);
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::z()).unwrap();
        let section = section_local(&cube, &plane, 1e-9);
        assert_eq!(section.points.len(), 4);
        let chains = section.chains();
        assert_eq!(chains.len(), 1);
        assert!(chains[0].cyclic);
    }
}
