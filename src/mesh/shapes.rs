//! Primitive shapes as `PolyMesh`es
//!
//! Every builder shares vertices between neighbouring faces, so the results are
//! watertight where the shape is closed and carry real boundary edges where it is
//! open (grids, tubes). Faces are wound counter-clockwise seen from outside.

use crate::errors::MeshError;
use crate::float_types::{PI, Real, TAU};
use crate::mesh::PolyMesh;
use nalgebra::{Point3, Vector3};

impl PolyMesh {
    /// Axis-aligned box with one corner at the origin.
    ///
    /// ## **Vertex Indexing**
    /// ```text
    ///     7-------6
    ///    /|      /|
    ///   4-------5 |
    ///   | |     | |
    ///   | 3-----|-2
    ///   |/      |/
    ///   0-------1
    /// ```
    ///
    /// ## **Faces**
    /// - **Bottom**: [0,3,2,1] (z=0, normal -Z)
    /// - **Top**: [4,5,6,7] (z=height, normal +Z)
    /// - **Front**: [0,1,5,4] (y=0, normal -Y)
    /// - **Back**: [3,7,6,2] (y=length, normal +Y)
    /// - **Left**: [0,4,7,3] (x=0, normal -X)
    /// - **Right**: [1,2,6,5] (x=width, normal +X)
    pub fn cuboid(width: Real, length: Real, height: Real) -> PolyMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),          // 0: origin
            Point3::new(width, 0.0, 0.0),        // 1: +X
            Point3::new(width, length, 0.0),     // 2: +X+Y
            Point3::new(0.0, length, 0.0),       // 3: +Y
            Point3::new(0.0, 0.0, height),       // 4: +Z
            Point3::new(width, 0.0, height),     // 5: +X+Z
            Point3::new(width, length, height),  // 6: +X+Y+Z
            Point3::new(0.0, length, height),    // 7: +Y+Z
        ];
        let faces = vec![
            vec![0, 3, 2, 1], // Bottom
            vec![4, 5, 6, 7], // Top
            vec![0, 1, 5, 4], // Front
            vec![3, 7, 6, 2], // Back
            vec![0, 4, 7, 3], // Left
            vec![1, 2, 6, 5], // Right
        ];
        Self::from_valid(vertices, faces)
    }

    /// Cube with side `size`, corner at the origin
    pub fn cube(size: Real) -> PolyMesh {
        Self::cuboid(size, size, size)
    }

    /// Flat patch of `cols x rows` quads in the XY plane spanning `width x length`.
    ///
    /// Vertex `(i, j)` (column, row) has index `j * (cols + 1) + i`; face `(i, j)` has
    /// index `j * cols + i`.
    pub fn grid(width: Real, length: Real, cols: usize, rows: usize) -> PolyMesh {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let mut vertices = Vec::with_capacity((cols + 1) * (rows + 1));
        for j in 0..=rows {
            for i in 0..=cols {
                vertices.push(Point3::new(
                    width * i as Real / cols as Real,
                    length * j as Real / rows as Real,
                    0.0,
                ));
            }
        }
        let stride = cols + 1;
        let mut faces = Vec::with_capacity(cols * rows);
        for j in 0..rows {
            for i in 0..cols {
                let v = j * stride + i;
                faces.push(vec![v, v + 1, v + 1 + stride, v + stride]);
            }
        }
        Self::from_valid(vertices, faces)
    }

    /// Open cylinder along +Z: `rings` bands of `segments` quads, no caps.
    ///
    /// Ring `r` (0..=rings) sits at `z = height * r / rings`; vertex `s` of ring `r` has
    /// index `r * segments + s` at angle `TAU * s / segments`. Face `(r, s)` spans rings
    /// `r` and `r + 1` between angles `s` and `s + 1` and has index `r * segments + s`.
    pub fn tube(radius: Real, height: Real, segments: usize, rings: usize) -> PolyMesh {
        let segments = segments.max(3);
        let rings = rings.max(1);
        let mut vertices = Vec::with_capacity(segments * (rings + 1));
        for r in 0..=rings {
            let z = height * r as Real / rings as Real;
            for s in 0..segments {
                let theta = TAU * s as Real / segments as Real;
                vertices.push(Point3::new(radius * theta.cos(), radius * theta.sin(), z));
            }
        }
        let mut faces = Vec::with_capacity(segments * rings);
        for r in 0..rings {
            for s in 0..segments {
                let s1 = (s + 1) % segments;
                faces.push(vec![
                    r * segments + s,
                    r * segments + s1,
                    (r + 1) * segments + s1,
                    (r + 1) * segments + s,
                ]);
            }
        }
        Self::from_valid(vertices, faces)
    }

    /// Closed prism with regular `sides`-gon caps, centred on the Z axis.
    ///
    /// Face 0 is the bottom cap, face 1 the top cap (both n-gons), then `sides`
    /// side quads.
    pub fn prism(radius: Real, height: Real, sides: usize) -> PolyMesh {
        let sides = sides.max(3);
        let mut vertices = Vec::with_capacity(2 * sides);
        for z in [0.0, height] {
            for s in 0..sides {
                let theta = TAU * s as Real / sides as Real;
                vertices.push(Point3::new(radius * theta.cos(), radius * theta.sin(), z));
            }
        }
        let mut faces = Vec::with_capacity(sides + 2);
        faces.push((0..sides).rev().collect());
        faces.push((sides..2 * sides).collect());
        for s in 0..sides {
            let s1 = (s + 1) % sides;
            faces.push(vec![s, s1, sides + s1, sides + s]);
        }
        Self::from_valid(vertices, faces)
    }

    /// UV sphere centred on the origin with triangle fans at the two poles.
    ///
    /// Vertex 0 is the south pole, the last vertex the north pole; the pole vertices
    /// have valence `segments`.
    pub fn uv_sphere(radius: Real, segments: usize, stacks: usize) -> PolyMesh {
        let segments = segments.max(3);
        let stacks = stacks.max(2);
        let mut vertices = Vec::with_capacity(segments * (stacks - 1) + 2);
        vertices.push(Point3::new(0.0, 0.0, -radius));
        for k in 1..stacks {
            let phi = -PI / 2.0 + PI * k as Real / stacks as Real;
            for s in 0..segments {
                let theta = TAU * s as Real / segments as Real;
                let dir = Vector3::new(phi.cos() * theta.cos(), phi.cos() * theta.sin(), phi.sin());
                vertices.push(Point3::from(dir * radius));
            }
        }
        vertices.push(Point3::new(0.0, 0.0, radius));
        let north = vertices.len() - 1;
        let ring = |k: usize, s: usize| 1 + (k - 1) * segments + s % segments;

        let mut faces = Vec::new();
        for s in 0..segments {
            faces.push(vec![0, ring(1, s + 1), ring(1, s)]);
        }
        for k in 1..stacks - 1 {
            for s in 0..segments {
                faces.push(vec![ring(k, s), ring(k, s + 1), ring(k + 1, s + 1), ring(k + 1, s)]);
            }
        }
        for s in 0..segments {
            faces.push(vec![ring(stacks - 1, s), ring(stacks - 1, s + 1), north]);
        }
        Self::from_valid(vertices, faces)
    }

    /// A copy of this mesh moved by `offset`
    pub fn translated(&self, offset: Vector3<Real>) -> PolyMesh {
        let vertices = self.vertices().iter().map(|p| p + offset).collect();
        Self::from_valid(vertices, self.faces().to_vec())
    }

    /// Disjoint union of two meshes; `other`'s faces follow this mesh's faces.
    pub fn merged(&self, other: &PolyMesh) -> Result<PolyMesh, MeshError> {
        let offset = self.vertices().len();
        let mut vertices = self.vertices().to_vec();
        vertices.extend_from_slice(other.vertices());
        let mut faces = self.faces().to_vec();
        faces.extend(
            other
                .faces()
                .iter()
                .map(|f| f.iter().map(|&v| v + offset).collect::<Vec<_>>()),
        );
        PolyMesh::new(vertices, faces)
    }

    /// Builders produce well-formed faces by construction; a failure here means the
    /// inputs were non-finite, in which case an empty mesh is returned.
    fn from_valid(vertices: Vec<Point3<Real>>, faces: Vec<Vec<usize>>) -> PolyMesh {
        PolyMesh::new(vertices, faces).unwrap_or_else(|err| {
            log::warn!("shape builder produced an invalid mesh: {}", err);
            PolyMesh::empty()
        })
    }

    /// A mesh without vertices or faces
    pub fn empty() -> PolyMesh {
        PolyMesh {
            vertices: Vec::new(),
            faces: Vec::new(),
            edges: Vec::new(),
            face_edges: Vec::new(),
            edge_faces: Vec::new(),
            vertex_faces: Vec::new(),
            vertex_edges: Vec::new(),
            bounding_box: Default::default(),
        }
    }
}
