//! Indexed triangle mesh buffers.
//!
//! A `TriangleMesh` is shared behind an `Arc` by all triangles that index
//! into it. Placing a mesh under a non-identity transform makes an explicit
//! deep copy with [`TriangleMesh::transformed`]; the template is never
//! modified.

use lumo_math::{Aabb, Transform, Vec3};

use crate::error::{Result, SceneError};
use crate::obj::{self, ObjOptions};
use crate::param::ParamSet;

/// Vertex positions and normals with per-triangle index triples into both.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions
    pub vertices: Vec<Vec3>,

    /// Unit vertex normals
    pub normals: Vec<Vec3>,

    /// Three position indices per triangle
    pub vertex_indices: Vec<u32>,

    /// Three normal indices per triangle
    pub normal_indices: Vec<u32>,

    /// Reject hits on the side facing away from the interpolated normal
    pub backface_cull: bool,
}

impl TriangleMesh {
    /// Create a mesh, validating every index.
    ///
    /// With `normals == None` smooth normals are computed and share the
    /// vertex indices.
    pub fn new(
        vertices: Vec<Vec3>,
        vertex_indices: Vec<u32>,
        normals: Option<(Vec<Vec3>, Vec<u32>)>,
        backface_cull: bool,
    ) -> Result<Self> {
        let (normals, normal_indices, compute) = match normals {
            Some((n, idx)) => (n, idx, false),
            None => (Vec::new(), vertex_indices.clone(), true),
        };

        let mut mesh = Self {
            vertices,
            normals,
            vertex_indices,
            normal_indices,
            backface_cull,
        };
        if compute {
            mesh.compute_normals();
        }
        mesh.validate()?;
        Ok(mesh)
    }

    /// Build a mesh from an `object` directive of type `trianglemesh`.
    ///
    /// Inline data uses `ntriangles`, `indices`, `vertices` and optional
    /// `normals`; a `filename` loads an OBJ file instead. The flags
    /// `reverse_vertex_order`, `compute_normals`, `flip_normals` and
    /// `backface_cull` apply to both.
    pub fn from_params(ps: &ParamSet) -> Result<Self> {
        let options = ObjOptions::from_params(ps);

        if ps.contains("filename") {
            let filename = ps.get_one_string("filename", "");
            return obj::load_obj(&filename, &options);
        }

        let n_triangles = ps.get_one_int("ntriangles", 0);
        if n_triangles <= 0 {
            return Err(SceneError::InvalidMesh(
                "\"ntriangles\" must be a positive integer".to_string(),
            ));
        }

        let indices = ps
            .get_int_array("indices")
            .ok_or_else(|| SceneError::InvalidMesh("missing \"indices\"".to_string()))?;
        if indices.len() != 3 * n_triangles as usize {
            return Err(SceneError::InvalidMesh(format!(
                "expected {} indices for {} triangles, got {}",
                3 * n_triangles,
                n_triangles,
                indices.len()
            )));
        }
        let indices = indices
            .into_iter()
            .map(|i| u32::try_from(i).map_err(|_| SceneError::InvalidMesh(format!("negative index {}", i))))
            .collect::<Result<Vec<u32>>>()?;

        let vertices = ps
            .get_point3_array("vertices")
            .ok_or_else(|| SceneError::InvalidMesh("missing \"vertices\"".to_string()))?;

        let normals = match ps.get_point3_array("normals") {
            Some(normals) if !options.compute_normals => {
                if normals.len() != vertices.len() {
                    return Err(SceneError::InvalidMesh(format!(
                        "{} normals for {} vertices",
                        normals.len(),
                        vertices.len()
                    )));
                }
                Some((normals, indices.clone()))
            }
            _ => None,
        };

        let mut mesh = Self::new(vertices, indices, normals, options.backface_cull)?;
        mesh.apply_options(&options);
        Ok(mesh)
    }

    /// Apply the winding/normal flags shared by inline and OBJ meshes.
    pub(crate) fn apply_options(&mut self, options: &ObjOptions) {
        if options.reverse_vertex_order {
            self.reverse_vertex_order();
        }
        if options.compute_normals {
            self.compute_normals();
        }
        if options.flip_normals {
            self.flip_normals();
        }
        self.backface_cull = options.backface_cull;
    }

    fn validate(&self) -> Result<()> {
        if self.vertex_indices.len() % 3 != 0 {
            return Err(SceneError::InvalidMesh(format!(
                "{} vertex indices is not a multiple of 3",
                self.vertex_indices.len()
            )));
        }
        if self.normal_indices.len() != self.vertex_indices.len() {
            return Err(SceneError::InvalidMesh(format!(
                "{} normal indices for {} vertex indices",
                self.normal_indices.len(),
                self.vertex_indices.len()
            )));
        }
        if let Some(&bad) = self
            .vertex_indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(SceneError::InvalidMesh(format!(
                "vertex index {} out of range ({} vertices)",
                bad,
                self.vertices.len()
            )));
        }
        if let Some(&bad) = self
            .normal_indices
            .iter()
            .find(|&&i| i as usize >= self.normals.len())
        {
            return Err(SceneError::InvalidMesh(format!(
                "normal index {} out of range ({} normals)",
                bad,
                self.normals.len()
            )));
        }
        Ok(())
    }

    /// Replace the normals with smooth vertex normals.
    ///
    /// Each vertex normal is the normalized sum of the (area-weighted) normals
    /// of the faces sharing it, with counter-clockwise front faces.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.vertices.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.vertex_indices.chunks_exact(3) {
            let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.vertices[i0];
            let face_normal = (self.vertices[i1] - p0).cross(self.vertices[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            // Default up normal for unreferenced or degenerate vertices
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = normals;
        self.normal_indices = self.vertex_indices.clone();
    }

    pub fn flip_normals(&mut self) {
        for n in &mut self.normals {
            *n = -*n;
        }
    }

    /// Swap the second and third corner of every triangle.
    pub fn reverse_vertex_order(&mut self) {
        for face in self.vertex_indices.chunks_exact_mut(3) {
            face.swap(1, 2);
        }
        for face in self.normal_indices.chunks_exact_mut(3) {
            face.swap(1, 2);
        }
    }

    /// Deep copy with positions mapped as points and normals as normals.
    pub fn transformed(&self, t: &Transform) -> TriangleMesh {
        TriangleMesh {
            vertices: self.vertices.iter().map(|&v| t.apply_point(v)).collect(),
            normals: self
                .normals
                .iter()
                .map(|&n| t.apply_normal(n).normalize_or_zero())
                .collect(),
            vertex_indices: self.vertex_indices.clone(),
            normal_indices: self.normal_indices.clone(),
            backface_cull: self.backface_cull,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_indices.len() / 3
    }

    /// The three corner positions of triangle `face`.
    #[inline]
    pub fn positions_of(&self, face: usize) -> [Vec3; 3] {
        let i = &self.vertex_indices[3 * face..3 * face + 3];
        [
            self.vertices[i[0] as usize],
            self.vertices[i[1] as usize],
            self.vertices[i[2] as usize],
        ]
    }

    /// The three corner normals of triangle `face`.
    #[inline]
    pub fn normals_of(&self, face: usize) -> [Vec3; 3] {
        let i = &self.normal_indices[3 * face..3 * face + 3];
        [
            self.normals[i[0] as usize],
            self.normals[i[1] as usize],
            self.normals[i[2] as usize],
        ]
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_point_cloud(&self.vertices)
    }
}
