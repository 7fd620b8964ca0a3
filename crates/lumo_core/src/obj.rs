//! Wavefront OBJ loading via `tobj`.

use std::path::Path;

use lumo_math::Vec3;

use crate::error::{Result, SceneError};
use crate::mesh::TriangleMesh;
use crate::param::ParamSet;

/// Flags applied after a mesh is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ObjOptions {
    pub reverse_vertex_order: bool,
    pub compute_normals: bool,
    pub flip_normals: bool,
    pub backface_cull: bool,
}

impl ObjOptions {
    pub fn from_params(ps: &ParamSet) -> Self {
        Self {
            reverse_vertex_order: ps.get_one_bool("reverse_vertex_order", false),
            compute_normals: ps.get_one_bool("compute_normals", false),
            flip_normals: ps.get_one_bool("flip_normals", false),
            backface_cull: ps.get_one_bool("backface_cull", false),
        }
    }
}

/// Load every model in an OBJ file into one triangle mesh.
///
/// Faces are triangulated. Files without normals, or with normals on only
/// some models, get smooth computed normals.
pub fn load_obj(path: impl AsRef<Path>, options: &ObjOptions) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )
    .map_err(|source| SceneError::MeshLoad {
        path: path.to_path_buf(),
        source,
    })?;

    if models.is_empty() {
        return Err(SceneError::InvalidMesh(format!(
            "no models found in {}",
            path.display()
        )));
    }

    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();
    let mut has_normals = true;

    for model in &models {
        let mesh = &model.mesh;
        let base = vertices.len() as u32;

        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );
        if mesh.normals.len() == mesh.positions.len() {
            normals.extend(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| Vec3::new(n[0], n[1], n[2]).normalize_or_zero()),
            );
        } else {
            has_normals = false;
        }
        indices.extend(mesh.indices.iter().map(|&i| i + base));
    }

    log::info!(
        "Loaded {}: {} vertices, {} triangles, normals: {}",
        path.display(),
        vertices.len(),
        indices.len() / 3,
        has_normals
    );

    let normals = if has_normals && !options.compute_normals {
        Some((normals, indices.clone()))
    } else {
        None
    };

    let mut mesh = TriangleMesh::new(vertices, indices, normals, options.backface_cull)?;
    mesh.apply_options(&ObjOptions {
        // Normals were either read or computed above.
        compute_normals: false,
        ..*options
    });
    Ok(mesh)
}
