//! glTF import

use std::path::Path;

use super::loader::{AssetError, AssetLoader};
use crate::scene::{Mesh, MeshInfo};

/// Loads `.gltf` and `.glb` files. Each primitive becomes one [`Mesh`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfLoader;

impl GltfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl AssetLoader for GltfLoader {
    fn load_meshes(&self, path: &Path, info: &MeshInfo) -> Result<Vec<Mesh>, AssetError> {
        let (document, buffers, _images) = gltf::import(path).map_err(|e| match e {
            gltf::Error::Io(io) => AssetError::IoError(format!("{}: {io}", path.display())),
            other => AssetError::ImportError(format!("{}: {other}", path.display())),
        })?;

        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            let base = mesh
                .name()
                .map_or_else(|| format!("mesh{}", mesh.index()), str::to_owned);

            for primitive in mesh.primitives() {
                let name = if primitive.index() == 0 {
                    base.clone()
                } else {
                    format!("{base}.{}", primitive.index())
                };

                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| AssetError::MissingAttribute {
                        mesh: name.clone(),
                        attribute: "POSITION",
                    })?
                    .collect();

                let normals: Option<Vec<[f32; 3]>> = if info.use_normals {
                    reader.read_normals().map(Iterator::collect)
                } else {
                    None
                };
                let uvs: Option<Vec<[f32; 2]>> = if info.use_texture {
                    reader.read_tex_coords(0).map(|t| t.into_f32().collect())
                } else {
                    None
                };
                let indices = reader.read_indices().map(|i| i.into_u32().collect());

                meshes.push(Mesh::from_data(
                    name,
                    &positions,
                    normals.as_deref(),
                    uvs.as_deref(),
                    indices,
                    info.clone(),
                ));
            }
        }

        if meshes.is_empty() {
            return Err(AssetError::Empty(path.display().to_string()));
        }

        log::info!("Loaded {} meshes from {}", meshes.len(), path.display());
        Ok(meshes)
    }
}
