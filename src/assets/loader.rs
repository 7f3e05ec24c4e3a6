//! Loader trait and errors

use std::fmt;
use std::path::Path;

use crate::scene::{Mesh, MeshInfo, Model};

/// Errors that can occur while loading assets
#[derive(Debug, Clone, PartialEq)]
pub enum AssetError {
    /// The file could not be read
    IoError(String),
    /// The file was read but could not be decoded
    ImportError(String),
    /// A primitive lacks a required vertex attribute
    MissingAttribute {
        mesh: String,
        attribute: &'static str,
    },
    /// The file contained no drawable geometry
    Empty(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ImportError(e) => write!(f, "Import error: {e}"),
            Self::MissingAttribute { mesh, attribute } => {
                write!(f, "Mesh '{mesh}' has no {attribute} attribute")
            }
            Self::Empty(path) => write!(f, "No meshes found in {path}"),
        }
    }
}

impl std::error::Error for AssetError {}

/// Factory for meshes read from a file.
pub trait AssetLoader {
    /// Load every mesh in `path`, each configured by `info`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded, or holds no
    /// geometry.
    fn load_meshes(&self, path: &Path, info: &MeshInfo) -> Result<Vec<Mesh>, AssetError>;

    /// Load a file as a single model named after the file stem.
    ///
    /// # Errors
    ///
    /// Same as [`AssetLoader::load_meshes`].
    fn load_model(&self, path: &Path, info: &MeshInfo) -> Result<Model, AssetError> {
        let meshes = self.load_meshes(path, info)?;
        let name = path
            .file_stem()
            .map_or_else(|| String::from("model"), |s| s.to_string_lossy().into_owned());
        Ok(Model::new(name, meshes))
    }
}
