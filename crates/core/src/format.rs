//! Model file formats and the format → loader-strategy dispatch table.
//!
//! The viewer never inspects file contents to pick a loader: the declared
//! format tag alone decides which strategy runs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Colour of the material wrapped around raw geometry (mesh-only formats).
pub const DEFAULT_MATERIAL_COLOR: &str = "#888888";

/// All accepted model file extensions, lowercase and without the dot.
pub const MODEL_EXTENSIONS: &[&str] = &["stl", "obj", "gltf", "glb"];

// ---------------------------------------------------------------------------
// ModelFormat
// ---------------------------------------------------------------------------

/// Declared format of an uploaded model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Stl,
    Obj,
    Gltf,
    Glb,
}

/// How a format is turned into something renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Mesh-only data: the loader yields bare geometry which the viewer
    /// wraps in the default material.
    RawGeometry,
    /// The loader yields a pre-assembled scene subtree with its own
    /// materials.
    SceneGraph,
}

impl ModelFormat {
    /// Parse a format tag (`"stl"`, `"GLB"`, ...). Case-insensitive.
    pub fn from_tag(tag: &str) -> Result<Self, CoreError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "obj" => Ok(Self::Obj),
            "gltf" => Ok(Self::Gltf),
            "glb" => Ok(Self::Glb),
            other => Err(CoreError::Validation(format!(
                "Unknown model format '{other}'. Must be one of: {}",
                MODEL_EXTENSIONS.join(", ")
            ))),
        }
    }

    /// Derive the format from a file name's extension, if it has a
    /// recognised one.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = file_extension(name)?;
        Self::from_tag(ext).ok()
    }

    /// Lowercase tag as stored in the `file_format` column.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Gltf => "gltf",
            Self::Glb => "glb",
        }
    }

    /// The loader strategy for this format.
    pub fn strategy(self) -> LoadStrategy {
        match self {
            Self::Stl => LoadStrategy::RawGeometry,
            Self::Obj | Self::Gltf | Self::Glb => LoadStrategy::SceneGraph,
        }
    }
}

impl std::fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for ModelFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

// ---------------------------------------------------------------------------
// ModelAsset
// ---------------------------------------------------------------------------

/// A model file the viewer should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAsset {
    pub url: String,
    pub format: ModelFormat,
}

impl ModelAsset {
    pub fn new(url: impl Into<String>, format: ModelFormat) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }
}

/// Extension after the last dot, without the dot. `None` when the name
/// has no dot or ends in one.
pub fn file_extension(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
