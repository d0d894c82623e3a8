//! 3D model viewer: format dispatch and mounted-session lifecycle.

pub mod loader;
pub mod session;

pub use loader::{
    dispatch, Geometry, HttpModelLoader, LoadError, Material, Mesh, ModelLoader, Renderable,
    SceneObject,
};
pub use session::{ModelSlot, ViewerSession, ViewerStatus};
