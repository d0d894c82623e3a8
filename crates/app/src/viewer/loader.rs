//! Model loader strategies and the format dispatch.
//!
//! Loaders fetch asset bytes and wrap them in the renderable shape the
//! graphics layer expects. Parsing mesh data is left to that layer.

use std::time::Duration;

use async_trait::async_trait;
use showcase_core::format::{LoadStrategy, ModelAsset, ModelFormat, DEFAULT_MATERIAL_COLOR};

/// Errors from fetching a model asset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The asset server returned a non-2xx status code.
    #[error("Model fetch failed ({status}) for {url}")]
    Status { status: u16, url: String },

    /// The asset was fetched but contained no data.
    #[error("Model file at {url} is empty")]
    Empty { url: String },
}

/// Raw mesh data without material (mesh-only formats).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub source_url: String,
    pub data: Vec<u8>,
}

/// Surface applied to raw geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub color: &'static str,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: DEFAULT_MATERIAL_COLOR,
        }
    }
}

/// Geometry wrapped in a material, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

/// A pre-assembled scene subtree (formats that carry their own materials
/// and hierarchy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneObject {
    pub source_url: String,
    pub format: ModelFormat,
    pub data: Vec<u8>,
}

/// Output of a successful load: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderable {
    Geometry(Mesh),
    Scene(SceneObject),
}

/// Fetches model assets for each loader strategy.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Raw-geometry strategy.
    async fn load_geometry(&self, url: &str) -> Result<Geometry, LoadError>;

    /// Scene-graph strategy.
    async fn load_scene(&self, url: &str, format: ModelFormat) -> Result<SceneObject, LoadError>;
}

/// Run the loader strategy selected by the asset's declared format.
pub async fn dispatch(loader: &dyn ModelLoader, asset: &ModelAsset) -> Result<Renderable, LoadError> {
    match asset.format.strategy() {
        LoadStrategy::RawGeometry => {
            let geometry = loader.load_geometry(&asset.url).await?;
            Ok(Renderable::Geometry(Mesh {
                geometry,
                material: Material::default(),
            }))
        }
        LoadStrategy::SceneGraph => {
            let scene = loader.load_scene(&asset.url, asset.format).await?;
            Ok(Renderable::Scene(scene))
        }
    }
}

/// Loader that fetches assets over HTTP with [`reqwest`].
pub struct HttpModelLoader {
    client: reqwest::Client,
}

impl HttpModelLoader {
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(LoadError::Empty {
                url: url.to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ModelLoader for HttpModelLoader {
    async fn load_geometry(&self, url: &str) -> Result<Geometry, LoadError> {
        let data = self.fetch(url).await?;
        Ok(Geometry {
            source_url: url.to_string(),
            data,
        })
    }

    async fn load_scene(&self, url: &str, format: ModelFormat) -> Result<SceneObject, LoadError> {
        let data = self.fetch(url).await?;
        Ok(SceneObject {
            source_url: url.to_string(),
            format,
            data,
        })
    }
}
