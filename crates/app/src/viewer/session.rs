//! Mounted viewer state.
//!
//! Each load runs on its own task tagged with a generation number. A result
//! is written only if its generation is still current, so a load that
//! finishes after an unmount, a remount or an asset switch is discarded.

use std::sync::{Arc, Mutex, MutexGuard};

use showcase_core::format::ModelAsset;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loader::{dispatch, Mesh, ModelLoader, Renderable, SceneObject};

/// The single renderable the viewer holds. At most one shape is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelSlot {
    #[default]
    Empty,
    Geometry(Mesh),
    Scene(SceneObject),
}

impl ModelSlot {
    pub fn geometry(&self) -> Option<&Mesh> {
        match self {
            Self::Geometry(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn scene(&self) -> Option<&SceneObject> {
        match self {
            Self::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Renderable> for ModelSlot {
    fn from(renderable: Renderable) -> Self {
        match renderable {
            Renderable::Geometry(mesh) => Self::Geometry(mesh),
            Renderable::Scene(scene) => Self::Scene(scene),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    Loading,
    Ready,
    /// The last load failed. The slot stays empty until [`ViewerSession::retry`].
    Failed { message: String },
    Unmounted,
}

#[derive(Debug)]
struct Inner {
    generation: u64,
    status: ViewerStatus,
    slot: ModelSlot,
}

/// A mounted 3D viewer for one model asset.
pub struct ViewerSession {
    loader: Arc<dyn ModelLoader>,
    asset: ModelAsset,
    inner: Arc<Mutex<Inner>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ViewerSession {
    /// Mount a viewer and start loading `asset`. Must be called from within
    /// a tokio runtime.
    pub fn mount(loader: Arc<dyn ModelLoader>, asset: ModelAsset) -> Self {
        let mut session = Self {
            loader,
            asset,
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                status: ViewerStatus::Loading,
                slot: ModelSlot::Empty,
            })),
            cancel: CancellationToken::new(),
            task: None,
        };
        session.start_load();
        session
    }

    pub fn asset(&self) -> &ModelAsset {
        &self.asset
    }

    pub fn status(&self) -> ViewerStatus {
        lock(&self.inner).status.clone()
    }

    pub fn slot(&self) -> ModelSlot {
        lock(&self.inner).slot.clone()
    }

    /// Number of loads started so far, including discarded ones.
    pub fn generation(&self) -> u64 {
        lock(&self.inner).generation
    }

    /// Switch to a different asset. Any in-flight load is abandoned.
    pub fn load_model(&mut self, asset: ModelAsset) {
        if self.is_unmounted() {
            return;
        }
        self.asset = asset;
        self.start_load();
    }

    /// Discard the rendered model and load the same asset again, which
    /// restores the initial camera framing.
    pub fn reset_camera(&mut self) {
        if self.is_unmounted() {
            return;
        }
        tracing::debug!(url = %self.asset.url, "Viewer remount requested");
        self.start_load();
    }

    /// Reload after a failure. Returns `false` when the viewer is not in the
    /// failed state.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.status(), ViewerStatus::Failed { .. }) {
            return false;
        }
        self.start_load();
        true
    }

    /// Tear the viewer down. Pending loads are cancelled and their results
    /// ignored.
    pub fn unmount(&mut self) {
        self.cancel.cancel();
        let mut inner = lock(&self.inner);
        inner.generation += 1;
        inner.status = ViewerStatus::Unmounted;
        inner.slot = ModelSlot::Empty;
    }

    /// Wait for the most recently started load task to finish.
    pub async fn settled(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "Viewer load task panicked");
            }
        }
    }

    fn is_unmounted(&self) -> bool {
        lock(&self.inner).status == ViewerStatus::Unmounted
    }

    fn start_load(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();

        let generation = {
            let mut inner = lock(&self.inner);
            inner.generation += 1;
            inner.status = ViewerStatus::Loading;
            inner.slot = ModelSlot::Empty;
            inner.generation
        };

        let loader = Arc::clone(&self.loader);
        let asset = self.asset.clone();
        let inner = Arc::clone(&self.inner);
        let cancel = self.cancel.clone();

        self.task = Some(tokio::spawn(async move {
            // A load that already finished is still checked against the
            // generation below.
            let result = tokio::select! {
                biased;
                result = dispatch(loader.as_ref(), &asset) => result,
                _ = cancel.cancelled() => {
                    tracing::debug!(url = %asset.url, generation, "Model load cancelled");
                    return;
                }
            };

            let mut inner = lock(&inner);
            if inner.generation != generation {
                tracing::debug!(url = %asset.url, generation, "Discarding stale model load");
                return;
            }
            match result {
                Ok(renderable) => {
                    tracing::debug!(url = %asset.url, format = %asset.format, "Model loaded");
                    inner.slot = renderable.into();
                    inner.status = ViewerStatus::Ready;
                }
                Err(err) => {
                    tracing::error!(url = %asset.url, format = %asset.format, error = %err, "Model load failed");
                    inner.status = ViewerStatus::Failed {
                        message: err.to_string(),
                    };
                }
            }
        }));
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
