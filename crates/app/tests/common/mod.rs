use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use showcase_app::viewer::{Geometry, LoadError, ModelLoader, SceneObject};
use showcase_backend::{MemoryClient, PersistenceClient};
use showcase_core::format::ModelFormat;
use showcase_core::upload::{SelectedFile, UploadDraft};
use tokio::sync::Semaphore;

/// In-memory store seeded with the demo gallery (print "1" has 142 upvotes).
pub fn demo_client() -> Arc<MemoryClient> {
    Arc::new(MemoryClient::with_demo_data())
}

pub fn as_client(client: &Arc<MemoryClient>) -> Arc<dyn PersistenceClient> {
    Arc::clone(client) as Arc<dyn PersistenceClient>
}

pub fn stl_file() -> SelectedFile {
    SelectedFile::new("benchy.STL", "model/stl", vec![0u8; 64])
}

pub fn png_file() -> SelectedFile {
    SelectedFile::new("benchy.png", "image/png", vec![1u8; 16])
}

/// A draft that passes every submission check.
pub fn complete_draft() -> UploadDraft {
    let mut draft = UploadDraft::default();
    draft.title = "Benchy".into();
    draft.description = "Calibration boat".into();
    draft.category_id = Some(1);
    draft.select_model_file(stl_file()).expect("stl accepted");
    draft.select_preview_image(png_file()).expect("png accepted");
    draft
}

/// Model loader whose loads can be held back and made to fail.
///
/// With a gate, each load waits for one permit before returning.
pub struct StubLoader {
    gate: Option<Arc<Semaphore>>,
    failures: AtomicUsize,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl StubLoader {
    pub fn open() -> Arc<Self> {
        Arc::new(Self {
            gate: None,
            failures: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let loader = Arc::new(Self {
            gate: Some(Arc::clone(&gate)),
            failures: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        });
        (loader, gate)
    }

    /// Make the next `n` loads fail with a 404.
    pub fn failing(n: usize) -> Arc<Self> {
        Arc::new(Self {
            gate: None,
            failures: AtomicUsize::new(n),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Loads that got past the gate and returned a result.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(LoadError::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        Ok(url.as_bytes().to_vec())
    }
}

#[async_trait]
impl ModelLoader for StubLoader {
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
