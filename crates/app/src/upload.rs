//! Upload submission pipeline.
//!
//! A submission validates the draft, uploads the model file and the preview
//! image, then creates the `prints` row pointing at their public URLs. A
//! draft that fails validation issues no remote call at all.

use std::sync::Arc;

use showcase_backend::{BackendError, PersistenceClient, StoredObject};
use showcase_core::navigation::Navigation;
use showcase_core::upload::{SelectedFile, UploadDraft};

use crate::error::{AppError, AppResult, UploadStage};

/// Storage buckets the pipeline writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub models: String,
    pub images: String,
}

/// Submits upload drafts.
pub struct UploadService {
    client: Arc<dyn PersistenceClient>,
    buckets: Buckets,
}

impl UploadService {
    pub fn new(client: Arc<dyn PersistenceClient>, buckets: Buckets) -> Self {
        Self { client, buckets }
    }

    /// Submit `draft` on behalf of `user_id`.
    ///
    /// On success the caller should navigate to the returned detail view.
    /// Failures name the pipeline step that failed; objects uploaded by
    /// earlier steps are left in place.
    pub async fn submit(&self, user_id: &str, draft: &UploadDraft) -> AppResult<Navigation> {
        let ready = draft.check_ready().inspect_err(|err| {
            tracing::debug!(%user_id, error = %err, "Upload draft rejected");
        })?;

        let model = self
            .store(
                &self.buckets.models,
                user_id,
                ready.model,
                Some(ready.model_format.tag().to_string()),
            )
            .await
            .map_err(|source| AppError::Upload {
                stage: UploadStage::ModelFile,
                source,
            })?;
        let model_url = self.client.public_url(&model);

        let image = self
            .store(
                &self.buckets.images,
                user_id,
                ready.image,
                ready.image.storage_extension(),
            )
            .await
            .map_err(|source| AppError::Upload {
                stage: UploadStage::PreviewImage,
                source,
            })?;
        let image_url = self.client.public_url(&image);

        let row = ready.to_new_print(&user_id.to_string(), model_url, image_url, chrono::Utc::now());
        let created = self
            .client
            .insert_print(&row)
            .await
            .map_err(|source| AppError::Upload {
                stage: UploadStage::PrintRecord,
                source,
            })?;

        tracing::info!(
            print_id = %created.id,
            %user_id,
            format = %row.file_format,
            size_bytes = row.file_size_bytes,
            "Print published",
        );
        Ok(Navigation::PrintDetail {
            print_id: created.id,
        })
    }

    async fn store(
        &self,
        bucket: &str,
        user_id: &str,
        file: &SelectedFile,
        extension: Option<String>,
    ) -> Result<StoredObject, BackendError> {
        let path = object_path(user_id, chrono::Utc::now().timestamp_millis(), extension.as_deref());
        let stored = self
            .client
            .upload_object(bucket, &path, file.content_type(), file.bytes())
            .await
            .inspect_err(|err| {
                tracing::error!(bucket, path = %path, error = %err, "Object upload failed");
            })?;
        tracing::debug!(bucket, path = %stored.path, size_bytes = file.size_bytes(), "Object stored");
        Ok(stored)
    }
}

/// `{user_id}/{unix_millis}.{ext}`, or without the extension when none is
/// known.
fn object_path(user_id: &str, unix_millis: i64, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{user_id}/{unix_millis}.{ext}"),
        None => format!("{user_id}/{unix_millis}"),
    }
}
