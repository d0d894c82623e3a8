//! The persistence client seam.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use showcase_core::print::{Category, CreatedPrint, NewPrint, PrintCard};
use showcase_core::vote::{UpvoteRecord, VoteSnapshot};

use crate::error::BackendError;

/// Table holding one row per (user, print) upvote.
pub const TABLE_UPVOTES: &str = "upvotes";

/// Table holding uploaded prints.
pub const TABLE_PRINTS: &str = "prints";

/// Descriptor of an object written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    /// Path inside the bucket, e.g. `user-1/1718000000000.stl`.
    pub path: String,
}

/// Row store + object storage operations the controllers depend on.
///
/// Each call is atomic on the backend side; callers add no locking of
/// their own.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Insert an upvote row. A second row for the same pair fails with
    /// [`BackendError::Conflict`].
    async fn insert_upvote(&self, vote: &UpvoteRecord) -> Result<(), BackendError>;

    /// Delete the upvote row matching the pair.
    async fn delete_upvote(&self, vote: &UpvoteRecord) -> Result<(), BackendError>;

    /// Insert a print row and return the created row's id.
    async fn insert_print(&self, print: &NewPrint) -> Result<CreatedPrint, BackendError>;

    /// Store `data` at `path` inside `bucket`.
    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BackendError>;

    /// Public URL of a stored object. No network call.
    fn public_url(&self, object: &StoredObject) -> String;

    /// Published prints for the gallery, newest first.
    async fn list_prints(&self, limit: usize) -> Result<Vec<PrintCard>, BackendError>;

    /// Categories offered by the upload form.
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError>;

    /// Current upvote count of a print plus whether `user_id` has voted.
    async fn vote_snapshot(
        &self,
        print_id: &str,
        user_id: Option<&str>,
    ) -> Result<VoteSnapshot, BackendError>;
}
