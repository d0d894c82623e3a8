//! In-process persistence client.
//!
//! Behaves like the hosted backend for everything the controllers rely
//! on: the upvote uniqueness invariant (duplicate inserts fail with
//! [`BackendError::Conflict`]), server-maintained upvote counters, and
//! public URLs for stored objects. Used by demo mode and by tests, which
//! can also inject failures, add latency, and inspect the call log.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use showcase_core::demo::{demo_categories, demo_prints};
use showcase_core::print::{Category, CreatedPrint, NewPrint, PrintCard};
use showcase_core::vote::{UpvoteRecord, VoteSnapshot};
use tokio::sync::RwLock;

use crate::client::{PersistenceClient, StoredObject};
use crate::error::BackendError;

/// Base URL used for public object URLs.
const DEFAULT_BASE_URL: &str = "memory://showcase";

/// A persistence call, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InsertUpvote,
    DeleteUpvote,
    InsertPrint,
    UploadObject,
    ListPrints,
    ListCategories,
    VoteSnapshot,
}

impl Operation {
    /// Whether the call writes to the backend.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::InsertUpvote | Self::DeleteUpvote | Self::InsertPrint | Self::UploadObject
        )
    }
}

#[derive(Debug, Clone)]
struct StoredBlob {
    content_type: String,
    data: Bytes,
}

#[derive(Default)]
struct MemoryState {
    /// Newest first.
    prints: Vec<PrintCard>,
    upvotes: HashSet<UpvoteRecord>,
    objects: HashMap<(String, String), StoredBlob>,
    categories: Vec<Category>,
}

/// In-memory [`PersistenceClient`].
pub struct MemoryClient {
    state: RwLock<MemoryState>,
    base_url: String,
    latency: Option<Duration>,
    calls: Mutex<Vec<Operation>>,
    failures: Mutex<HashMap<Operation, VecDeque<String>>>,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            base_url: DEFAULT_BASE_URL.to_string(),
            latency: None,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Store seeded with the demo gallery and categories.
    pub fn with_demo_data() -> Self {
        Self::new()
            .with_prints(demo_prints())
            .with_categories(demo_categories())
    }

    pub fn with_prints(mut self, mut prints: Vec<PrintCard>) -> Self {
        prints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.state.get_mut().prints = prints;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.state.get_mut().categories = categories;
        self
    }

    /// Delay every call by `latency` before it touches the store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call of `operation` fail with
    /// [`BackendError::Unavailable`]. Queued failures are consumed in order.
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        lock(&self.failures)
            .entry(operation)
            .or_default()
            .push_back(message.into());
    }

    /// Record an upvote directly, as if another client had inserted it.
    /// Does not touch the print's counter or the call log.
    pub async fn seed_upvote(&self, vote: UpvoteRecord) {
        self.state.write().await.upvotes.insert(vote);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        lock(&self.calls).clone()
    }

    /// Number of write calls made so far.
    pub fn mutation_count(&self) -> usize {
        lock(&self.calls).iter().filter(|op| op.is_mutation()).count()
    }

    pub async fn has_upvote(&self, vote: &UpvoteRecord) -> bool {
        self.state.read().await.upvotes.contains(vote)
    }

    pub async fn print(&self, print_id: &str) -> Option<PrintCard> {
        self.state
            .read()
            .await
            .prints
            .iter()
            .find(|p| p.id == print_id)
            .cloned()
    }

    /// Contents and content type of a stored object.
    pub async fn object(&self, bucket: &str, path: &str) -> Option<(String, Vec<u8>)> {
        self.state
            .read()
            .await
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .map(|blob| (blob.content_type.clone(), blob.data.to_vec()))
    }

    // ---- private helpers ----

    /// Record the call, apply latency, and pop an injected failure.
    async fn enter(&self, operation: Operation) -> Result<(), BackendError> {
        lock(&self.calls).push(operation);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let injected = lock(&self.failures)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match injected {
            Some(message) => Err(BackendError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn not_found(print_id: &str) -> BackendError {
    BackendError::Api {
        status: 404,
        code: None,
        message: format!("Print {print_id} not found"),
    }
}

#[async_trait]
impl PersistenceClient for MemoryClient {
    async fn insert_upvote(&self, vote: &UpvoteRecord) -> Result<(), BackendError> {
        self.enter(Operation::InsertUpvote).await?;
        let mut state = self.state.write().await;

        if !state.upvotes.insert(vote.clone()) {
            return Err(BackendError::Conflict(format!(
                "Key (user_id, print_id)=({}, {}) already exists.",
                vote.user_id, vote.print_id
            )));
        }
        if let Some(print) = state.prints.iter_mut().find(|p| p.id == vote.print_id) {
            print.upvote_count = print.upvote_count.saturating_add(1);
        }
        Ok(())
    }

    async fn delete_upvote(&self, vote: &UpvoteRecord) -> Result<(), BackendError> {
        self.enter(Operation::DeleteUpvote).await?;
        let mut state = self.state.write().await;

        // Deleting a missing row matches nothing and still succeeds.
        if state.upvotes.remove(vote) {
            if let Some(print) = state.prints.iter_mut().find(|p| p.id == vote.print_id) {
                print.upvote_count = print.upvote_count.saturating_sub(1);
            }
        }
        Ok(())
    }

    async fn insert_print(&self, print: &NewPrint) -> Result<CreatedPrint, BackendError> {
        self.enter(Operation::InsertPrint).await?;
        let mut state = self.state.write().await;

        let category = state
            .categories
            .iter()
            .find(|c| c.id == print.category_id)
            .cloned();
        let id = uuid::Uuid::new_v4().to_string();

        state.prints.insert(
            0,
            PrintCard {
                id: id.clone(),
                title: print.title.clone(),
                description: print.description.clone(),
                preview_image_url: Some(print.preview_image_url.clone()),
                upvote_count: 0,
                view_count: 0,
                comment_count: 0,
                category_name: category.as_ref().map(|c| c.name.clone()),
                category_slug: category.map(|c| c.slug),
                username: print.user_id.clone(),
                display_name: None,
                avatar_url: None,
                created_at: print.published_at,
            },
        );
        Ok(CreatedPrint { id })
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BackendError> {
        self.enter(Operation::UploadObject).await?;
        let mut state = self.state.write().await;

        let key = (bucket.to_string(), path.to_string());
        if state.objects.contains_key(&key) {
            return Err(BackendError::Api {
                status: 409,
                code: Some("Duplicate".into()),
                message: "The resource already exists".into(),
            });
        }
        state.objects.insert(
            key,
            StoredBlob {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }

    fn public_url(&self, object: &StoredObject) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, object.bucket, object.path
        )
    }

    async fn list_prints(&self, limit: usize) -> Result<Vec<PrintCard>, BackendError> {
        self.enter(Operation::ListPrints).await?;
        let state = self.state.read().await;
        Ok(state.prints.iter().take(limit).cloned().collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        self.enter(Operation::ListCategories).await?;
        let mut categories = self.state.read().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn vote_snapshot(
        &self,
        print_id: &str,
        user_id: Option<&str>,
    ) -> Result<VoteSnapshot, BackendError> {
        self.enter(Operation::VoteSnapshot).await?;
        let state = self.state.read().await;

        let print = state
            .prints
            .iter()
            .find(|p| p.id == print_id)
            .ok_or_else(|| not_found(print_id))?;
        let has_voted = user_id
            .map(|user_id| state.upvotes.contains(&UpvoteRecord::new(user_id, print_id)))
            .unwrap_or(false);

        Ok(VoteSnapshot {
            upvote_count: print.upvote_count,
            has_voted,
        })
    }
}
