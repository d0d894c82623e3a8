use std::sync::Arc;

use showcase_backend::{MemoryClient, PersistenceClient, RestClient, RestClientConfig};
use showcase_core::format::ModelAsset;
use showcase_core::print::{Category, PrintCard};

use crate::config::ShowcaseConfig;
use crate::error::AppResult;
use crate::upload::{Buckets, UploadService};
use crate::viewer::{HttpModelLoader, ModelLoader, ViewerSession};
use crate::vote::VoteController;

/// Shared handles every controller is built from.
///
/// Cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppContext {
    /// Row store and object storage.
    pub client: Arc<dyn PersistenceClient>,
    /// Fetches model assets for the viewer.
    pub loader: Arc<dyn ModelLoader>,
    pub config: Arc<ShowcaseConfig>,
    /// Hosted client behind `client`; `None` in demo mode.
    rest: Option<RestClient>,
}

impl AppContext {
    pub fn new(
        client: Arc<dyn PersistenceClient>,
        loader: Arc<dyn ModelLoader>,
        config: ShowcaseConfig,
    ) -> Self {
        Self {
            client,
            loader,
            config: Arc::new(config),
            rest: None,
        }
    }

    /// Wire the hosted backend when one is configured, otherwise the
    /// in-memory demo store.
    pub fn from_config(config: ShowcaseConfig) -> AppResult<Self> {
        let rest = match &config.backend {
            Some(backend) => {
                tracing::info!(url = %backend.url, "Using hosted backend");
                Some(RestClient::new(RestClientConfig {
                    base_url: backend.url.clone(),
                    anon_key: backend.anon_key.clone(),
                    request_timeout: config.request_timeout(),
                })?)
            }
            None => {
                tracing::info!("SUPABASE_URL not set, running in demo mode");
                None
            }
        };
        let client: Arc<dyn PersistenceClient> = match &rest {
            Some(rest) => Arc::new(rest.clone()),
            None => Arc::new(MemoryClient::with_demo_data()),
        };
        let loader = Arc::new(HttpModelLoader::new(config.request_timeout())?);
        Ok(Self {
            rest,
            ..Self::new(client, loader, config)
        })
    }

    /// Context whose remote calls act as the signed-in user. Hosted requests
    /// carry `access_token` as the bearer credential; the demo store has no
    /// auth and is shared unchanged.
    pub fn signed_in(&self, access_token: &str) -> Self {
        match &self.rest {
            Some(rest) => {
                let rest = rest.clone().with_access_token(access_token);
                Self {
                    client: Arc::new(rest.clone()),
                    rest: Some(rest),
                    ..self.clone()
                }
            }
            None => self.clone(),
        }
    }

    /// Hosted client behind [`Self::client`], if any.
    pub fn rest_client(&self) -> Option<&RestClient> {
        self.rest.as_ref()
    }

    pub fn is_demo(&self) -> bool {
        self.config.backend.is_none()
    }

    /// Vote controller seeded with values the caller already holds.
    pub fn vote_controller(
        &self,
        print_id: impl Into<String>,
        upvote_count: u64,
        has_voted: bool,
    ) -> VoteController {
        VoteController::new(Arc::clone(&self.client), print_id, upvote_count, has_voted)
    }

    /// Vote controller seeded from the backend.
    pub async fn mount_vote_controller(
        &self,
        print_id: impl Into<String>,
        user_id: Option<&str>,
    ) -> AppResult<VoteController> {
        VoteController::mount(Arc::clone(&self.client), print_id, user_id).await
    }

    pub fn upload_service(&self) -> UploadService {
        UploadService::new(
            Arc::clone(&self.client),
            Buckets {
                models: self.config.models_bucket.clone(),
                images: self.config.images_bucket.clone(),
            },
        )
    }

    /// First page of the gallery, newest first.
    pub async fn gallery(&self) -> AppResult<Vec<PrintCard>> {
        Ok(self.client.list_prints(self.config.gallery_page_size).await?)
    }

    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.client.list_categories().await?)
    }

    /// Mount a viewer for `asset`. Must be called from within a tokio runtime.
    pub fn open_viewer(&self, asset: ModelAsset) -> ViewerSession {
        ViewerSession::mount(Arc::clone(&self.loader), asset)
    }
}
