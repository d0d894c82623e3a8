//! REST client for the hosted backend.
//!
//! Rows go through the PostgREST endpoints under `/rest/v1`, files through
//! the storage endpoints under `/storage/v1`, both using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use showcase_core::print::{Category, CreatedPrint, NewPrint, PrintCard};
use showcase_core::vote::{UpvoteRecord, VoteSnapshot};

use crate::client::{PersistenceClient, StoredObject, TABLE_PRINTS, TABLE_UPVOTES};
use crate::error::BackendError;

/// View joining prints with their category and author.
const VIEW_PRINT_CARDS: &str = "print_cards";

const TABLE_CATEGORIES: &str = "categories";

/// Ask PostgREST for a single JSON object instead of an array.
const PGRST_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Connection settings for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key.
    pub anon_key: String,
    pub request_timeout: Duration,
}

/// HTTP client for one backend project.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    /// Signed-in user's JWT. Requests fall back to the anon key without it.
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpvoteCountRow {
    upvote_count: u64,
}

impl RestClient {
    /// Build a client with its own connection pool.
    pub fn new(config: RestClientConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: RestClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key,
            access_token: None,
        }
    }

    /// Act on behalf of a signed-in user.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Token sent as the bearer credential, if signed in.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn rest_url(&self, relation: &str) -> String {
        format!("{}/rest/v1/{relation}", self.base_url)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{path}", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
    }

    // ---- private helpers ----

    /// Pass 2xx responses through; turn anything else into a classified
    /// [`BackendError`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendError::from_response(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<(), BackendError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl PersistenceClient for RestClient {
    async fn insert_upvote(&self, vote: &UpvoteRecord) -> Result<(), BackendError> {
        let response = self
            .authed(self.client.post(self.rest_url(TABLE_UPVOTES)))
            .header("Prefer", "return=minimal")
            .json(vote)
            .send()
            .await?;

        Self::check_status(response).await
    }

    async fn delete_upvote(&self, vote: &UpvoteRecord) -> Result<(), BackendError> {
        let response = self
            .authed(self.client.delete(self.rest_url(TABLE_UPVOTES)))
            .query(&[
                ("user_id", eq(&vote.user_id)),
                ("print_id", eq(&vote.print_id)),
            ])
            .send()
            .await?;

        Self::check_status(response).await
    }

    async fn insert_print(&self, print: &NewPrint) -> Result<CreatedPrint, BackendError> {
        let response = self
            .authed(self.client.post(self.rest_url(TABLE_PRINTS)))
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .header(ACCEPT, PGRST_OBJECT)
            .json(print)
            .send()
            .await?;

        let created: CreatedPrint = Self::parse_response(response).await?;
        tracing::debug!(print_id = %created.id, "Print row created");
        Ok(created)
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BackendError> {
        let size = data.len();
        let response = self
            .authed(self.client.post(self.object_url(bucket, path)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;

        let uploaded: UploadResponse = Self::parse_response(response).await?;

        // `Key` is `<bucket>/<path>`; keep the requested path if it is absent.
        let stored_path = uploaded
            .key
            .as_deref()
            .and_then(|key| key.strip_prefix(bucket))
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
            .to_string();

        tracing::debug!(bucket, path = %stored_path, size, "Object uploaded");
        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: stored_path,
        })
    }

    fn public_url(&self, object: &StoredObject) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, object.bucket, object.path
        )
    }

    async fn list_prints(&self, limit: usize) -> Result<Vec<PrintCard>, BackendError> {
        let response = self
            .authed(self.client.get(self.rest_url(VIEW_PRINT_CARDS)))
            .query(&[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        let response = self
            .authed(self.client.get(self.rest_url(TABLE_CATEGORIES)))
            .query(&[("select", "id,name,slug"), ("order", "name.asc")])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn vote_snapshot(
        &self,
        print_id: &str,
        user_id: Option<&str>,
    ) -> Result<VoteSnapshot, BackendError> {
        let response = self
            .authed(self.client.get(self.rest_url(TABLE_PRINTS)))
            .query(&[("select", "upvote_count".to_string()), ("id", eq(print_id))])
            .header(ACCEPT, PGRST_OBJECT)
            .send()
            .await?;
        let row: UpvoteCountRow = Self::parse_response(response).await?;

        let has_voted = match user_id {
            Some(user_id) => {
                let response = self
                    .authed(self.client.get(self.rest_url(TABLE_UPVOTES)))
                    .query(&[
                        ("select", "print_id".to_string()),
                        ("user_id", eq(user_id)),
                        ("print_id", eq(print_id)),
                    ])
                    .send()
                    .await?;
                let rows: Vec<serde_json::Value> = Self::parse_response(response).await?;
                !rows.is_empty()
            }
            None => false,
        };

        Ok(VoteSnapshot {
            upvote_count: row.upvote_count,
            has_voted,
        })
    }
}
