use crate::config::Config;
use crate::model::{NewPost, PostRecord, PostUpdate, StoredFile};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Remote file store: holds uploaded featured images.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload_file(&self, path: &Path) -> Result<StoredFile>;

    /// Callers may ignore deletion failures; a retained stale file is an
    /// acceptable degraded state.
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Pure URL builder, no network.
    fn file_preview_url(&self, file_id: &str) -> String;
}

/// Remote record store: holds post documents.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<PostRecord>;

    async fn update_post(&self, post_id: &str, update: &PostUpdate) -> Result<PostRecord>;
}

/// Addresses of the post collection and image bucket on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageIds {
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
}

#[derive(Clone)]
pub struct StorageClient {
    http: Client,
    base_url: Url,
    project_id: String,
    api_key: String,
    ids: StorageIds,
}

impl fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let base_url =
            Url::parse(&cfg.service.endpoint).context("invalid service endpoint URL")?;
        Ok(Self::with_base_url(
            cfg.service.project_id.clone(),
            cfg.service.api_key.clone(),
            cfg.storage_ids(),
            base_url,
        ))
    }

    pub fn with_base_url(
        project_id: String,
        api_key: String,
        ids: StorageIds,
        base_url: Url,
    ) -> Self {
        let http = Client::builder()
            .user_agent("postwright/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            project_id,
            api_key,
            ids,
        }
    }

    fn documents_path(&self) -> String {
        format!(
            "v1/databases/{}/collections/{}/documents",
            self.ids.database_id, self.ids.collection_id
        )
    }

    fn files_path(&self) -> String {
        format!("v1/buckets/{}/files", self.ids.bucket_id)
    }

    pub fn build_json_request(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(path)
            .context("invalid storage base URL")?;
        self.http
            .request(method, endpoint)
            .header("X-Project-Id", &self.project_id)
            .header("X-Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .build()
            .context("failed to build storage request")
    }

    async fn execute_document(&self, method: Method, path: &str, body: Value) -> Result<PostRecord> {
        let request = self.build_json_request(method, path, &body)?;
        debug!(url=%request.url(), payload=%body, "sending document request");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach record store")?;
        let res = ensure_success(res, "document write").await?;
        res.json().await.context("invalid record store response")
    }

    pub async fn upload_file(&self, path: &Path) -> Result<StoredFile> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read selected file {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_owned();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let file_id = Uuid::new_v4().to_string();

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .context("invalid upload content type")?;
        let form = multipart::Form::new()
            .text("fileId", file_id)
            .part("file", part);

        let endpoint = self
            .base_url
            .join(&self.files_path())
            .context("invalid storage base URL")?;
        debug!(url=%endpoint, file=%path.display(), "uploading file");
        let res = self
            .http
            .post(endpoint)
            .header("X-Project-Id", &self.project_id)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .context("failed to reach file store")?;
        let res = ensure_success(res, "file upload").await?;
        let payload: UploadResponse = res.json().await.context("invalid file store response")?;
        Ok(StoredFile { id: payload.id })
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let endpoint = self
            .base_url
            .join(&format!("{}/{}", self.files_path(), file_id))
            .context("invalid storage base URL")?;
        debug!(url=%endpoint, "deleting file");
        let res = self
            .http
            .delete(endpoint)
            .header("X-Project-Id", &self.project_id)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .context("failed to reach file store")?;
        ensure_success(res, "file deletion").await?;
        Ok(())
    }

    pub fn file_preview_url(&self, file_id: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}/{}/preview", self.files_path(), file_id));
        url.set_query(Some(&format!("project={}", self.project_id)));
        url.to_string()
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<PostRecord> {
        let document_id = Uuid::new_v4().to_string();
        let body = build_create_document_request(&document_id, post);
        self.execute_document(Method::POST, &self.documents_path(), body)
            .await
    }

    pub async fn update_post(&self, post_id: &str, update: &PostUpdate) -> Result<PostRecord> {
        let body = build_update_document_request(update);
        let path = format!("{}/{}", self.documents_path(), post_id);
        self.execute_document(Method::PATCH, &path, body).await
    }
}

#[async_trait]
impl FileStore for StorageClient {
    async fn upload_file(&self, path: &Path) -> Result<StoredFile> {
        StorageClient::upload_file(self, path).await
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        StorageClient::delete_file(self, file_id).await
    }

    fn file_preview_url(&self, file_id: &str) -> String {
        StorageClient::file_preview_url(self, file_id)
    }
}

#[async_trait]
impl RecordStore for StorageClient {
    async fn create_post(&self, post: &NewPost) -> Result<PostRecord> {
        StorageClient::create_post(self, post).await
    }

    async fn update_post(&self, post_id: &str, update: &PostUpdate) -> Result<PostRecord> {
        StorageClient::update_post(self, post_id, update).await
    }
}

pub fn build_create_document_request(document_id: &str, post: &NewPost) -> Value {
    json!({
        "documentId": document_id,
        "data": post,
    })
}

pub fn build_update_document_request(update: &PostUpdate) -> Value {
    // PostUpdate omits featuredImageId when no new upload occurred; the store
    // treats a missing key as "leave unchanged".
    json!({
        "data": update,
    })
}

async fn ensure_success(res: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    if res.status() == StatusCode::TOO_MANY_REQUESTS {
        let body = res.text().await.unwrap_or_default();
        return Err(anyhow!("received 429 from store: {}", body));
    }
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(anyhow!("{} failed with {}: {}", what, status, body));
    }
    Ok(res)
}

#[derive(Deserialize)]
struct UploadResponse {
    id: String,
}
