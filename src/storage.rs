//! Image storage behind a small trait so the catalog never knows where bytes live.
//!
//! `LocalObjectStore` writes into a directory that the app serves under
//! `/uploads`. `HttpObjectStore` posts the file to a remote upload endpoint
//! and reads the public URL back from the JSON reply.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lower-cased extension taken from the original file name, if it looks sane.
    fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .then_some(ext)
    }

    fn stored_name(&self) -> String {
        match self.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist the image and return a stable URL it can be fetched from.
    async fn put_image(&self, image: ImageUpload) -> AppResult<String>;
}

pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    #[instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn put_image(&self, image: ImageUpload) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        let name = image.stored_name();
        tokio::fs::write(self.root.join(&name), &image.bytes)
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        Ok(format!("{}/uploads/{}", self.public_base_url, name))
    }
}

pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

#[derive(Deserialize)]
struct UploadReply {
    secure_url: Option<String>,
    url: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: impl Into<String>, api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    #[instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn put_image(&self, image: ImageUpload) -> AppResult<String> {
        let name = image.stored_name();
        let mut part = Part::bytes(image.bytes).file_name(name);
        if let Some(content_type) = image.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::BadRequest(format!("invalid image content type: {e}")))?;
        }
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upload(format!("object store returned {status}: {body}")));
        }

        let reply: UploadReply = response
            .json()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        reply
            .secure_url
            .or(reply.url)
            .ok_or_else(|| AppError::Upload("object store reply has no url".into()))
    }
}

/// Pick the remote store when an endpoint is configured, local disk otherwise.
pub fn from_config(config: &AppConfig) -> Arc<dyn ObjectStore> {
    match &config.object_store_url {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "using remote object store");
            Arc::new(HttpObjectStore::new(
                endpoint.clone(),
                config.object_store_api_key.clone(),
            ))
        }
        None => {
            tracing::info!(dir = %config.upload_dir, "using local object store");
            Arc::new(LocalObjectStore::new(
                config.upload_dir.clone(),
                config.public_base_url.clone(),
            ))
        }
    }
}
