use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::{
    config::Config,
    errors::{AppError, AppResult},
    types::{DocumentNode, ImageFormat},
};

const TOKEN_HEADER: &str = "X-Figma-Token";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub format: ImageFormat,
    pub scale: f64,
}

/// Network seam of the extractor. Every call is a single attempt.
#[async_trait]
pub trait DesignApi: Send + Sync {
    /// Fetches the file and returns its root document node.
    async fn fetch_document(&self, file_key: &str) -> AppResult<DocumentNode>;

    /// Resolves rendered-image URLs for a batch of node ids in one request.
    /// A `None` value means the renderer produced nothing for that node.
    async fn fetch_image_urls(
        &self,
        file_key: &str,
        node_ids: &[String],
        options: RenderOptions,
    ) -> AppResult<HashMap<String, Option<String>>>;

    /// Streams the body behind `url` into `dest`, returning the bytes written.
    async fn download_image(&self, url: &str, dest: &Path) -> AppResult<u64>;
}

#[derive(Debug, Clone)]
pub struct DesignClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    document: DocumentNode,
}

impl DesignClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Transient(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            config.request_timeout,
        )
    }

    async fn get_authorized(
        &self,
        endpoint: String,
        query: &[(&str, String)],
        what: &str,
    ) -> AppResult<reqwest::Response> {
        let response = self
            .http
            .get(endpoint)
            .header(TOKEN_HEADER, &self.token)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, what).await
    }
}

#[async_trait]
impl DesignApi for DesignClient {
    async fn fetch_document(&self, file_key: &str) -> AppResult<DocumentNode> {
        let endpoint = format!("{}/v1/files/{}", self.base_url, file_key);
        debug!(%endpoint, "fetching document");
        let response = self
            .get_authorized(endpoint, &[], &format!("file {file_key}"))
            .await?;
        let body = response.bytes().await.map_err(transport_error)?;
        parse_document(&body)
    }

    async fn fetch_image_urls(
        &self,
        file_key: &str,
        node_ids: &[String],
        options: RenderOptions,
    ) -> AppResult<HashMap<String, Option<String>>> {
        if node_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let endpoint = format!("{}/v1/images/{}", self.base_url, file_key);
        let query = [
            ("ids", node_ids.join(",")),
            ("format", options.format.as_str().to_string()),
            ("scale", options.scale.to_string()),
        ];
        debug!(%endpoint, count = node_ids.len(), "resolving image urls");
        let response = self
            .get_authorized(endpoint, &query, &format!("images for file {file_key}"))
            .await?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::InvalidResponse(format!("images body: {err}")))?;
        parse_images_response(&body)
    }

    async fn download_image(&self, url: &str, dest: &Path) -> AppResult<u64> {
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let response = check_status(response, "image download").await?;

        // Bytes land in a sibling `.part` file so a failed transfer never
        // clobbers an asset from an earlier run.
        let partial = PartialFile::new(dest.with_extension("part"));
        let written = stream_to_file(response, partial.path()).await?;
        partial.persist(dest).await?;
        Ok(written)
    }
}

/// In-flight download target. Removed on drop unless persisted, which also
/// covers the future being cancelled mid-stream.
struct PartialFile {
    path: PathBuf,
    persisted: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(mut self, dest: &Path) -> AppResult<()> {
        tokio::fs::rename(&self.path, dest).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Parses a `/v1/files` body. Design trees nest far deeper than serde_json's
/// default recursion limit, so the limit is lifted and the stack grows on
/// demand instead.
pub fn parse_document(body: &[u8]) -> AppResult<DocumentNode> {
    let mut json = serde_json::Deserializer::from_slice(body);
    json.disable_recursion_limit();
    let file = FileResponse::deserialize(serde_stacker::Deserializer::new(&mut json))
        .map_err(|err| AppError::InvalidResponse(format!("document body: {err}")))?;
    json.end()
        .map_err(|err| AppError::InvalidResponse(format!("document body: {err}")))?;
    Ok(file.document)
}

async fn stream_to_file(mut response: reqwest::Response, path: &Path) -> AppResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

fn transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout
    } else {
        AppError::Transient(err.to_string())
    }
}

async fn check_status(response: reqwest::Response, what: &str) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, what, &body))
}

fn error_for_status(status: StatusCode, what: &str, body: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Auth,
        StatusCode::NOT_FOUND => AppError::NotFound(what.to_string()),
        status => AppError::Transient(format!("{what}: status {status} body {body}")),
    }
}

/// Reads `{ "err": ..., "images": { id: url | null } }`.
pub fn parse_images_response(body: &Value) -> AppResult<HashMap<String, Option<String>>> {
    if let Some(err) = body.get("err").and_then(Value::as_str) {
        return Err(AppError::InvalidResponse(format!("renderer error: {err}")));
    }
    let images = body
        .get("images")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::InvalidResponse("missing images map".to_string()))?;

    Ok(images
        .iter()
        .map(|(id, url)| {
            let url = url
                .as_str()
                .filter(|url| !url.is_empty())
                .map(ToString::to_string);
            (id.clone(), url)
        })
        .collect())
}
