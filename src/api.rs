//! Typed request/response contract for the remote file-storage service.
//!
//! Every operation maps to one endpoint under `{base_url}/files`. The chunk
//! and completion calls carry the multipart fields the service expects; no
//! dynamic field bags.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Result of one chunk upload, keyed by part number.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartAck {
    pub part_number: u32,
    pub accepted: bool,
    #[serde(default)]
    pub token: Option<String>,
}

/// Descriptor of a stored object returned after an upload or merge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub path: String,
    pub size: u64,
}

/// One listing entry under a path prefix.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// One chunk submission: payload plus its session coordinates.
#[derive(Debug, Clone)]
pub struct ChunkUpload {
    pub upload_id: String,
    pub part_number: u32,
    pub path: String,
    pub payload: Vec<u8>,
}

/// Ordered part list submitted to request the final merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub upload_id: String,
    pub target_path: String,
    pub part_numbers: Vec<u32>,
}

/// Request/response contract of the remote storage service.
///
/// The chunked-upload workflow drives `upload_chunk`/`complete_upload`; the
/// remaining methods are single-call passthroughs.
pub trait StoreApi {
    /// Upload an entire file in one request. `path` is the directory prefix;
    /// the service joins it with `file_name`.
    async fn upload_file(&self, path: &str, file_name: &str, payload: Vec<u8>) -> Result<Artifact>;

    /// Upload one chunk under `(uploadId, partNumber)`. Resubmitting the same
    /// coordinates is expected to be idempotent on the service side.
    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<PartAck>;

    /// Ask the service to merge the staged parts, in manifest order, into the
    /// final artifact.
    async fn complete_upload(&self, manifest: &Manifest) -> Result<Artifact>;

    /// List entries directly under `path`.
    async fn list_files(&self, path: &str) -> Result<Vec<FileEntry>>;

    /// Fetch the raw bytes of the object at `path`.
    async fn download_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete the object at `path`.
    async fn delete_file(&self, path: &str) -> Result<()>;

    /// Best-effort discard of the staged parts of an unfinished session.
    async fn abort_upload(&self, path: &str, upload_id: &str) -> Result<()>;
}

/// Map a non-success HTTP status to the error taxonomy.
///
/// Busy/gateway statuses are transient; validation statuses are permanent;
/// 404/410 on a session-scoped call means the service forgot the session.
pub(crate) fn classify_status(status: u16, body: String, upload_id: Option<&str>) -> Error {
    match (status, upload_id) {
        (408 | 429 | 502 | 503 | 504, _) => Error::ServerBusy { status },
        (400 | 422, _) => Error::Validation { message: body },
        (404 | 410, Some(id)) => Error::SessionExpired {
            upload_id: id.to_string(),
        },
        _ => Error::Remote {
            status,
            message: body,
        },
    }
}

/// HTTP implementation of [`StoreApi`] backed by `reqwest`.
pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn check(resp: reqwest::Response, upload_id: Option<&str>) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), body, upload_id))
    }
}

impl StoreApi for HttpStore {
    async fn upload_file(&self, path: &str, file_name: &str, payload: Vec<u8>) -> Result<Artifact> {
        let form = Form::new()
            .part("file", Part::bytes(payload).file_name(file_name.to_string()))
            .text("path", path.to_string());
        let resp = self
            .http
            .post(self.url("/files/upload"))
            .multipart(form)
            .send()
            .await?;
        let resp = Self::check(resp, None).await?;
        Ok(resp.json().await?)
    }

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<PartAck> {
        let form = Form::new()
            .part(
                "chunk",
                Part::bytes(chunk.payload).file_name(format!("part-{}", chunk.part_number)),
            )
            .text("uploadId", chunk.upload_id.clone())
            .text("partNumber", chunk.part_number.to_string())
            .text("path", chunk.path);
        let resp = self
            .http
            .post(self.url("/files/upload/chunk"))
            .multipart(form)
            .send()
            .await?;
        let resp = Self::check(resp, Some(&chunk.upload_id)).await?;
        Ok(resp.json().await?)
    }

    async fn complete_upload(&self, manifest: &Manifest) -> Result<Artifact> {
        let part_numbers = manifest
            .part_numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let form = Form::new()
            .text("uploadId", manifest.upload_id.clone())
            .text("partNumbers", part_numbers)
            .text("path", manifest.target_path.clone());
        let resp = self
            .http
            .post(self.url("/files/upload/complete"))
            .multipart(form)
            .send()
            .await?;
        let resp = Self::check(resp, Some(&manifest.upload_id)).await?;
        Ok(resp.json().await?)
    }

    async fn list_files(&self, path: &str) -> Result<Vec<FileEntry>> {
        let resp = self
            .http
            .get(self.url("/files/list"))
            .query(&[("path", path)])
            .send()
            .await?;
        let resp = Self::check(resp, None).await?;
        Ok(resp.json().await?)
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(self.url("/files/download"))
            .query(&[("path", path)])
            .send()
            .await?;
        let resp = Self::check(resp, None).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url("/files"))
            .query(&[("path", path)])
            .send()
            .await?;
        Self::check(resp, None).await?;
        Ok(())
    }

    async fn abort_upload(&self, path: &str, upload_id: &str) -> Result<()> {
        // The service stages chunks under `{path}/{uploadId}/`; dropping that
        // prefix discards the partial session.
        let staged = format!("{path}/{upload_id}/");
        self.delete_file(&staged).await
    }
}
