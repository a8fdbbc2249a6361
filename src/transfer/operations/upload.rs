use crate::api::{Artifact, StoreApi};
use crate::config::ClientConfig;
use crate::error::{DirectoryUploadNotRecursiveSnafu, PathNotFoundSnafu, Result};
use crate::transfer::chunked::ChunkedUploader;
use crate::transfer::utils::path::{build_remote_path, ensure_trailing_slash};
use async_recursion::async_recursion;
use snafu::ensure;
use std::ffi::OsStr;
use std::path::Path;
use tokio::fs;

/// Trait for uploading files and directories to the remote store.
pub trait Uploader {
    /// Upload a single file or directory from local to remote storage.
    ///
    /// # Arguments
    /// * `local_path` - Source path on local filesystem (file or directory)
    /// * `remote_path` - Destination prefix in storage
    /// * `recursive` - Whether to upload directories recursively
    ///
    /// # Returns
    /// * `Result<()>` - Success or detailed error information
    async fn upload(&self, local_path: &str, remote_path: &str, recursive: bool) -> Result<()>;
}

/// Implementation of Uploader over the remote store contract.
///
/// Files at or below the configured threshold (and zero-byte files) go
/// through the single-call whole-file endpoint; larger files go through the
/// chunked-session workflow.
pub struct HttpUploader<'a, S: StoreApi> {
    store: &'a S,
    config: &'a ClientConfig,
}

impl<'a, S: StoreApi> HttpUploader<'a, S> {
    pub fn new(store: &'a S, config: &'a ClientConfig) -> Self {
        Self { store, config }
    }

    /// Upload a single file, dispatching on the whole-file threshold.
    async fn upload_one_file(&self, local_path: &Path, remote_prefix: &str) -> Result<Artifact> {
        let size = fs::metadata(local_path).await?.len();
        let file_name = local_path
            .file_name()
            .unwrap_or(OsStr::new("file"))
            .to_string_lossy()
            .to_string();
        let prefix = if remote_prefix.is_empty() {
            String::new()
        } else {
            ensure_trailing_slash(remote_prefix)
        };

        let artifact = if size > self.config.chunk_threshold {
            let target = build_remote_path(&prefix, &file_name);
            ChunkedUploader::new(self.store, self.config)
                .upload(local_path, &target)
                .await?
        } else {
            let payload = fs::read(local_path).await?;
            self.store.upload_file(&prefix, &file_name, payload).await?
        };

        println!(
            "\n✅ Upload: {} → {} ({} bytes)",
            local_path.display(),
            artifact.path,
            artifact.size
        );
        Ok(artifact)
    }

    /// Upload a directory recursively.
    #[async_recursion(?Send)]
    async fn upload_recursive(&self, local_path: &str, remote_path: &str) -> Result<()> {
        let mut entries = fs::read_dir(local_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let local_file_path = entry.path();

            if local_file_path.is_dir() {
                let dir_name = local_file_path.file_name().unwrap_or_default();
                let new_remote_path =
                    build_remote_path(remote_path, &dir_name.to_string_lossy());
                self.upload_recursive(&local_file_path.to_string_lossy(), &new_remote_path)
                    .await?;
            } else {
                self.upload_one_file(&local_file_path, remote_path).await?;
            }
        }
        Ok(())
    }
}

impl<'a, S: StoreApi> Uploader for HttpUploader<'a, S> {
    async fn upload(&self, local_path: &str, remote_path: &str, recursive: bool) -> Result<()> {
        let path = Path::new(local_path);
        ensure!(
            path.exists(),
            PathNotFoundSnafu {
                path: path.to_path_buf()
            }
        );

        if path.is_file() {
            self.upload_one_file(path, remote_path).await?;
        } else if path.is_dir() {
            if recursive {
                self.upload_recursive(local_path, remote_path).await?;
            } else {
                return DirectoryUploadNotRecursiveSnafu.fail();
            }
        }

        Ok(())
    }
}
