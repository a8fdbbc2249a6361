use crate::api::StoreApi;
use crate::error::Result;
use crate::transfer::utils::path::basename;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Trait for downloading files from the remote store.
pub trait Downloader {
    /// Download a single file from remote to local.
    ///
    /// # Arguments
    /// * `remote_path` - Source path in storage
    /// * `local_path` - Destination path on local filesystem; an existing
    ///   directory (or a path ending in '/') receives the remote basename
    ///
    /// # Returns
    /// * `Result<()>` - Success or detailed error information
    async fn download(&self, remote_path: &str, local_path: &str) -> Result<()>;
}

/// Implementation of Downloader over the remote store contract.
pub struct HttpDownloader<'a, S: StoreApi> {
    store: &'a S,
}

impl<'a, S: StoreApi> HttpDownloader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn resolve_local_path(remote_path: &str, local_path: &str) -> PathBuf {
        let local = Path::new(local_path);
        if local_path.ends_with('/') || local.is_dir() {
            local.join(basename(remote_path))
        } else {
            local.to_path_buf()
        }
    }
}

impl<'a, S: StoreApi> Downloader for HttpDownloader<'a, S> {
    async fn download(&self, remote_path: &str, local_path: &str) -> Result<()> {
        let data = self.store.download_file(remote_path).await?;

        let local_file_path = Self::resolve_local_path(remote_path, local_path);
        if let Some(parent) = local_file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&local_file_path, &data).await?;

        println!(
            "Downloaded: {remote_path} → {} ({} bytes)",
            local_file_path.display(),
            data.len()
        );
        Ok(())
    }
}
