use crate::api::HttpStore;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::wrap_err;

pub mod chunked;
pub mod completion;
pub mod constants;
pub mod operations;
pub mod session;
pub mod splitter;
pub mod utils;

use self::operations::delete::HttpDeleter;
use self::operations::download::HttpDownloader;
use self::operations::list::HttpLister;
use self::operations::upload::HttpUploader;
use self::operations::{Deleter, Downloader, Lister, Uploader};
use self::utils::path::ensure_trailing_slash;

/// Unified transfer client over the remote storage service.
pub struct TransferClient {
    store: HttpStore,
    config: ClientConfig,
}

impl TransferClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let store = HttpStore::new(&config)?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &HttpStore {
        &self.store
    }

    pub async fn list_directory(&self, path: &str, long: bool, recursive: bool) -> Result<()> {
        log::debug!("list_directory path={path} long={long} recursive={recursive}");
        let path = if path.is_empty() {
            String::new()
        } else {
            ensure_trailing_slash(path)
        };
        let lister = HttpLister::new(&self.store);
        wrap_err!(
            lister.list(&path, long, recursive).await,
            ListDirectoryFailed {
                path: path.to_string()
            }
        )
    }

    pub async fn download_files(&self, remote_path: &str, local_path: &str) -> Result<()> {
        log::debug!("download_files remote_path={remote_path} local_path={local_path}");
        let downloader = HttpDownloader::new(&self.store);
        wrap_err!(
            downloader.download(remote_path, local_path).await,
            DownloadFailed {
                remote_path: remote_path.to_string(),
                local_path: local_path.to_string()
            }
        )
    }

    pub async fn upload_files(
        &self,
        local_path: &str,
        remote_path: &str,
        is_recursive: bool,
    ) -> Result<()> {
        log::debug!(
            "upload_files local_path={local_path} remote_path={remote_path} recursive={is_recursive}"
        );
        let uploader = HttpUploader::new(&self.store, &self.config);
        wrap_err!(
            uploader.upload(local_path, remote_path, is_recursive).await,
            UploadFailed {
                local_path: local_path.to_string(),
                remote_path: remote_path.to_string()
            }
        )
    }

    pub async fn delete_files(&self, paths: &[String]) -> Result<()> {
        log::debug!("delete_files paths_count={}", paths.len());
        let deleter = HttpDeleter::new(&self.store);
        wrap_err!(
            deleter.delete(paths).await,
            DeleteFailed {
                // summarize inputs to avoid huge error strings
                paths: paths.iter().take(5).cloned().collect::<Vec<_>>().join(",")
            }
        )
    }
}
