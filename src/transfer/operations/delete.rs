// Delete operation trait and implementation
use crate::api::StoreApi;
use crate::error::{PartialDeletionSnafu, Result};

/// Trait for deleting files from the remote store.
pub trait Deleter {
    /// Delete one or more files from storage.
    ///
    /// # Arguments
    /// * `paths` - List of remote paths to delete
    ///
    /// # Returns
    /// * `Result<()>` - Success or detailed error information
    async fn delete(&self, paths: &[String]) -> Result<()>;
}

/// Implementation of Deleter over the remote store contract.
pub struct HttpDeleter<'a, S: StoreApi> {
    store: &'a S,
}

impl<'a, S: StoreApi> HttpDeleter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<'a, S: StoreApi> Deleter for HttpDeleter<'a, S> {
    async fn delete(&self, paths: &[String]) -> Result<()> {
        let mut failed_paths = Vec::new();

        for path in paths {
            match self.store.delete_file(path).await {
                Ok(_) => println!("Deleted: {path}"),
                Err(e) => {
                    eprintln!("Failed to delete {path}: {e}");
                    failed_paths.push(path.clone());
                }
            }
        }

        if !failed_paths.is_empty() {
            return PartialDeletionSnafu { failed_paths }.fail();
        }

        Ok(())
    }
}
