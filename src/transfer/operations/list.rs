use crate::api::{FileEntry, StoreApi};
use crate::error::Result;
use async_recursion::async_recursion;
use std::fmt;

/// Trait for listing directory contents in the remote store.
pub trait Lister {
    /// List contents of a directory in the remote store.
    ///
    /// # Arguments
    /// * `path` - Directory path to list
    /// * `long` - Whether to show detailed information
    /// * `recursive` - Whether to descend into subdirectories
    ///
    /// # Returns
    /// * `Result<()>` - Success or detailed error information
    async fn list(&self, path: &str, long: bool, recursive: bool) -> Result<()>;
}

/// Implementation of Lister over the remote store contract.
///
/// The service lists one level at a time; recursion is client-side.
pub struct HttpLister<'a, S: StoreApi> {
    store: &'a S,
}

impl<'a, S: StoreApi> HttpLister<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn print_entry(&self, prefix: &str, entry: &FileEntry, long: bool) {
        let full_path = format!("{prefix}{}", entry.name);
        if long {
            println!("{}", EntryInfo::new(&full_path, entry));
        } else {
            println!("{full_path}");
        }
    }

    #[async_recursion(?Send)]
    async fn list_level(&self, path: &str, long: bool, recursive: bool) -> Result<()> {
        let entries = self.store.list_files(path).await?;
        for entry in entries {
            self.print_entry(path, &entry, long);
            if entry.is_dir && recursive {
                let sub_path = format!("{path}{}", entry.name);
                self.list_level(&sub_path, long, recursive).await?;
            }
        }
        Ok(())
    }
}

impl<'a, S: StoreApi> Lister for HttpLister<'a, S> {
    async fn list(&self, path: &str, long: bool, recursive: bool) -> Result<()> {
        self.list_level(path, long, recursive).await
    }
}

/// File information for detailed listing output.
struct EntryInfo {
    path: String,
    size: u64,
    modified: Option<String>,
    is_dir: bool,
}

impl EntryInfo {
    fn new(path: &str, entry: &FileEntry) -> Self {
        Self {
            path: path.to_string(),
            size: entry.size,
            modified: entry.last_modified.clone(),
            is_dir: entry.is_dir,
        }
    }
}

impl fmt::Display for EntryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_type = if self.is_dir { "DIR" } else { "FILE" };
        let size_str = if self.is_dir {
            "-".to_string()
        } else {
            crate::transfer::utils::size::format_size(self.size)
        };
        let modified = self.modified.as_deref().unwrap_or("Unknown");
        write!(f, "{file_type:<6} {size_str:>10} {modified} {}", self.path)
    }
}
