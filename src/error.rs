use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Environment variable '{key}' is required but not found"))]
    MissingEnvVar { key: String },

    #[snafu(display("Invalid configuration: {message}"))]
    InvalidConfig { message: String },

    #[snafu(display("Path does not exist: {}", path.display()))]
    PathNotFound { path: PathBuf },

    #[snafu(display("Use -R to upload directories"))]
    DirectoryUploadNotRecursive,

    #[snafu(display("Partial deletion failure: {} path(s) failed to delete: {}", failed_paths.len(), failed_paths.join(", ")))]
    PartialDeletion { failed_paths: Vec<String> },

    // Transient: resubmitting the same request unchanged may succeed.
    #[snafu(display("Server busy (HTTP {status})"))]
    ServerBusy { status: u16 },

    #[snafu(display("Request timed out"))]
    RequestTimeout,

    #[snafu(display("Request rejected by server: {message}"))]
    Validation { message: String },

    #[snafu(display("Upload session '{upload_id}' is no longer known to the server"))]
    SessionExpired { upload_id: String },

    #[snafu(display("Server error (HTTP {status}): {message}"))]
    Remote { status: u16, message: String },

    #[snafu(display(
        "Merged artifact is {actual} bytes but the uploaded parts total {expected} bytes"
    ))]
    Integrity { expected: u64, actual: u64 },

    #[snafu(display("Completion requested with unacknowledged part(s): {outstanding:?}"))]
    CompletionBlocked { outstanding: Vec<u32> },

    #[snafu(display("Part {part_number} failed after {attempts} attempt(s): {source}"))]
    RetryExhausted {
        part_number: u32,
        attempts: u32,
        source: Box<Error>,
    },

    #[snafu(display(
        "Upload session '{upload_id}' failed; unacknowledged part(s) {failed_parts:?}: {source}"
    ))]
    SessionFailed {
        upload_id: String,
        failed_parts: Vec<u32>,
        source: Box<Error>,
    },

    #[snafu(display("Upload session '{upload_id}' exceeded its time budget"))]
    SessionTimeout { upload_id: String },

    #[snafu(display("Transfer cancelled"))]
    Cancelled,

    #[snafu(display("Failed to download '{remote_path}' to '{local_path}': {source}"))]
    DownloadFailed {
        remote_path: String,
        local_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to upload '{local_path}' to '{remote_path}': {source}"))]
    UploadFailed {
        local_path: String,
        remote_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to list directory '{path}': {source}"))]
    ListDirectoryFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to delete '{paths}': {source}"))]
    DeleteFailed { paths: String, source: Box<Error> },

    #[snafu(display("HTTP error: {source}"))]
    Http { source: reqwest::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

impl Error {
    /// Whether retrying the same request unchanged may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::ServerBusy { .. } | Error::RequestTimeout => true,
            Error::Http { source } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Error::RequestTimeout
        } else {
            Error::Http { source: error }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}
