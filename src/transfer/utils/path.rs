// Path helper utilities shared across transfer operations
use std::path::Path;

/// Build a remote path by joining base and file name.
pub fn build_remote_path(base: &str, file_name: &str) -> String {
    if base.is_empty() {
        return file_name.to_string();
    }
    format!("{}{file_name}", ensure_trailing_slash(base))
}

/// Extract a normalized basename from a remote path.
pub fn basename(path: &str) -> String {
    Path::new(path.trim_start_matches('/'))
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.trim_matches('/').to_string())
}

/// Return a new String that guarantees a trailing '/'.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}
