// Transfer operation traits and implementations
pub mod delete;
pub mod download;
pub mod list;
pub mod upload;

pub use delete::Deleter;
pub use download::Downloader;
pub use list::Lister;
pub use upload::Uploader;
