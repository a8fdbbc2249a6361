// Utilities for the transfer module
pub mod error;
pub mod path;
pub mod progress;
pub mod size;
