use std::io::{self, Write};

use crate::transfer::utils::size::format_size;

/// Coarse stdout progress line, updated once per completed step.
pub struct TransferProgress {
    label: String,
    total: u64,
    step: u64,
}

impl TransferProgress {
    pub fn new(label: impl Into<String>, total: u64, step: u64) -> Self {
        Self {
            label: label.into(),
            total,
            step: step.max(1),
        }
    }

    /// Rewrite the progress line if `done` lands on a step boundary or at
    /// the end of the transfer.
    pub fn update(&self, done: u64) {
        if self.total == 0 {
            return;
        }
        if done.is_multiple_of(self.step) || done == self.total {
            let percent = done.saturating_mul(100) / self.total;
            print!(
                "\r {}: {percent}% ({} of {})",
                self.label,
                format_size(done),
                format_size(self.total)
            );
            let _ = io::stdout().flush();
        }
    }
}
