//! In-memory state machine for one chunked upload.
//!
//! The session is owned by a single upload driver for its whole lifetime, so
//! no locking: all status updates are applied in the order their resolutions
//! are observed.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Acknowledgment status of one part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartStatus {
    Pending,
    Acked,
    Failed,
}

/// Session lifecycle. `Failed` absorbs from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Uploading,
    AllPartsAcked,
    Completing,
    Completed,
    Failed,
}

/// Tracks one file transfer: identifier, target path, and per-part status.
///
/// `target_path` and `total_parts` are fixed at creation. The transition to
/// `Completing` is gated on every part being `Acked` (a strict join, not a
/// quorum).
pub struct UploadSession {
    upload_id: String,
    target_path: String,
    chunk_size: u64,
    total_parts: u32,
    parts: BTreeMap<u32, PartStatus>,
    state: SessionState,
    acked: u32,
}

impl UploadSession {
    pub fn new(
        upload_id: impl Into<String>,
        target_path: impl Into<String>,
        chunk_size: u64,
        total_parts: u32,
    ) -> Self {
        Self {
            upload_id: upload_id.into(),
            target_path: target_path.into(),
            chunk_size,
            total_parts,
            parts: (1..=total_parts).map(|n| (n, PartStatus::Pending)).collect(),
            state: SessionState::Created,
            acked: 0,
        }
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn total_parts(&self) -> u32 {
        self.total_parts
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn part_status(&self, part_number: u32) -> Option<PartStatus> {
        self.parts.get(&part_number).copied()
    }

    pub fn acked_count(&self) -> u32 {
        self.acked
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SessionState::Completed | SessionState::Failed)
    }

    pub fn all_parts_acked(&self) -> bool {
        self.acked == self.total_parts
    }

    /// Part numbers that are not `Acked` (pending or failed), ascending.
    pub fn unacked_parts(&self) -> Vec<u32> {
        self.parts
            .iter()
            .filter(|(_, status)| **status != PartStatus::Acked)
            .map(|(n, _)| *n)
            .collect()
    }

    /// Part numbers recorded as `Failed`, ascending.
    pub fn failed_parts(&self) -> Vec<u32> {
        self.parts
            .iter()
            .filter(|(_, status)| **status == PartStatus::Failed)
            .map(|(n, _)| *n)
            .collect()
    }

    /// Marks the first part as dispatched: `Created → Uploading`. A session
    /// with zero parts is vacuously at the barrier.
    pub fn start(&mut self) {
        if self.state == SessionState::Created {
            self.state = if self.total_parts == 0 {
                SessionState::AllPartsAcked
            } else {
                SessionState::Uploading
            };
        }
    }

    /// Records one acknowledgment. Returns `true` if the part was newly
    /// acked; re-acking an already-`Acked` part is a no-op.
    pub fn record_ack(&mut self, part_number: u32) -> bool {
        if self.is_terminal() {
            return false;
        }
        match self.parts.get_mut(&part_number) {
            Some(status @ (PartStatus::Pending | PartStatus::Failed)) => {
                *status = PartStatus::Acked;
                self.acked += 1;
                if self.all_parts_acked() && self.state == SessionState::Uploading {
                    self.state = SessionState::AllPartsAcked;
                }
                true
            }
            _ => false,
        }
    }

    /// Records a permanent failure for one part.
    pub fn record_failure(&mut self, part_number: u32) {
        if self.is_terminal() {
            return;
        }
        if let Some(status) = self.parts.get_mut(&part_number) {
            if *status == PartStatus::Pending {
                *status = PartStatus::Failed;
            }
        }
    }

    /// Barrier into completion: only permitted once every part is `Acked`.
    pub fn begin_completion(&mut self) -> Result<()> {
        if self.state != SessionState::AllPartsAcked {
            return Err(Error::CompletionBlocked {
                outstanding: self.unacked_parts(),
            });
        }
        self.state = SessionState::Completing;
        Ok(())
    }

    /// Terminal success: `Completing → Completed`.
    pub fn complete(&mut self) {
        if self.state == SessionState::Completing {
            self.state = SessionState::Completed;
        }
    }

    /// Terminal failure, reachable from any non-terminal state.
    pub fn fail(&mut self) {
        if self.state != SessionState::Completed {
            self.state = SessionState::Failed;
        }
    }
}
