//! Completion barrier: manifest submission and artifact validation.

use std::time::Duration;

use crate::api::{Artifact, Manifest, StoreApi};
use crate::error::{Error, Result};
use crate::transfer::session::UploadSession;

/// Builds the manifest for a session: exactly `1..=total_parts`, ascending.
///
/// Merge order is part-number order, not arrival order, so the final byte
/// layout is independent of network timing.
pub fn build_manifest(session: &UploadSession) -> Manifest {
    Manifest {
        upload_id: session.upload_id().to_string(),
        target_path: session.target_path().to_string(),
        part_numbers: (1..=session.total_parts()).collect(),
    }
}

/// Requests the final merge once every part is acknowledged and validates
/// the returned artifact.
pub struct CompletionCoordinator<'a, S: StoreApi> {
    store: &'a S,
    request_timeout: Duration,
}

impl<'a, S: StoreApi> CompletionCoordinator<'a, S> {
    pub fn new(store: &'a S, request_timeout: Duration) -> Self {
        Self {
            store,
            request_timeout,
        }
    }

    /// Drives `AllPartsAcked → Completing → Completed`.
    ///
    /// The completion request is submitted exactly once: blindly retrying a
    /// merge on an already-merged session is not idempotent-safe. A size
    /// mismatch between the returned artifact and the uploaded bytes forces
    /// `Failed` even though the server reported success.
    pub async fn run(&self, session: &mut UploadSession, expected_size: u64) -> Result<Artifact> {
        session.begin_completion()?;

        let manifest = build_manifest(session);
        log::debug!(
            "completing upload_id={} parts={}",
            manifest.upload_id,
            manifest.part_numbers.len()
        );

        let artifact =
            match tokio::time::timeout(self.request_timeout, self.store.complete_upload(&manifest))
                .await
            {
                Ok(Ok(artifact)) => artifact,
                Ok(Err(e)) => {
                    session.fail();
                    return Err(e);
                }
                Err(_) => {
                    session.fail();
                    return Err(Error::RequestTimeout);
                }
            };

        if artifact.size != expected_size {
            session.fail();
            return Err(Error::Integrity {
                expected: expected_size,
                actual: artifact.size,
            });
        }

        session.complete();
        Ok(artifact)
    }
}
