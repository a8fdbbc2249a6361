//! Chunked upload driver: bounded fan-out, per-part retry, and the
//! completion barrier.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::{Artifact, ChunkUpload, PartAck, StoreApi};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transfer::completion::CompletionCoordinator;
use crate::transfer::constants::{RETRY_BACKOFF_BASE_MS, RETRY_BACKOFF_CAP_MS};
use crate::transfer::session::UploadSession;
use crate::transfer::splitter::FileSplitter;
use crate::transfer::utils::progress::TransferProgress;

/// Capped exponential backoff for transient chunk failures.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = RETRY_BACKOFF_BASE_MS
        .checked_shl(attempt.min(16))
        .unwrap_or(u64::MAX);
    Duration::from_millis(exp.min(RETRY_BACKOFF_CAP_MS))
}

/// Uploads one file as a session of ordered parts.
///
/// Part uploads run with at most `max_concurrent_chunks` in flight and may
/// resolve out of dispatch order; all session-state updates happen on the
/// driver task in the order resolutions are observed. One permanently-failed
/// part aborts the whole session (fail-fast).
pub struct ChunkedUploader<'a, S: StoreApi> {
    store: &'a S,
    config: &'a ClientConfig,
    cancel: CancellationToken,
}

impl<'a, S: StoreApi> ChunkedUploader<'a, S> {
    pub fn new(store: &'a S, config: &'a ClientConfig) -> Self {
        Self {
            store,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token for aborting this upload from another task. Cancelling stops
    /// further dispatch and abandons in-flight requests.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the whole workflow: split, fan out, join, complete.
    ///
    /// On any failure the session's staged parts are discarded best-effort
    /// and the error names the parts that never succeeded.
    pub async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<Artifact> {
        let splitter = FileSplitter::open(local_path, self.config.chunk_size).await?;
        let upload_id = Uuid::new_v4().to_string();
        let mut session = UploadSession::new(
            upload_id.clone(),
            remote_path,
            self.config.chunk_size,
            splitter.plan().total_parts(),
        );

        log::debug!(
            "chunked upload start upload_id={} path={} size={} parts={}",
            upload_id,
            remote_path,
            splitter.plan().total_size(),
            session.total_parts()
        );

        let outcome = match tokio::time::timeout(
            self.config.session_timeout,
            self.drive(&splitter, &mut session),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::SessionTimeout {
                upload_id: upload_id.clone(),
            }),
        };

        match outcome {
            Ok(artifact) => Ok(artifact),
            Err(e) => {
                session.fail();
                self.cancel.cancel();
                if let Err(abort_err) = self.store.abort_upload(remote_path, &upload_id).await {
                    log::debug!("abort_upload best-effort failed: {abort_err}");
                }
                Err(Error::SessionFailed {
                    upload_id,
                    failed_parts: session.unacked_parts(),
                    source: Box::new(e),
                })
            }
        }
    }

    async fn drive(&self, splitter: &FileSplitter, session: &mut UploadSession) -> Result<Artifact> {
        session.start();

        let upload_id = session.upload_id().to_string();
        let target_path = session.target_path().to_string();
        let progress = TransferProgress::new(
            format!("Uploading {target_path}"),
            splitter.plan().total_size(),
            splitter.plan().chunk_size(),
        );
        let mut bytes_acked = 0u64;

        {
            let uploads = stream::iter(splitter.plan().part_numbers().map(|part| {
                let upload_id = upload_id.clone();
                let target_path = target_path.clone();
                async move {
                    let result = self
                        .upload_part(splitter, &upload_id, &target_path, part)
                        .await;
                    (part, result)
                }
            }))
            .buffer_unordered(self.config.max_concurrent_chunks);
            futures::pin_mut!(uploads);

            while let Some((part, result)) = uploads.next().await {
                match result {
                    Ok(ack) => {
                        if session.record_ack(ack.part_number) {
                            bytes_acked += splitter.plan().part_len(ack.part_number);
                            progress.update(bytes_acked);
                        }
                        log::debug!(
                            "part {} acked ({}/{})",
                            ack.part_number,
                            session.acked_count(),
                            session.total_parts()
                        );
                    }
                    Err(e) => {
                        // Fail fast: dropping the stream abandons in-flight
                        // requests without blocking the caller.
                        session.record_failure(part);
                        return Err(e);
                    }
                }
            }
        }

        CompletionCoordinator::new(self.store, self.config.request_timeout)
            .run(session, splitter.plan().total_size())
            .await
    }

    /// Uploads one part, retrying transient failures with capped exponential
    /// backoff. The identical payload is resubmitted on every attempt.
    async fn upload_part(
        &self,
        splitter: &FileSplitter,
        upload_id: &str,
        target_path: &str,
        part_number: u32,
    ) -> Result<PartAck> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let payload = splitter.read_part(part_number).await?;
        let mut attempt = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let request = ChunkUpload {
                upload_id: upload_id.to_string(),
                part_number,
                path: target_path.to_string(),
                payload: payload.clone(),
            };

            let err = match tokio::time::timeout(
                self.config.request_timeout,
                self.store.upload_chunk(request),
            )
            .await
            {
                Ok(Ok(ack)) => {
                    if ack.accepted {
                        return Ok(ack);
                    }
                    Error::Validation {
                        message: format!("part {part_number} not accepted by server"),
                    }
                }
                Ok(Err(e)) => e,
                Err(_) => Error::RequestTimeout,
            };

            if !err.is_transient() {
                return Err(err);
            }
            if attempt >= self.config.max_retries {
                return Err(Error::RetryExhausted {
                    part_number,
                    attempts: attempt + 1,
                    source: Box::new(err),
                });
            }

            let delay = backoff_delay(attempt);
            log::debug!(
                "part {part_number} transient failure (attempt {}): {err}; retrying in {delay:?}",
                attempt + 1
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
