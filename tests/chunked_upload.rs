//! Behavior tests for the chunked upload workflow, driven against an
//! in-memory store that implements the remote service contract.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use rand::RngCore;
use tempfile::TempDir;

use depot::api::{Artifact, ChunkUpload, FileEntry, Manifest, PartAck, StoreApi};
use depot::config::ClientConfig;
use depot::error::{Error, Result};
use depot::transfer::chunked::ChunkedUploader;
use depot::transfer::operations::Uploader;
use depot::transfer::operations::upload::HttpUploader;

#[derive(Default)]
struct State {
    chunks: HashMap<u32, Vec<u8>>,
    whole_files: Vec<(String, String, usize)>,
    merged: HashMap<String, Vec<u8>>,
    // part -> number of times it still answers 503
    busy_budget: HashMap<u32, u32>,
    reject_parts: Vec<u32>,
    completions: u32,
    aborts: u32,
    in_flight: usize,
    max_in_flight: usize,
    // added to the reported artifact size (simulates a corrupted merge)
    size_skew: i64,
    // per-chunk service latency
    chunk_delay: Duration,
}

#[derive(Default)]
struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    fn busy_for(part: u32, failures: u32) -> Self {
        let store = Self::default();
        store
            .state
            .lock()
            .unwrap()
            .busy_budget
            .insert(part, failures);
        store
    }

    fn rejecting(part: u32) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().reject_parts.push(part);
        store
    }

    fn with_size_skew(skew: i64) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().size_skew = skew;
        store
    }

    fn slow(delay: Duration) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().chunk_delay = delay;
        store
    }
}

impl StoreApi for FakeStore {
    async fn upload_file(&self, path: &str, file_name: &str, payload: Vec<u8>) -> Result<Artifact> {
        let mut state = self.state.lock().unwrap();
        let object = format!("{path}{file_name}");
        let size = payload.len() as u64;
        state
            .whole_files
            .push((path.to_string(), file_name.to_string(), payload.len()));
        state.merged.insert(object.clone(), payload);
        Ok(Artifact { path: object, size })
    }

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<PartAck> {
        let delay;
        {
            let mut state = self.state.lock().unwrap();
            delay = state.chunk_delay;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);

            if state.reject_parts.contains(&chunk.part_number) {
                state.in_flight -= 1;
                return Err(Error::Validation {
                    message: format!("part {} rejected", chunk.part_number),
                });
            }
            if let Some(remaining) = state.busy_budget.get_mut(&chunk.part_number) {
                if *remaining > 0 {
                    *remaining -= 1;
                    state.in_flight -= 1;
                    return Err(Error::ServerBusy { status: 503 });
                }
            }
        }

        // Simulate network time so the in-flight gauge is meaningful.
        tokio::time::sleep(delay.max(Duration::from_millis(5))).await;

        let mut state = self.state.lock().unwrap();
        state.chunks.insert(chunk.part_number, chunk.payload);
        state.in_flight -= 1;
        Ok(PartAck {
            part_number: chunk.part_number,
            accepted: true,
            token: Some(format!("etag-{}", chunk.part_number)),
        })
    }

    async fn complete_upload(&self, manifest: &Manifest) -> Result<Artifact> {
        let mut state = self.state.lock().unwrap();
        state.completions += 1;

        let expected: Vec<u32> = (1..=state.chunks.len() as u32).collect();
        if manifest.part_numbers != expected {
            return Err(Error::Validation {
                message: "manifest does not match staged parts".into(),
            });
        }

        // Merge strictly in part-number order, regardless of arrival order.
        let mut merged = Vec::new();
        for part in &manifest.part_numbers {
            merged.extend_from_slice(&state.chunks[part]);
        }
        let size = (merged.len() as i64 + state.size_skew) as u64;
        state.merged.insert(manifest.target_path.clone(), merged);
        Ok(Artifact {
            path: manifest.target_path.clone(),
            size,
        })
    }

    async fn list_files(&self, _path: &str) -> Result<Vec<FileEntry>> {
        Ok(Vec::new())
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state
            .merged
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Remote {
                status: 404,
                message: format!("no such file: {path}"),
            })
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        self.state.lock().unwrap().merged.remove(path);
        Ok(())
    }

    async fn abort_upload(&self, _path: &str, _upload_id: &str) -> Result<()> {
        self.state.lock().unwrap().aborts += 1;
        Ok(())
    }
}

fn test_config() -> ClientConfig {
    let mut config = ClientConfig::new("http://fake");
    config.chunk_size = 4096;
    config.chunk_threshold = 2048;
    config.max_retries = 3;
    config.max_concurrent_chunks = 4;
    config.request_timeout = Duration::from_secs(5);
    config.session_timeout = Duration::from_secs(30);
    config
}

fn create_random_file(dir: &TempDir, name: &str, size: usize) -> (PathBuf, Vec<u8>) {
    let mut content = vec![0u8; size];
    rand::rng().fill_bytes(&mut content);
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(&content).unwrap();
    (path, content)
}

#[tokio::test]
async fn chunked_upload_reassembles_file_in_part_order() {
    let dir = TempDir::new().unwrap();
    // 10240 bytes with 4096-byte chunks: parts of 4096, 4096, 2048.
    let (path, content) = create_random_file(&dir, "big.bin", 10 * 1024);
    let store = FakeStore::default();
    let config = test_config();

    let artifact = ChunkedUploader::new(&store, &config)
        .upload(&path, "data/big.bin")
        .await
        .unwrap();

    assert_eq!(artifact.path, "data/big.bin");
    assert_eq!(artifact.size, 10 * 1024);

    let state = store.state.lock().unwrap();
    assert_eq!(state.completions, 1);
    assert_eq!(state.chunks.len(), 3);
    assert_eq!(state.chunks[&1].len(), 4096);
    assert_eq!(state.chunks[&2].len(), 4096);
    assert_eq!(state.chunks[&3].len(), 2048);
    assert_eq!(state.merged["data/big.bin"], content);
    assert_eq!(state.aborts, 0);
}

#[tokio::test]
async fn transient_failures_are_retried_invisibly() {
    let dir = TempDir::new().unwrap();
    let (path, content) = create_random_file(&dir, "flaky.bin", 9000);
    // Part 2 answers 503 twice before accepting; the budget allows 3 retries.
    let store = FakeStore::busy_for(2, 2);
    let config = test_config();

    let artifact = ChunkedUploader::new(&store, &config)
        .upload(&path, "flaky.bin")
        .await
        .unwrap();

    assert_eq!(artifact.size, 9000);
    let state = store.state.lock().unwrap();
    assert_eq!(state.merged["flaky.bin"], content);
    assert_eq!(state.completions, 1);
}

#[tokio::test]
async fn permanent_failure_aborts_session_and_names_the_part() {
    let dir = TempDir::new().unwrap();
    let (path, _) = create_random_file(&dir, "doomed.bin", 10 * 1024);
    let store = FakeStore::rejecting(2);
    let config = test_config();

    let err = ChunkedUploader::new(&store, &config)
        .upload(&path, "doomed.bin")
        .await
        .unwrap_err();

    match err {
        Error::SessionFailed {
            failed_parts,
            source,
            ..
        } => {
            assert!(failed_parts.contains(&2), "failed parts: {failed_parts:?}");
            assert!(matches!(*source, Error::Validation { .. }));
        }
        other => panic!("expected SessionFailed, got {other:?}"),
    }

    let state = store.state.lock().unwrap();
    // Completion is never attempted; the staged parts are discarded.
    assert_eq!(state.completions, 0);
    assert_eq!(state.aborts, 1);
}

#[tokio::test]
async fn retry_budget_exhaustion_surfaces_the_part() {
    let dir = TempDir::new().unwrap();
    let (path, _) = create_random_file(&dir, "busy.bin", 5000);
    // Part 1 stays busy longer than the retry budget allows.
    let store = FakeStore::busy_for(1, 100);
    let mut config = test_config();
    config.max_retries = 2;

    let err = ChunkedUploader::new(&store, &config)
        .upload(&path, "busy.bin")
        .await
        .unwrap_err();

    match err {
        Error::SessionFailed { source, .. } => match *source {
            Error::RetryExhausted {
                part_number,
                attempts,
                ..
            } => {
                assert_eq!(part_number, 1);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        },
        other => panic!("expected SessionFailed, got {other:?}"),
    }

    assert_eq!(store.state.lock().unwrap().completions, 0);
}

#[tokio::test]
async fn size_mismatch_at_completion_is_an_integrity_failure() {
    let dir = TempDir::new().unwrap();
    let (path, _) = create_random_file(&dir, "skewed.bin", 10 * 1024);
    let store = FakeStore::with_size_skew(-1);
    let config = test_config();

    let err = ChunkedUploader::new(&store, &config)
        .upload(&path, "skewed.bin")
        .await
        .unwrap_err();

    match err {
        Error::SessionFailed { source, .. } => {
            assert!(matches!(
                *source,
                Error::Integrity {
                    expected: 10240,
                    actual: 10239
                }
            ));
        }
        other => panic!("expected SessionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn in_flight_chunks_respect_the_concurrency_bound() {
    let dir = TempDir::new().unwrap();
    let (path, _) = create_random_file(&dir, "wide.bin", 32 * 1024);
    let store = FakeStore::default();
    let mut config = test_config();
    config.max_concurrent_chunks = 2;

    ChunkedUploader::new(&store, &config)
        .upload(&path, "wide.bin")
        .await
        .unwrap();

    let state = store.state.lock().unwrap();
    assert_eq!(state.chunks.len(), 8);
    assert!(
        state.max_in_flight <= 2,
        "observed {} concurrent chunk uploads",
        state.max_in_flight
    );
}

#[tokio::test]
async fn small_file_bypasses_chunking_entirely() {
    let dir = TempDir::new().unwrap();
    let (path, content) = create_random_file(&dir, "small.txt", 500);
    let store = FakeStore::default();
    let config = test_config();

    HttpUploader::new(&store, &config)
        .upload(path.to_str().unwrap(), "docs", false)
        .await
        .unwrap();

    let state = store.state.lock().unwrap();
    assert_eq!(state.whole_files.len(), 1);
    assert_eq!(state.whole_files[0].1, "small.txt");
    // No session artifacts: no chunks staged, no completion requested.
    assert!(state.chunks.is_empty());
    assert_eq!(state.completions, 0);
    assert_eq!(state.merged["docs/small.txt"], content);
}

#[tokio::test]
async fn zero_byte_file_takes_the_whole_file_path() {
    let dir = TempDir::new().unwrap();
    let (path, _) = create_random_file(&dir, "empty.bin", 0);
    let store = FakeStore::default();
    let config = test_config();

    HttpUploader::new(&store, &config)
        .upload(path.to_str().unwrap(), "", false)
        .await
        .unwrap();

    let state = store.state.lock().unwrap();
    assert_eq!(state.whole_files.len(), 1);
    assert!(state.chunks.is_empty());
    assert_eq!(state.merged["empty.bin"], Vec::<u8>::new());
}

#[tokio::test]
async fn cancellation_stops_dispatch_and_aborts_session() {
    let dir = TempDir::new().unwrap();
    // 8 parts of 4096 bytes, each taking 50 ms to stage.
    let (path, _) = create_random_file(&dir, "cancelled.bin", 32 * 1024);
    let store = FakeStore::slow(Duration::from_millis(50));
    let mut config = test_config();
    config.max_concurrent_chunks = 2;

    let uploader = ChunkedUploader::new(&store, &config);
    let token = uploader.cancellation_token();

    let (result, _) = tokio::join!(uploader.upload(&path, "cancelled.bin"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    match result.unwrap_err() {
        Error::SessionFailed { source, .. } => {
            assert!(matches!(*source, Error::Cancelled));
        }
        other => panic!("expected SessionFailed, got {other:?}"),
    }

    let state = store.state.lock().unwrap();
    // Dispatch stopped: parts beyond the in-flight window were never staged,
    // completion was never requested, and the staged prefix was discarded.
    assert!(state.chunks.len() < 8, "staged {} parts", state.chunks.len());
    assert_eq!(state.completions, 0);
    assert_eq!(state.aborts, 1);
}

#[tokio::test]
async fn session_timeout_forces_session_failure() {
    let dir = TempDir::new().unwrap();
    let (path, _) = create_random_file(&dir, "stalled.bin", 16 * 1024);
    // Every chunk stalls well past the whole-session budget.
    let store = FakeStore::slow(Duration::from_millis(200));
    let mut config = test_config();
    config.session_timeout = Duration::from_millis(50);

    let err = ChunkedUploader::new(&store, &config)
        .upload(&path, "stalled.bin")
        .await
        .unwrap_err();

    match err {
        Error::SessionFailed { source, .. } => {
            assert!(matches!(*source, Error::SessionTimeout { .. }));
        }
        other => panic!("expected SessionFailed, got {other:?}"),
    }

    let state = store.state.lock().unwrap();
    assert_eq!(state.completions, 0);
    assert_eq!(state.aborts, 1);
}

#[tokio::test]
async fn large_file_over_threshold_goes_through_a_session() {
    let dir = TempDir::new().unwrap();
    let (path, content) = create_random_file(&dir, "big.bin", 12 * 1024);
    let store = FakeStore::default();
    let config = test_config();

    HttpUploader::new(&store, &config)
        .upload(path.to_str().unwrap(), "data", false)
        .await
        .unwrap();

    let state = store.state.lock().unwrap();
    assert!(state.whole_files.is_empty());
    assert_eq!(state.completions, 1);
    assert_eq!(state.merged["data/big.bin"], content);
}
