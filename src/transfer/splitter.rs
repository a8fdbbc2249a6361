//! Deterministic partitioning of a file into ordered, non-overlapping chunks.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

use crate::error::{Error, Result};

/// Pure chunking arithmetic over a file size and chunk size.
///
/// Part numbers are 1-indexed and contiguous; only the last part may be
/// shorter than the chunk size. A zero-byte file yields zero parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(file_size: u64, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig {
                message: "chunk size must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            file_size,
            chunk_size,
        })
    }

    pub fn total_parts(&self) -> u32 {
        self.file_size.div_ceil(self.chunk_size) as u32
    }

    pub fn total_size(&self) -> u64 {
        self.file_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Ascending part numbers `1..=total_parts`; empty for a zero-byte file.
    pub fn part_numbers(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.total_parts()
    }

    // Byte offset where `part_number` starts. Callers validate the part
    // number first; part 0 does not exist.
    fn offset(&self, part_number: u32) -> u64 {
        u64::from(part_number - 1) * self.chunk_size
    }

    /// Length of `part_number` in bytes; zero for part numbers outside the
    /// plan.
    pub fn part_len(&self, part_number: u32) -> u64 {
        if !self.contains(part_number) {
            return 0;
        }
        (self.file_size - self.offset(part_number)).min(self.chunk_size)
    }

    fn contains(&self, part_number: u32) -> bool {
        part_number >= 1 && part_number <= self.total_parts()
    }
}

/// Reads any part of a file by index, without replaying earlier parts.
///
/// Each read opens its own handle so concurrent part uploads and retries
/// never share a file cursor.
pub struct FileSplitter {
    path: PathBuf,
    plan: ChunkPlan,
}

impl FileSplitter {
    pub async fn open(path: &Path, chunk_size: u64) -> Result<Self> {
        let file_size = fs::metadata(path).await?.len();
        Ok(Self {
            path: path.to_path_buf(),
            plan: ChunkPlan::new(file_size, chunk_size)?,
        })
    }

    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    /// Read the payload of one part. Restartable: the same part can be read
    /// again for a retry and yields identical bytes.
    pub async fn read_part(&self, part_number: u32) -> Result<Vec<u8>> {
        if !self.plan.contains(part_number) {
            return Err(Error::Validation {
                message: format!(
                    "part {part_number} out of range 1..={}",
                    self.plan.total_parts()
                ),
            });
        }

        let mut file = fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.plan.offset(part_number)))
            .await?;
        let mut payload = vec![0u8; self.plan.part_len(part_number) as usize];
        file.read_exact(&mut payload).await?;
        Ok(payload)
    }
}
