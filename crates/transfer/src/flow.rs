use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chunkflow_protocol::{ChunkStatus, StatusKind, UploadDescriptor};

use crate::TransferError;
use crate::combine::combine_chunks;
use crate::completion::is_complete;
use crate::config::FlowConfig;
use crate::layout::{self, UploadPaths};
use crate::locks::UploadLocks;
use crate::status::chunk_status;
use crate::store::store_chunk;
use crate::sweep::{SweepReport, sweep_at};
use crate::validator::RootValidator;

/// Result of handing one chunk to [`ChunkFlow::upload_chunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Chunk stored; more chunks are expected.
    Incomplete,
    /// All bytes arrived and the file was reassembled at this path.
    Complete(PathBuf),
}

impl UploadOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, UploadOutcome::Complete(_))
    }
}

/// Chunked-upload service bound to one storage root.
///
/// Owns the root's validator (probed once, on first use) and the per-upload
/// locks that make "store, check completion, combine" atomic with respect to
/// other calls on the same service.
#[derive(Debug)]
pub struct ChunkFlow {
    config: FlowConfig,
    validator: RootValidator,
    locks: UploadLocks,
}

impl ChunkFlow {
    pub fn new(config: FlowConfig) -> Self {
        let validator = RootValidator::new(config.root(), config.permissions());
        Self {
            config,
            validator,
            locks: UploadLocks::new(),
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn validator(&self) -> &RootValidator {
        &self.validator
    }

    /// Directory holding the chunks of `identifier`.
    pub fn upload_dir(&self, identifier: &str) -> Result<PathBuf, TransferError> {
        layout::upload_dir(self.config.root(), identifier)
    }

    /// Stores one chunk and reassembles the file once every byte is on disk.
    ///
    /// Call it for every chunk until it returns [`UploadOutcome::Complete`].
    /// The payload is read in full before the upload's lock is taken, so a
    /// slow request body never holds up other chunks of the same upload.
    pub fn upload_chunk<R: Read>(
        &self,
        descriptor: &UploadDescriptor,
        mut payload: R,
    ) -> Result<UploadOutcome, TransferError> {
        self.validator.validate()?;
        let paths = UploadPaths::new(self.config.root(), descriptor)?;
        let perms = self.config.permissions();

        let mut data = Vec::new();
        payload
            .read_to_end(&mut data)
            .map_err(|source| TransferError::CannotWriteFile {
                path: paths.chunk_path().to_path_buf(),
                source,
            })?;

        self.locks.with_lock(&descriptor.identifier, || -> Result<_, TransferError> {
            store_chunk(&paths, data.as_slice(), &perms)?;
            if !is_complete(paths.upload_dir(), descriptor.total_size) {
                return Ok(UploadOutcome::Incomplete);
            }

            let path = combine_chunks(&paths, &perms)?;
            tracing::info!(
                identifier = %descriptor.identifier,
                path = %path.display(),
                total_size = descriptor.total_size,
                "upload complete"
            );
            Ok(UploadOutcome::Complete(path))
        })
    }

    /// Reports whether the descriptor's chunk was received with the right size.
    pub fn chunk_status(&self, descriptor: &UploadDescriptor) -> ChunkStatus {
        match UploadPaths::new(self.config.root(), descriptor) {
            Ok(paths) => chunk_status(&self.validator, &paths, descriptor),
            Err(e) => ChunkStatus::new(StatusKind::InvalidRequest, e.to_string()),
        }
    }

    /// Removes uploads untouched for longer than `max_age`.
    pub fn cleanup(&self, max_age: Duration) -> Result<SweepReport, TransferError> {
        sweep_at(self.config.root(), max_age, SystemTime::now(), &self.locks)
    }

    /// Removes uploads older than the configured retention.
    pub fn cleanup_expired(&self) -> Result<SweepReport, TransferError> {
        self.cleanup(self.config.retention())
    }

    /// [`upload_chunk`](Self::upload_chunk) on the blocking thread pool.
    pub async fn upload_chunk_async(
        self: Arc<Self>,
        descriptor: UploadDescriptor,
        payload: Vec<u8>,
    ) -> Result<UploadOutcome, TransferError> {
        tokio::task::spawn_blocking(move || self.upload_chunk(&descriptor, payload.as_slice()))
            .await
            .map_err(|e| TransferError::Join(e.to_string()))?
    }

    /// [`chunk_status`](Self::chunk_status) on the blocking thread pool.
    pub async fn chunk_status_async(
        self: Arc<Self>,
        descriptor: UploadDescriptor,
    ) -> Result<ChunkStatus, TransferError> {
        tokio::task::spawn_blocking(move || self.chunk_status(&descriptor))
            .await
            .map_err(|e| TransferError::Join(e.to_string()))
    }

    /// [`cleanup`](Self::cleanup) on the blocking thread pool.
    pub async fn cleanup_async(
        self: Arc<Self>,
        max_age: Duration,
    ) -> Result<SweepReport, TransferError> {
        tokio::task::spawn_blocking(move || self.cleanup(max_age))
            .await
            .map_err(|e| TransferError::Join(e.to_string()))?
    }
}
