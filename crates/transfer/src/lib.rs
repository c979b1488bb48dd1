//! Chunk persistence and reassembly for flow.js chunked uploads.
//!
//! Chunks of one logical file are stored under `root/<identifier>/<chunk>`.
//! Once the bytes on disk add up to the declared total size, the chunks are
//! concatenated in chunk-index order into `root/<identifier>/<filename>` and
//! removed. [`ChunkFlow`] ties the pieces together behind a per-upload lock.

mod combine;
mod completion;
mod config;
mod flow;
mod layout;
mod locks;
mod permissions;
mod status;
mod store;
mod sweep;
mod validation;
mod validator;

use std::path::PathBuf;

pub use combine::combine_chunks;
pub use completion::{is_complete, received_bytes};
pub use config::{DEFAULT_RETENTION_SECS, FlowConfig};
pub use flow::{ChunkFlow, UploadOutcome};
pub use layout::{STAGING_PREFIX, UploadPaths};
pub use locks::UploadLocks;
pub use permissions::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, FilePermissions};
pub use status::chunk_status;
pub use store::store_chunk;
pub use sweep::{SweepReport, sweep};
pub use validation::{validate_filename, validate_path_component};
pub use validator::{RootError, RootValidator};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("storage root unusable: {0}")]
    Root(#[from] RootError),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("can't write chunk file {}: {source}", .path.display())]
    CannotWriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("can't read chunk file {}: {source}", .path.display())]
    CannotReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("blocking task failed: {0}")]
    Join(String),
}
