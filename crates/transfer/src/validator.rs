//! One-shot health check of the storage root.
//!
//! The probe creates, writes, reads back and deletes a throwaway subtree under
//! the root. It runs at most once per [`RootValidator`]; the outcome is cached
//! for the validator's lifetime and is never refreshed, even if the root
//! later disappears or becomes read-only.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::layout::STAGING_PREFIX;
use crate::permissions::FilePermissions;

const PROBE_CHUNK: &str = "42";
const PROBE_FILE: &str = "probe";
const PROBE_CONTENT: &[u8] = b"For instance, on the planet Earth, man had always assumed that he was \
more intelligent than dolphins because he had achieved so much, the wheel, New York, wars and so on, \
whilst all the dolphins had ever done was muck about in the water having a good time.";

/// Reasons a storage root fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RootError {
    #[error("the storage root doesn't exist or is not a directory")]
    NoRootDirectory,

    #[error("can't create a directory under the storage root")]
    CannotCreateDirectory,

    #[error("can't write to a file under the storage root")]
    CannotWriteFile,

    #[error("can't read a file under the storage root (or got back bad data)")]
    CannotReadFile,

    #[error("can't delete a file/directory under the storage root")]
    CannotDelete,
}

/// Validates a storage root once and remembers the result.
#[derive(Debug)]
pub struct RootValidator {
    root: PathBuf,
    perms: FilePermissions,
    outcome: OnceLock<Result<(), RootError>>,
    probes: AtomicUsize,
}

impl RootValidator {
    pub fn new(root: impl Into<PathBuf>, perms: FilePermissions) -> Self {
        Self {
            root: root.into(),
            perms,
            outcome: OnceLock::new(),
            probes: AtomicUsize::new(0),
        }
    }

    /// Returns the validated root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the root, probing the filesystem only on the first call.
    ///
    /// Concurrent first callers block until the single probe finishes and
    /// then all observe its result.
    pub fn validate(&self) -> Result<(), RootError> {
        *self.outcome.get_or_init(|| self.probe())
    }

    /// Number of filesystem probes performed so far (0 or 1).
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn probe(&self) -> Result<(), RootError> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        if !self.root.is_dir() {
            tracing::warn!(root = %self.root.display(), "storage root is missing or not a directory");
            return Err(RootError::NoRootDirectory);
        }

        let probe_dir = self
            .root
            .join(format!("{STAGING_PREFIX}probe-{}", uuid::Uuid::new_v4().simple()));
        let chunk_dir = probe_dir.join(PROBE_CHUNK);
        self.perms
            .create_dir_all(&chunk_dir)
            .map_err(|e| fail(RootError::CannotCreateDirectory, &chunk_dir, e))?;

        let file = chunk_dir.join(PROBE_FILE);
        std::fs::write(&file, PROBE_CONTENT)
            .and_then(|()| self.perms.apply_file_mode(&file))
            .map_err(|e| fail(RootError::CannotWriteFile, &file, e))?;

        let content =
            std::fs::read(&file).map_err(|e| fail(RootError::CannotReadFile, &file, e))?;
        if content != PROBE_CONTENT {
            tracing::warn!(path = %file.display(), "probe file read back with different content");
            return Err(RootError::CannotReadFile);
        }

        std::fs::remove_dir_all(&probe_dir)
            .map_err(|e| fail(RootError::CannotDelete, &probe_dir, e))?;

        if is_system_temp_dir(&self.root) {
            tracing::warn!(
                root = %self.root.display(),
                "storage root is the system temp directory; consider a dedicated subdirectory for uploads"
            );
        }

        tracing::debug!(root = %self.root.display(), "storage root validated");
        Ok(())
    }
}

fn fail(kind: RootError, path: &Path, err: std::io::Error) -> RootError {
    tracing::warn!(path = %path.display(), error = %err, "{kind}");
    kind
}

fn is_system_temp_dir(root: &Path) -> bool {
    let temp = std::env::temp_dir();
    match (std::fs::canonicalize(root), std::fs::canonicalize(&temp)) {
        (Ok(a), Ok(b)) => a == b,
        _ => root == temp,
    }
}
