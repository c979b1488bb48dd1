use std::io::{Read, Write};

use crate::TransferError;
use crate::layout::{STAGING_PREFIX, UploadPaths};
use crate::permissions::FilePermissions;

/// Persists one chunk payload at its canonical location.
///
/// - Creates the upload directory and any missing parents.
/// - Reads the whole payload into memory.
/// - Writes it to a staging file and renames it over the chunk path, so a
///   reader never sees a half-written chunk.
///
/// Returns the number of bytes stored. On failure nothing needs cleaning up;
/// the client simply resends the chunk.
pub fn store_chunk<R: Read>(
    paths: &UploadPaths,
    mut payload: R,
    perms: &FilePermissions,
) -> Result<u64, TransferError> {
    let write_err = |source: std::io::Error| TransferError::CannotWriteFile {
        path: paths.chunk_path().to_path_buf(),
        source,
    };

    perms.create_dir_all(paths.upload_dir()).map_err(write_err)?;

    let mut data = Vec::new();
    payload.read_to_end(&mut data).map_err(write_err)?;

    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(paths.upload_dir())
        .map_err(write_err)?;
    staged.write_all(&data).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    perms.apply_file_mode(staged.path()).map_err(write_err)?;
    staged
        .persist(paths.chunk_path())
        .map_err(|e| write_err(e.error))?;

    tracing::debug!(
        path = %paths.chunk_path().display(),
        bytes = data.len(),
        "chunk stored"
    );
    Ok(data.len() as u64)
}
