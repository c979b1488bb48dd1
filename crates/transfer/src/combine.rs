//! Reassembly of a completed upload.
//!
//! Runs in two phases. **Stage**: every chunk is appended, in chunk-number
//! order, to a staging file; the chunks themselves are untouched, so a
//! failure here leaves the upload exactly as it was. **Commit**: the staging
//! file is synced and renamed to the destination, then the chunks are
//! deleted. A failure while deleting leaves the destination plus some
//! leftover chunks behind and is reported as an error; nothing rolls it back.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::TransferError;
use crate::layout::{STAGING_PREFIX, UploadPaths, chunk_number, is_staging};
use crate::permissions::FilePermissions;

struct Source {
    path: PathBuf,
    name: OsString,
    number: Option<u64>,
}

/// Concatenates every chunk under the upload directory into the destination
/// file and removes the chunks.
///
/// Chunks are ordered numerically by chunk number, so `10` follows `9`.
/// Files whose names are not chunk numbers go last, ordered by name. An
/// existing destination file is skipped as an input and replaced.
///
/// Returns the absolute path of the reassembled file.
pub fn combine_chunks(
    paths: &UploadPaths,
    perms: &FilePermissions,
) -> Result<PathBuf, TransferError> {
    let sources = list_sources(paths)?;
    let staged = stage(paths, &sources)?;
    commit(paths, perms, staged, &sources)
}

/// Appends every source to a new staging file. Sources are only read.
fn stage(paths: &UploadPaths, sources: &[Source]) -> Result<NamedTempFile, TransferError> {
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(paths.upload_dir())?;
    for source in sources {
        let read_err = |e: std::io::Error| TransferError::CannotReadFile {
            path: source.path.clone(),
            source: e,
        };
        let mut input = std::fs::File::open(&source.path).map_err(read_err)?;
        std::io::copy(&mut input, staged.as_file_mut()).map_err(read_err)?;
    }
    staged.as_file_mut().flush()?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

/// Moves the staged file into place, then deletes the consumed sources.
fn commit(
    paths: &UploadPaths,
    perms: &FilePermissions,
    staged: NamedTempFile,
    sources: &[Source],
) -> Result<PathBuf, TransferError> {
    perms.apply_file_mode(staged.path())?;
    staged
        .persist(paths.final_path())
        .map_err(|e| TransferError::Io(e.error))?;

    let mut first_err = None;
    for source in sources {
        if let Err(e) = std::fs::remove_file(&source.path) {
            tracing::warn!(file = %source.path.display(), error = %e, "failed to remove consumed chunk");
            first_err.get_or_insert(e);
        }
    }
    if let Some(e) = first_err {
        return Err(TransferError::Io(e));
    }

    let combined = std::path::absolute(paths.final_path())?;
    tracing::debug!(
        path = %combined.display(),
        chunks = sources.len(),
        "chunks combined"
    );
    Ok(combined)
}

fn list_sources(paths: &UploadPaths) -> Result<Vec<Source>, TransferError> {
    let final_name = paths.final_path().file_name();

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(paths.upload_dir())? {
        let entry = entry?;
        let name = entry.file_name();
        if Some(name.as_os_str()) == final_name || is_staging(&name) {
            continue;
        }
        if !entry.metadata()?.is_file() {
            continue;
        }
        sources.push(Source {
            path: entry.path(),
            number: chunk_number(&name),
            name,
        });
    }

    sources.sort_by(|a, b| match (a.number, b.number) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
    Ok(sources)
}
