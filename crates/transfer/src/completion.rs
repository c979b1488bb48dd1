use std::path::Path;

use crate::layout::is_staging;

/// Sums the sizes of all regular files directly under `upload_dir`.
///
/// Symlinks and subdirectories are not followed and count as nothing, the
/// same entries [`combine_chunks`](crate::combine_chunks) skips.
///
/// Best effort: a listing or stat failure is logged and contributes zero, so
/// the result may transiently under-report.
pub fn received_bytes(upload_dir: &Path) -> u64 {
    let entries = match std::fs::read_dir(upload_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %upload_dir.display(), error = %e, "failed to list upload directory");
            return 0;
        }
    };

    let mut total = 0u64;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %upload_dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        if is_staging(&entry.file_name()) {
            continue;
        }
        match entry.metadata() {
            Ok(meta) if meta.is_file() => total += meta.len(),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(file = %entry.path().display(), error = %e, "failed to stat chunk");
            }
        }
    }
    total
}

/// Returns `true` when the bytes on disk add up exactly to `total_size`.
///
/// Only sizes are compared: chunks may arrive in any order and the last one
/// may be larger than nominal. Two different chunk sets with the same sum are
/// indistinguishable.
pub fn is_complete(upload_dir: &Path, total_size: u64) -> bool {
    let received = received_bytes(upload_dir);
    tracing::debug!(dir = %upload_dir.display(), received, total_size, "completion check");
    received == total_size
}
