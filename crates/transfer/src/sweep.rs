use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::TransferError;
use crate::locks::UploadLocks;

/// Outcome of one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries examined under the root.
    pub scanned: usize,
    /// Entries removed for being older than the retention.
    pub removed: usize,
}

/// Removes every entry directly under `root` whose modification time is
/// strictly older than `max_age`.
///
/// Stops at the first listing, stat or delete failure and returns it; the
/// remaining entries are left for the next sweep.
pub fn sweep(root: &Path, max_age: Duration) -> Result<SweepReport, TransferError> {
    sweep_at(root, max_age, SystemTime::now(), &UploadLocks::new())
}

/// Sweeps as of `now`, taking each entry's upload lock while removing it.
pub(crate) fn sweep_at(
    root: &Path,
    max_age: Duration,
    now: SystemTime,
    locks: &UploadLocks,
) -> Result<SweepReport, TransferError> {
    let mut report = SweepReport::default();

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        report.scanned += 1;

        let name = entry.file_name();
        let removed = locks.with_lock(&name.to_string_lossy(), || -> std::io::Result<bool> {
            let meta = std::fs::symlink_metadata(&path)?;
            // A modification time in the future counts as brand new.
            let age = now
                .duration_since(meta.modified()?)
                .unwrap_or(Duration::ZERO);
            if age <= max_age {
                return Ok(false);
            }
            if meta.is_dir() {
                std::fs::remove_dir_all(&path)?;
            } else {
                std::fs::remove_file(&path)?;
            }
            tracing::info!(path = %path.display(), age_secs = age.as_secs(), "removed expired upload");
            Ok(true)
        })?;
        if removed {
            report.removed += 1;
        }
    }

    tracing::debug!(
        root = %root.display(),
        scanned = report.scanned,
        removed = report.removed,
        "retention sweep finished"
    );
    Ok(report)
}
