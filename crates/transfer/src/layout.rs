//! On-disk layout: `root/<identifier>/<chunk number>` while uploading,
//! `root/<identifier>/<filename>` once reassembled.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chunkflow_protocol::UploadDescriptor;

use crate::TransferError;
use crate::validation::{validate_filename, validate_path_component};

/// Prefix of hidden files used for in-flight writes.
///
/// Staging files never count towards an upload's received bytes and are
/// never concatenated.
pub const STAGING_PREFIX: &str = ".chunkflow-";

/// Resolved paths for one chunk of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPaths {
    upload_dir: PathBuf,
    chunk_path: PathBuf,
    final_path: PathBuf,
}

impl UploadPaths {
    /// Builds the paths for `descriptor` under `root`.
    ///
    /// The identifier and filename must be plain, single path components, and
    /// the filename must not name one of the upload's chunk files.
    pub fn new(root: &Path, descriptor: &UploadDescriptor) -> Result<Self, TransferError> {
        let upload_dir = upload_dir(root, &descriptor.identifier)?;
        let last_chunk = descriptor.total_chunks.max(descriptor.chunk_number);
        validate_filename(&descriptor.filename, last_chunk)?;
        Ok(Self {
            chunk_path: upload_dir.join(descriptor.chunk_file_name()),
            final_path: upload_dir.join(&descriptor.filename),
            upload_dir,
        })
    }

    /// Directory holding every chunk of the upload.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// File holding this descriptor's chunk.
    pub fn chunk_path(&self) -> &Path {
        &self.chunk_path
    }

    /// Destination of the reassembled file.
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }
}

/// Returns the upload directory for `identifier` under `root`.
pub(crate) fn upload_dir(root: &Path, identifier: &str) -> Result<PathBuf, TransferError> {
    validate_path_component("identifier", identifier)?;
    Ok(root.join(identifier))
}

pub(crate) fn is_staging(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with(STAGING_PREFIX))
}

/// Parses a chunk file name back into its chunk number.
pub(crate) fn chunk_number(name: &OsStr) -> Option<u64> {
    let name = name.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(identifier: &str, filename: &str) -> UploadDescriptor {
        UploadDescriptor {
            chunk_number: 7,
            total_chunks: 10,
            chunk_size: 1024,
            total_size: 10_240,
            identifier: identifier.into(),
            filename: filename.into(),
            relative_path: filename.into(),
        }
    }

    #[test]
    fn builds_paths() {
        let paths = UploadPaths::new(Path::new("/srv/up"), &descriptor("abc123", "a.bin")).unwrap();
        assert_eq!(paths.upload_dir(), Path::new("/srv/up/abc123"));
        assert_eq!(paths.chunk_path(), Path::new("/srv/up/abc123/7"));
        assert_eq!(paths.final_path(), Path::new("/srv/up/abc123/a.bin"));
    }

    #[test]
    fn relative_path_does_not_affect_layout() {
        let mut desc = descriptor("abc123", "a.bin");
        desc.relative_path = "some/dir/a.bin".into();
        let paths = UploadPaths::new(Path::new("/srv/up"), &desc).unwrap();
        assert_eq!(paths.final_path(), Path::new("/srv/up/abc123/a.bin"));
    }

    #[test]
    fn rejects_traversal_in_identifier() {
        let err = UploadPaths::new(Path::new("/srv/up"), &descriptor("../etc", "a.bin"));
        assert!(matches!(err, Err(TransferError::InvalidPath(_))));
    }

    #[test]
    fn rejects_traversal_in_filename() {
        let err = UploadPaths::new(Path::new("/srv/up"), &descriptor("abc", "../../a.bin"));
        assert!(matches!(err, Err(TransferError::InvalidPath(_))));
    }

    #[test]
    fn numeric_filename_outside_chunk_range() {
        let paths = UploadPaths::new(Path::new("/srv/up"), &descriptor("abc", "2024")).unwrap();
        assert_eq!(paths.final_path(), Path::new("/srv/up/abc/2024"));
    }

    #[test]
    fn filename_naming_a_chunk_rejected() {
        let err = UploadPaths::new(Path::new("/srv/up"), &descriptor("abc", "10"));
        assert!(matches!(err, Err(TransferError::InvalidPath(_))));

        let mut desc = descriptor("abc", "12");
        desc.chunk_number = 12;
        let err = UploadPaths::new(Path::new("/srv/up"), &desc);
        assert!(matches!(err, Err(TransferError::InvalidPath(_))));
    }

    #[test]
    fn chunk_number_parsing() {
        assert_eq!(chunk_number(OsStr::new("1")), Some(1));
        assert_eq!(chunk_number(OsStr::new("10")), Some(10));
        assert_eq!(chunk_number(OsStr::new("a.bin")), None);
        assert_eq!(chunk_number(OsStr::new("+1")), None);
        assert_eq!(chunk_number(OsStr::new("")), None);
    }

    #[test]
    fn staging_detection() {
        assert!(is_staging(OsStr::new(".chunkflow-x1y2")));
        assert!(!is_staging(OsStr::new("3")));
    }
}
