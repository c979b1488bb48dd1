use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default mode for directories created under the storage root (before umask).
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// Default mode for chunk and reassembled files.
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Modes applied to everything created under the storage root.
///
/// Only meaningful on Unix; elsewhere the platform defaults are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePermissions {
    pub dir_mode: u32,
    pub file_mode: u32,
}

impl Default for FilePermissions {
    fn default() -> Self {
        Self {
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

impl FilePermissions {
    /// Creates `path` and all missing parents with `dir_mode`.
    pub fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        std::os::unix::fs::DirBuilderExt::mode(&mut builder, self.dir_mode);
        builder.create(path)
    }

    /// Sets `file_mode` on an existing file.
    pub fn apply_file_mode(&self, path: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(self.file_mode))?;
        }
        #[cfg(not(unix))]
        let _ = path;
        Ok(())
    }
}
