use std::path::{Component, Path};

use crate::TransferError;
use crate::layout::STAGING_PREFIX;

/// Validates that `value` is usable as a single path component under the
/// storage root.
///
/// Rejects:
/// - Empty values
/// - Absolute paths and Windows prefixes (`C:`, `\\server`)
/// - Anything containing a path separator
/// - `.` and `..`
/// - Names reserved for staging files
pub fn validate_path_component(kind: &str, value: &str) -> Result<(), TransferError> {
    if value.is_empty() {
        return Err(TransferError::InvalidPath(format!("empty {kind}")));
    }

    if value.contains(['/', '\\']) {
        return Err(TransferError::InvalidPath(format!(
            "{kind} must not contain a path separator: {value}"
        )));
    }

    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        (Some(Component::ParentDir), _) => {
            return Err(TransferError::InvalidPath(format!(
                "parent directory traversal not allowed: {value}"
            )));
        }
        _ => {
            return Err(TransferError::InvalidPath(format!(
                "{kind} is not a plain name: {value}"
            )));
        }
    }

    if value.starts_with(STAGING_PREFIX) {
        return Err(TransferError::InvalidPath(format!(
            "{kind} uses the reserved prefix {STAGING_PREFIX}: {value}"
        )));
    }

    Ok(())
}

/// Validates the name of a reassembled file for an upload whose chunks are
/// numbered `1..=last_chunk`.
///
/// Besides the component checks, a name spelling one of those chunk numbers
/// is rejected since it would be the same file as that chunk. Other numeric
/// names such as `2024` are fine.
pub fn validate_filename(filename: &str, last_chunk: u64) -> Result<(), TransferError> {
    validate_path_component("filename", filename)?;
    let collides = filename
        .parse::<u64>()
        .is_ok_and(|n| (1..=last_chunk).contains(&n) && n.to_string() == filename);
    if collides {
        return Err(TransferError::InvalidPath(format!(
            "filename collides with a chunk file name: {filename}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(validate_path_component("identifier", "").is_err());
    }

    #[test]
    fn rejects_parent_dir() {
        assert!(validate_path_component("identifier", "..").is_err());
    }

    #[test]
    fn rejects_current_dir() {
        assert!(validate_path_component("identifier", ".").is_err());
    }

    #[test]
    fn rejects_nested_path() {
        assert!(validate_path_component("identifier", "a/b").is_err());
        assert!(validate_path_component("identifier", "../../etc/passwd").is_err());
    }

    #[test]
    fn rejects_absolute_path() {
        assert!(validate_path_component("identifier", "/tmp/evil").is_err());
    }

    #[test]
    fn rejects_backslash() {
        assert!(validate_path_component("identifier", "C:\\Windows\\evil").is_err());
    }

    #[test]
    fn rejects_staging_prefix() {
        let name = format!("{STAGING_PREFIX}abc");
        assert!(validate_path_component("identifier", &name).is_err());
    }

    #[test]
    fn accepts_flow_identifier() {
        assert!(validate_path_component("identifier", "1048576-my-photojpg").is_ok());
    }

    #[test]
    fn accepts_dotfile() {
        assert!(validate_path_component("filename", ".bashrc").is_ok());
    }

    #[test]
    fn filename_rejects_chunk_names() {
        assert!(validate_filename("1", 3).is_err());
        assert!(validate_filename("2", 3).is_err());
        assert!(validate_filename("3", 3).is_err());
    }

    #[test]
    fn filename_accepts_numbers_past_last_chunk() {
        assert!(validate_filename("2024", 3).is_ok());
        assert!(validate_filename("4", 3).is_ok());
        assert!(validate_filename("0", 3).is_ok());
        assert!(validate_filename("02", 3).is_ok());
    }

    #[test]
    fn filename_accepts_regular_name() {
        assert!(validate_filename("2024.tar.gz", 3).is_ok());
        assert!(validate_filename("photo.jpg", 3).is_ok());
    }

    #[test]
    fn filename_rejects_traversal() {
        assert!(validate_filename("..", 3).is_err());
    }
}
