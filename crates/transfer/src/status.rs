use chunkflow_protocol::{ChunkStatus, StatusKind, UploadDescriptor};

use crate::layout::UploadPaths;
use crate::validator::RootValidator;

/// Answers whether a chunk has been received and has the expected size.
///
/// Never writes. A missing chunk is a regular outcome
/// ([`StatusKind::NotYetReceived`]) telling the client to send it.
pub fn chunk_status(
    validator: &RootValidator,
    paths: &UploadPaths,
    descriptor: &UploadDescriptor,
) -> ChunkStatus {
    if let Err(e) = validator.validate() {
        return ChunkStatus::new(
            StatusKind::BrokenStorage,
            format!("Directory is broken: {e}"),
        );
    }

    let chunk = format!("{}:{}", descriptor.identifier, descriptor.chunk_number);
    let len = match std::fs::metadata(paths.chunk_path()) {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => {
            return ChunkStatus::new(
                StatusKind::NotYetReceived,
                format!("The chunk {chunk} isn't started yet!"),
            );
        }
    };

    // The last chunk may be up to twice the nominal size.
    if !descriptor.is_last_chunk() && len != descriptor.chunk_size {
        return ChunkStatus::new(
            StatusKind::WrongSize,
            format!("The chunk {chunk} is the wrong size!"),
        );
    }

    ChunkStatus::new(StatusKind::Received, format!("The chunk {chunk} looks great!"))
}
