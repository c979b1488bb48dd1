//! Form field names and status codes shared with flow.js clients.

/// Index of the chunk in the current upload, 1-based.
pub const FIELD_CHUNK_NUMBER: &str = "flowChunkNumber";
/// Total number of chunks.
pub const FIELD_TOTAL_CHUNKS: &str = "flowTotalChunks";
/// Nominal chunk size in bytes.
pub const FIELD_CHUNK_SIZE: &str = "flowChunkSize";
/// Total file size in bytes.
pub const FIELD_TOTAL_SIZE: &str = "flowTotalSize";
/// Unique identifier for the logical file.
pub const FIELD_IDENTIFIER: &str = "flowIdentifier";
/// Original file name.
pub const FIELD_FILENAME: &str = "flowFilename";
/// Relative path when a directory was selected (file name otherwise).
pub const FIELD_RELATIVE_PATH: &str = "flowRelativePath";

/// Multipart field carrying the chunk payload.
pub const FILE_FIELD: &str = "file";

/// Chunk present and correctly sized.
pub const STATUS_OK: u16 = 200;

/// Chunk not received yet.
///
/// flow.js treats 200/201/202 as done and 404/415/500/501 as permanent
/// errors; anything else makes it (re)send the chunk.
pub const STATUS_NOT_YET_RECEIVED: u16 = 406;

/// Broken storage root or a chunk of the wrong size.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Codes the flow.js client gives a fixed meaning to.
pub const RESERVED_CODES: [u16; 7] = [200, 201, 202, 404, 415, 500, 501];
