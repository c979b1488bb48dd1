use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::{STATUS_INTERNAL_ERROR, STATUS_NOT_YET_RECEIVED, STATUS_OK};

/// Outcome of a chunk status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Chunk present and correctly sized.
    Received,
    /// Chunk not received yet; the client should (re)send it.
    NotYetReceived,
    /// Chunk present but not the nominal size.
    WrongSize,
    /// The storage root failed validation.
    BrokenStorage,
    /// The descriptor's identifier or filename cannot be used as a path.
    InvalidRequest,
}

impl StatusKind {
    /// HTTP status code for this outcome.
    pub fn code(self) -> u16 {
        match self {
            StatusKind::Received => STATUS_OK,
            StatusKind::NotYetReceived => STATUS_NOT_YET_RECEIVED,
            StatusKind::WrongSize | StatusKind::BrokenStorage | StatusKind::InvalidRequest => {
                STATUS_INTERNAL_ERROR
            }
        }
    }
}

/// Human-readable reply to a chunk status query, ready to send as a response.
///
/// Serializes as `{"kind", "code", "message"}`; `code` is derived from `kind`
/// and ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChunkStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl ChunkStatus {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// HTTP status code for this reply.
    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    /// Returns `true` only when the chunk is present and correctly sized.
    pub fn is_received(&self) -> bool {
        self.kind == StatusKind::Received
    }
}

impl Serialize for ChunkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ChunkStatus", 3)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}
