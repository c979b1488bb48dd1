use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    FIELD_CHUNK_NUMBER, FIELD_CHUNK_SIZE, FIELD_FILENAME, FIELD_IDENTIFIER, FIELD_RELATIVE_PATH,
    FIELD_TOTAL_CHUNKS, FIELD_TOTAL_SIZE,
};

/// Errors produced while decoding an upload descriptor from form fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("missing field: {0}")]
    Missing(&'static str),

    #[error("field {field} is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("field {0} must not be empty")]
    Empty(&'static str),
}

/// Per-request upload metadata, as sent by flow.js with every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    /// Index of this chunk. The first chunk is 1.
    #[serde(rename = "flowChunkNumber")]
    pub chunk_number: u64,
    /// Total number of chunks.
    #[serde(rename = "flowTotalChunks")]
    pub total_chunks: u64,
    /// Nominal chunk size. The last chunk may be anything below twice this.
    #[serde(rename = "flowChunkSize")]
    pub chunk_size: u64,
    /// Total file size in bytes.
    #[serde(rename = "flowTotalSize")]
    pub total_size: u64,
    /// Opaque identifier shared by all chunks of one file.
    #[serde(rename = "flowIdentifier")]
    pub identifier: String,
    /// Name given to the reassembled file.
    #[serde(rename = "flowFilename")]
    pub filename: String,
    /// Relative path of the file on the client. Not used for storage.
    #[serde(rename = "flowRelativePath")]
    pub relative_path: String,
}

impl UploadDescriptor {
    /// Decodes a descriptor from form fields.
    ///
    /// `lookup` returns the raw value of a form field, or `None` if the field
    /// is absent. Fields are checked in protocol order and the first failure
    /// is returned.
    pub fn from_fields<'a, F>(lookup: F) -> Result<Self, DescriptorError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        Ok(Self {
            chunk_number: number_field(&lookup, FIELD_CHUNK_NUMBER, 1)?,
            total_chunks: number_field(&lookup, FIELD_TOTAL_CHUNKS, 1)?,
            chunk_size: number_field(&lookup, FIELD_CHUNK_SIZE, 1)?,
            total_size: number_field(&lookup, FIELD_TOTAL_SIZE, 0)?,
            identifier: text_field(&lookup, FIELD_IDENTIFIER)?,
            filename: text_field(&lookup, FIELD_FILENAME)?,
            relative_path: text_field(&lookup, FIELD_RELATIVE_PATH)?,
        })
    }

    /// Decodes a descriptor from an already-parsed form.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, DescriptorError> {
        Self::from_fields(|name| form.get(name).map(String::as_str))
    }

    /// Returns `true` if this is the final chunk of the upload.
    pub fn is_last_chunk(&self) -> bool {
        self.chunk_number == self.total_chunks
    }

    /// File name of this chunk inside the upload directory.
    pub fn chunk_file_name(&self) -> String {
        self.chunk_number.to_string()
    }
}

fn number_field<'a, F>(lookup: &F, field: &'static str, min: i64) -> Result<u64, DescriptorError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let raw = lookup(field).ok_or(DescriptorError::Missing(field))?;
    let value: i64 = raw.parse().map_err(|_| DescriptorError::NotNumeric {
        field,
        value: raw.to_string(),
    })?;
    if value < min {
        return Err(DescriptorError::OutOfRange { field, value });
    }
    Ok(value as u64)
}

fn text_field<'a, F>(lookup: &F, field: &'static str) -> Result<String, DescriptorError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    match lookup(field) {
        None => Err(DescriptorError::Missing(field)),
        Some("") => Err(DescriptorError::Empty(field)),
        Some(value) => Ok(value.to_string()),
    }
}
