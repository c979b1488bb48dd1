//! Wire types for the flow.js / ng-flow chunked-upload protocol.
//!
//! The HTTP layer decodes the request form into an [`UploadDescriptor`]
//! before handing it to the transfer engine, and turns a [`ChunkStatus`]
//! back into a response.

pub mod constants;
pub mod descriptor;
pub mod status;

pub use descriptor::{DescriptorError, UploadDescriptor};
pub use status::{ChunkStatus, StatusKind};
