//! Core data structures for xcprobe.
//!
//! This module contains the materialized model of an Xcode project document:
//! - Object identifiers (ObjectId)
//! - Typed records for the four kinds the lookup understands
//! - The parsed document with id-indexed access

pub mod document;
pub mod object_id;
pub mod record;

pub use document::ProjectDocument;
pub use object_id::{ObjectId, ObjectIdError};
pub use record::{
    BuildFile, FileReference, NativeTarget, Record, RecordBody, RecordKind, SourcesBuildPhase,
};
