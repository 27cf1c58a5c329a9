//! Error types for the graph model.
//!
//! Only programmer and configuration mistakes surface here. A refused port
//! pairing is not an error: `NodeGraph::connect` reports it as `Ok(None)`.

use crate::id::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("unknown field type \"{0}\"; register it with FieldRegistry::register")]
    UnknownType(String),
    #[error("field `{key}` expects {expected}")]
    InvalidValue { key: String, expected: &'static str },
    #[error("node has no field keyed `{0}`")]
    UnknownKey(String),
    #[error("malformed {kind} field: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} is not attached to this graph")]
    Detached(NodeId),
    #[error("node {0} is already in this graph")]
    DuplicateId(NodeId),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("graph json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot encode: {0}")]
    SnapshotEncode(#[from] rmp_serde::encode::Error),
    #[error("snapshot decode: {0}")]
    SnapshotDecode(#[from] rmp_serde::decode::Error),
}
