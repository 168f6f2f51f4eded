use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An image attached to a revision.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RevisionAttachment {
    pub id: String,
    pub revision_id: String,
    /// Stored path relative to the media directory.
    pub file: String,
}
