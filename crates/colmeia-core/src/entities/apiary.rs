use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named site grouping hives under one owner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Apiary {
    pub id: String,
    pub name: String,
    /// Free-text city/state.
    pub location: String,
    pub owner_id: String,
    /// Number of hives linked to this apiary. Maintained by the store.
    pub hive_count: u32,
    pub notes: String,
}
