use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An account that owns apiaries and hives.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub is_superuser: bool,
    /// Only staff members may use the admin pages.
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}
