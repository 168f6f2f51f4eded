use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A breeder's entry in the creator network, one per user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CreatorProfile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub city_id: String,
    pub species_ids: Vec<String>,
    /// WhatsApp number.
    pub phone: String,
    pub is_opt_in: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
