//! Creator profile draft and update.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatorProfileDraft {
    pub name: String,
    pub city_id: String,
    pub species_ids: Vec<String>,
    pub phone: String,
    pub is_opt_in: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatorProfileUpdate {
    pub name: Option<String>,
    pub city_id: Option<String>,
    /// Replaces the whole species set when present.
    pub species_ids: Option<Vec<String>>,
    pub phone: Option<String>,
    pub is_opt_in: Option<bool>,
}
