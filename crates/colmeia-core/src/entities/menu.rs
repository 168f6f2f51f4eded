use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{MenuItemType, MenuScope};
use crate::validation::ValidationErrors;

/// A named admin menu layout. At most one is active per scope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MenuConfig {
    pub id: String,
    pub name: String,
    pub scope: MenuScope,
    pub active: bool,
    /// Append the default entries not listed by any item.
    pub include_unlisted: bool,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a [`MenuConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub config_id: String,
    pub order: u32,
    pub item_type: MenuItemType,
    /// Group heading. Empty uses the app name, or "Links" for URLs.
    pub section: String,
    pub label: String,
    pub app_label: String,
    pub model_name: String,
    /// Named route resolved through the route table.
    pub url_name: String,
    pub absolute_url: String,
    /// Extra permission required to show a URL item.
    pub permission_codename: String,
}

impl MenuItem {
    /// Trim every free-text field.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.section,
            &mut self.label,
            &mut self.app_label,
            &mut self.model_name,
            &mut self.url_name,
            &mut self.absolute_url,
            &mut self.permission_codename,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }

    /// Check that the item points somewhere.
    ///
    /// # Errors
    ///
    /// Model items need `app_label` and `model_name`; URL items need a
    /// route name or an absolute URL.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.item_type {
            MenuItemType::Model => {
                if self.app_label.is_empty() {
                    errors.add("app_label", "Informe o app_label.");
                }
                if self.model_name.is_empty() {
                    errors.add("model_name", "Informe o modelo.");
                }
            }
            MenuItemType::Url => {
                if self.url_name.is_empty() && self.absolute_url.is_empty() {
                    errors.add("url_name", "Informe um nome de URL ou uma URL absoluta.");
                }
            }
        }
        errors.into_result()
    }
}
