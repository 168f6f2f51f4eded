//! Menu configuration and menu item inputs.

use colmeia_core::entities::{MenuConfig, MenuItem};
use colmeia_core::enums::{MenuItemType, MenuScope};
use serde::Deserialize;

use super::assign;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuConfigDraft {
    pub name: String,
    pub scope: MenuScope,
    pub active: bool,
    pub include_unlisted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuConfigUpdate {
    pub name: Option<String>,
    pub scope: Option<MenuScope>,
    pub active: Option<bool>,
    pub include_unlisted: Option<bool>,
}

impl MenuConfigUpdate {
    pub fn apply(self, config: &mut MenuConfig) {
        assign(&mut config.name, self.name.map(|s| s.trim().to_string()));
        assign(&mut config.scope, self.scope);
        assign(&mut config.active, self.active);
        assign(&mut config.include_unlisted, self.include_unlisted);
    }
}

pub struct MenuConfigUpdateBuilder(MenuConfigUpdate);

impl MenuConfigUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(MenuConfigUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.0.active = Some(active);
        self
    }

    #[must_use]
    pub fn include_unlisted(mut self, include_unlisted: bool) -> Self {
        self.0.include_unlisted = Some(include_unlisted);
        self
    }

    #[must_use]
    pub fn build(self) -> MenuConfigUpdate {
        self.0
    }
}

impl Default for MenuConfigUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuItemDraft {
    pub config_id: String,
    pub order: u32,
    pub item_type: MenuItemType,
    pub section: String,
    pub label: String,
    pub app_label: String,
    pub model_name: String,
    pub url_name: String,
    pub absolute_url: String,
    pub permission_codename: String,
}

impl MenuItemDraft {
    #[must_use]
    pub fn into_item(self, id: String) -> MenuItem {
        let mut item = MenuItem {
            id,
            config_id: self.config_id,
            order: self.order,
            item_type: self.item_type,
            section: self.section,
            label: self.label,
            app_label: self.app_label,
            model_name: self.model_name,
            url_name: self.url_name,
            absolute_url: self.absolute_url,
            permission_codename: self.permission_codename,
        };
        item.normalize();
        item
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuItemUpdate {
    pub order: Option<u32>,
    pub item_type: Option<MenuItemType>,
    pub section: Option<String>,
    pub label: Option<String>,
    pub app_label: Option<String>,
    pub model_name: Option<String>,
    pub url_name: Option<String>,
    pub absolute_url: Option<String>,
    pub permission_codename: Option<String>,
}

impl MenuItemUpdate {
    pub fn apply(self, item: &mut MenuItem) {
        assign(&mut item.order, self.order);
        assign(&mut item.item_type, self.item_type);
        assign(&mut item.section, self.section);
        assign(&mut item.label, self.label);
        assign(&mut item.app_label, self.app_label);
        assign(&mut item.model_name, self.model_name);
        assign(&mut item.url_name, self.url_name);
        assign(&mut item.absolute_url, self.absolute_url);
        assign(&mut item.permission_codename, self.permission_codename);
        item.normalize();
    }
}
