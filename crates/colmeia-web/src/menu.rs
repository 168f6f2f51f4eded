//! Admin navigation built from the active menu configuration.
//!
//! Superusers always get the default app list. Everyone else gets the groups
//! described by the latest active `non_superuser` [`MenuConfig`], falling
//! back to the default list whenever the configuration is missing, empty or
//! unreadable.
//!
//! [`MenuConfig`]: colmeia_core::entities::MenuConfig

use colmeia_core::entities::MenuItem;
use colmeia_core::enums::{MenuItemType, MenuScope};
use colmeia_core::identity::Actor;
use colmeia_db::service::ColmeiaService;

use crate::registry::{AdminRegistry, AppMenu, MenuModel, ModelInfo, ModelPerms};
use crate::routes::Routes;

/// Navigation for `actor`.
pub async fn get_app_list(
    service: &ColmeiaService,
    registry: &AdminRegistry,
    routes: &Routes,
    actor: &Actor,
) -> Vec<AppMenu> {
    let default_app_list = registry.default_app_list(actor, routes);
    if actor.is_superuser {
        return default_app_list;
    }

    let config = match service.active_menu_config(MenuScope::NonSuperuser).await {
        Ok(Some(config)) => config,
        Ok(None) => return default_app_list,
        Err(error) => {
            tracing::error!(err.msg = %error, err.detail = ?error, "menu_config_unavailable");
            return default_app_list;
        }
    };
    let items = match service.list_menu_items(&config.id).await {
        Ok(items) => items,
        Err(error) => {
            tracing::error!(err.msg = %error, err.detail = ?error, "menu_items_unavailable");
            return default_app_list;
        }
    };
    if items.is_empty() {
        return default_app_list;
    }

    let builder = MenuBuilder::new(registry, routes, actor, &default_app_list);
    builder
        .build(&items, config.include_unlisted)
        .unwrap_or(default_app_list)
}

#[derive(Debug)]
struct MenuGroup {
    key: String,
    name: String,
    app_label: String,
    app_url: Option<String>,
    models: Vec<MenuModel>,
}

/// Composes navigation groups from menu items.
pub struct MenuBuilder<'a> {
    registry: &'a AdminRegistry,
    routes: &'a Routes,
    actor: &'a Actor,
    default_app_list: &'a [AppMenu],
    groups: Vec<MenuGroup>,
    included: Vec<(String, String)>,
}

impl<'a> MenuBuilder<'a> {
    #[must_use]
    pub const fn new(
        registry: &'a AdminRegistry,
        routes: &'a Routes,
        actor: &'a Actor,
        default_app_list: &'a [AppMenu],
    ) -> Self {
        Self {
            registry,
            routes,
            actor,
            default_app_list,
            groups: Vec::new(),
            included: Vec::new(),
        }
    }

    /// Groups for `items` in order, or `None` when no item produced an entry.
    #[must_use]
    pub fn build(mut self, items: &[MenuItem], include_unlisted: bool) -> Option<Vec<AppMenu>> {
        for item in items {
            match item.item_type {
                MenuItemType::Model => self.add_model_item(item),
                MenuItemType::Url => self.add_link_item(item),
            }
        }
        if self.groups.is_empty() {
            return None;
        }
        if include_unlisted {
            self.append_unlisted();
        }
        Some(self.groups.into_iter().map(MenuGroup::into_app).collect())
    }

    fn add_model_item(&mut self, item: &MenuItem) {
        if item.app_label.is_empty() || item.model_name.is_empty() {
            return;
        }
        let Some(model) = self.registry.get(&item.app_label, &item.model_name) else {
            tracing::warn!(
                item_id = %item.id,
                app_label = %item.app_label,
                model_name = %item.model_name,
                "menu item points at an unknown model"
            );
            return;
        };
        if !self.registry.has_module_permission(self.actor, model) {
            return;
        }
        let perms = self.registry.model_perms(self.actor, model);
        if !perms.any() {
            return;
        }

        let entry = MenuModel {
            name: if item.label.is_empty() {
                capfirst(model.verbose_name_plural)
            } else {
                item.label.clone()
            },
            object_name: model.object_name.to_string(),
            perms,
            admin_url: (perms.view || perms.change)
                .then(|| self.routes.changelist(model.app_label, model.model_name)),
            add_url: perms
                .add
                .then(|| self.routes.add(model.app_label, model.model_name)),
            view_only: !perms.change,
        };
        self.group_for(item, Some(model)).models.push(entry);
        self.included
            .push((model.app_label.to_string(), model.model_name.to_string()));
    }

    fn add_link_item(&mut self, item: &MenuItem) {
        let mut url = None;
        if !item.url_name.is_empty() {
            url = self.routes.reverse(&item.url_name);
            if url.is_none() {
                tracing::info!(item_id = %item.id, url_name = %item.url_name, "named url not found");
            }
        }
        if url.is_none() && !item.absolute_url.is_empty() {
            url = Some(item.absolute_url.clone());
        }
        let Some(url) = url else {
            return;
        };

        let codename = item.permission_codename.trim();
        if !codename.is_empty() && !self.actor.has_perm(codename) {
            return;
        }

        let label = [&item.label, &item.url_name, &item.absolute_url]
            .into_iter()
            .find(|text| !text.is_empty())
            .cloned()
            .unwrap_or_default();
        let entry = MenuModel {
            name: label.clone(),
            object_name: label,
            perms: ModelPerms::view_only(),
            admin_url: Some(url),
            add_url: None,
            view_only: true,
        };
        self.group_for(item, None).models.push(entry);
    }

    fn group_for(&mut self, item: &MenuItem, model: Option<&ModelInfo>) -> &mut MenuGroup {
        let (key, name, app_label, app_url) = if !item.section.is_empty() {
            let slug = slugify(&item.section);
            let slug = if slug.is_empty() {
                "section".to_string()
            } else {
                slug
            };
            (format!("section::{slug}"), item.section.clone(), slug, None)
        } else if let Some(model) = model {
            let name = self
                .registry
                .app(model.app_label)
                .map_or_else(|| capfirst(model.app_label), |app| capfirst(app.verbose_name));
            (
                format!("app::{}", model.app_label),
                name,
                model.app_label.to_string(),
                Some(self.routes.app_index(model.app_label)),
            )
        } else {
            (
                "section::links".to_string(),
                "Links".to_string(),
                "links".to_string(),
                None,
            )
        };
        self.find_or_insert(key, name, app_label, app_url)
    }

    fn find_or_insert(
        &mut self,
        key: String,
        name: String,
        app_label: String,
        app_url: Option<String>,
    ) -> &mut MenuGroup {
        let index = match self.groups.iter().position(|group| group.key == key) {
            Some(index) => index,
            None => {
                self.groups.push(MenuGroup {
                    key,
                    name,
                    app_label,
                    app_url,
                    models: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    fn append_unlisted(&mut self) {
        for app in self.default_app_list {
            let included: Vec<String> = self
                .included
                .iter()
                .filter(|(app_label, _)| *app_label == app.app_label)
                .map(|(_, model_name)| model_name.clone())
                .collect();
            let group = self.find_or_insert(
                format!("app::{}", app.app_label),
                app.name.clone(),
                app.app_label.clone(),
                Some(app.app_url.clone()),
            );
            for entry in &app.models {
                if entry.object_name.is_empty()
                    || included.contains(&entry.object_name.to_lowercase())
                {
                    continue;
                }
                group.models.push(entry.clone());
            }
        }
    }
}

impl MenuGroup {
    fn into_app(self) -> AppMenu {
        AppMenu {
            name: self.name,
            app_label: self.app_label,
            app_url: self.app_url.unwrap_or_else(|| "#".to_string()),
            models: self.models,
        }
    }
}

/// Uppercase the first character.
#[must_use]
pub fn capfirst(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Lowercase ASCII slug: accents folded, punctuation dropped, runs of
/// whitespace and hyphens collapsed to a single `-`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii() {
            folded.push(c);
        } else if let Some(ascii) = fold_accent(c) {
            folded.push(ascii);
        }
    }

    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;
    for c in folded.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }
    if pending_dash {
        slug.push('-');
    }
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

const fn fold_accent(c: char) -> Option<char> {
    Some(match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn actor(superuser: bool, perms: &[&str]) -> Actor {
        Actor {
            user_id: "usr-00000001".to_string(),
            username: "ana".to_string(),
            is_superuser: superuser,
            is_staff: true,
            permissions: perms.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
        }
    }

    fn model_item(order: u32, section: &str, app_label: &str, model_name: &str) -> MenuItem {
        MenuItem {
            id: format!("mni-{order:08}"),
            config_id: "mnc-00000001".to_string(),
            order,
            item_type: MenuItemType::Model,
            section: section.to_string(),
            label: String::new(),
            app_label: app_label.to_string(),
            model_name: model_name.to_string(),
            url_name: String::new(),
            absolute_url: String::new(),
            permission_codename: String::new(),
        }
    }

    fn link_item(order: u32, url_name: &str, absolute_url: &str, codename: &str) -> MenuItem {
        MenuItem {
            item_type: MenuItemType::Url,
            url_name: url_name.to_string(),
            absolute_url: absolute_url.to_string(),
            permission_codename: codename.to_string(),
            ..model_item(order, "", "", "")
        }
    }

    fn build(actor: &Actor, items: &[MenuItem], include_unlisted: bool) -> Option<Vec<AppMenu>> {
        let registry = AdminRegistry::default();
        let routes = Routes::default();
        let defaults = registry.default_app_list(actor, &routes);
        MenuBuilder::new(&registry, &routes, actor, &defaults).build(items, include_unlisted)
    }

    #[test]
    fn groups_models_by_section_and_app() {
        let ana = actor(false, &["apiary.view_hive", "apiary.change_revision"]);
        let items = [
            model_item(0, "Manejo Diário", "apiary", "hive"),
            model_item(1, "", "apiary", "Revision"),
        ];
        let menu = build(&ana, &items, false).unwrap();

        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].name, "Manejo Diário");
        assert_eq!(menu[0].app_label, "manejo-diario");
        assert_eq!(menu[0].app_url, "#");
        assert_eq!(menu[0].models[0].name, "Colmeias");
        assert!(menu[0].models[0].view_only);

        assert_eq!(menu[1].name, "Meliponário");
        assert_eq!(menu[1].app_url, "/admin/apiary/");
        assert_eq!(menu[1].models[0].admin_url.as_deref(), Some("/admin/apiary/revision/"));
        assert!(!menu[1].models[0].view_only);
    }

    #[test]
    fn skips_models_without_permission_or_registration() {
        let ana = actor(false, &["apiary.view_hive"]);
        let items = [
            model_item(0, "", "apiary", "species"),
            model_item(1, "", "apiary", "queen"),
            model_item(2, "", "core", "menuconfig"),
        ];
        assert_eq!(build(&ana, &items, false), None);
    }

    #[test]
    fn links_resolve_names_then_absolute_urls() {
        let ana = actor(false, &["apiary.view_hive"]);
        let items = [
            link_item(0, "production-dashboard", "", ""),
            link_item(1, "sem-rota", "https://example.org/manual", ""),
            link_item(2, "sem-rota", "", ""),
            link_item(3, "", "/privado/", "apiary.export_hive"),
        ];
        let menu = build(&ana, &items, false).unwrap();

        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].name, "Links");
        assert_eq!(menu[0].app_label, "links");
        let urls: Vec<_> = menu[0]
            .models
            .iter()
            .map(|m| m.admin_url.clone().unwrap_or_default())
            .collect();
        assert_eq!(urls, vec!["/admin/producao/", "https://example.org/manual"]);
        assert_eq!(menu[0].models[0].name, "production-dashboard");
        assert_eq!(menu[0].models[0].perms, ModelPerms::view_only());
    }

    #[test]
    fn include_unlisted_appends_remaining_default_models() {
        let ana = actor(
            false,
            &["apiary.view_hive", "apiary.view_revision", "apiary.view_city"],
        );
        let items = [model_item(0, "Principal", "apiary", "hive")];
        let menu = build(&ana, &items, true).unwrap();

        assert_eq!(menu.len(), 2);
        assert_eq!(menu[1].app_label, "apiary");
        let names: Vec<_> = menu[1].models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Cidades", "Revisões"]);
    }

    #[test]
    fn custom_label_wins() {
        let ana = actor(false, &["apiary.add_hive"]);
        let mut item = model_item(0, "", "apiary", "hive");
        item.label = "Minhas colmeias".to_string();
        let menu = build(&ana, &[item], false).unwrap();
        assert_eq!(menu[0].models[0].name, "Minhas colmeias");
        assert_eq!(menu[0].models[0].admin_url, None);
        assert_eq!(
            menu[0].models[0].add_url.as_deref(),
            Some("/admin/apiary/hive/add/")
        );
    }

    #[rstest]
    #[case("Manejo Diário", "manejo-diario")]
    #[case("  Produção & Vendas  ", "producao-vendas")]
    #[case("a -- b", "a-b")]
    #[case("_links_", "links")]
    #[case("!!!", "")]
    fn slugify_cases(#[case] raw: &str, #[case] slug: &str) {
        assert_eq!(slugify(raw), slug);
    }

    #[test]
    fn capfirst_uppercases_first_char_only() {
        assert_eq!(capfirst("espécies criadas"), "Espécies criadas");
        assert_eq!(capfirst("ÓRFÃ"), "ÓRFÃ");
        assert_eq!(capfirst(""), "");
    }
}
