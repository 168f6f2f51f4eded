//! Named routes and their reversal into paths.
//!
//! Fixed pages are looked up by name. Admin model routes follow
//! `admin:<app>_<model>_<action>` and are resolved against the registry, so a
//! menu item pointing at an unregistered model resolves to nothing.

use std::collections::BTreeMap;

use crate::registry::AdminRegistry;

pub const ADMIN_INDEX: &str = "/admin/";
pub const ADMIN_LOGIN: &str = "/admin/login/";
pub const PRODUCTION_DASHBOARD: &str = "/admin/producao/";
pub const DELETE_PERSONAL_DATA: &str = "/admin/excluir-meus-dados/";
pub const PRIVACY_POLICY: &str = "/politica-de-privacidade/";
pub const PRIVACY_DELETE_ENTRY: &str = "/politica-de-privacidade/excluir-dados/";

const NAMED: &[(&str, &str)] = &[
    ("admin:index", ADMIN_INDEX),
    ("admin:menu", "/admin/menu/"),
    ("admin:login", ADMIN_LOGIN),
    ("admin:delete_personal_data", DELETE_PERSONAL_DATA),
    ("privacy-policy", PRIVACY_POLICY),
    ("privacy-delete-entry", PRIVACY_DELETE_ENTRY),
    ("production-dashboard", PRODUCTION_DASHBOARD),
    ("health", "/health"),
];

const MODEL_ACTIONS: &[&str] = &["changelist", "add", "change", "delete"];

#[derive(Debug, Clone)]
pub struct Routes {
    named: BTreeMap<&'static str, &'static str>,
    models: Vec<(&'static str, &'static str)>,
    apps: Vec<&'static str>,
}

impl Default for Routes {
    fn default() -> Self {
        Self::new(&AdminRegistry::default())
    }
}

impl Routes {
    #[must_use]
    pub fn new(registry: &AdminRegistry) -> Self {
        let models: Vec<_> = registry
            .models()
            .iter()
            .map(|model| (model.app_label, model.model_name))
            .collect();
        let mut apps: Vec<&'static str> = models.iter().map(|(app, _)| *app).collect();
        apps.dedup();
        Self {
            named: NAMED.iter().copied().collect(),
            models,
            apps,
        }
    }

    #[must_use]
    pub fn changelist(&self, app_label: &str, model_name: &str) -> String {
        format!("/admin/{app_label}/{model_name}/")
    }

    #[must_use]
    pub fn add(&self, app_label: &str, model_name: &str) -> String {
        format!("/admin/{app_label}/{model_name}/add/")
    }

    #[must_use]
    pub fn change(&self, app_label: &str, model_name: &str, id: &str) -> String {
        format!("/admin/{app_label}/{model_name}/{}/change/", encode(id))
    }

    #[must_use]
    pub fn delete(&self, app_label: &str, model_name: &str, id: &str) -> String {
        format!("/admin/{app_label}/{model_name}/{}/delete/", encode(id))
    }

    #[must_use]
    pub fn app_index(&self, app_label: &str) -> String {
        format!("/admin/{app_label}/")
    }

    #[must_use]
    pub fn hive_detail(&self, hive_id: &str) -> String {
        format!("{PRODUCTION_DASHBOARD}colmeia/{}/", encode(hive_id))
    }

    /// Path of a route that takes no arguments.
    #[must_use]
    pub fn reverse(&self, name: &str) -> Option<String> {
        self.reverse_with(name, &[])
    }

    /// Path of a named route, filling its arguments in order.
    ///
    /// Returns `None` for unknown names and for a wrong number of arguments.
    #[must_use]
    pub fn reverse_with(&self, name: &str, args: &[&str]) -> Option<String> {
        if let Some(path) = self.named.get(name) {
            return args.is_empty().then(|| (*path).to_string());
        }
        if name == "production-dashboard-hive-detail" {
            return match args {
                [hive_id] => Some(self.hive_detail(hive_id)),
                _ => None,
            };
        }
        let target = name.strip_prefix("admin:")?;
        if target == "app_list" {
            return match args {
                [app_label] if self.apps.iter().any(|app| app == app_label) => {
                    Some(self.app_index(app_label))
                }
                _ => None,
            };
        }
        let (prefix, action) = target.rsplit_once('_')?;
        if !MODEL_ACTIONS.contains(&action) {
            return None;
        }
        let (app_label, model_name) = self.models.iter().copied().find(|&(app, model)| {
            prefix
                .strip_prefix(app)
                .and_then(|rest| rest.strip_prefix('_'))
                == Some(model)
        })?;
        match (action, args) {
            ("changelist", []) => Some(self.changelist(app_label, model_name)),
            ("add", []) => Some(self.add(app_label, model_name)),
            ("change", [id]) => Some(self.change(app_label, model_name, id)),
            ("delete", [id]) => Some(self.delete(app_label, model_name, id)),
            _ => None,
        }
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("admin:index", &[], Some("/admin/"))]
    #[case("production-dashboard", &[], Some("/admin/producao/"))]
    #[case("admin:apiary_hive_changelist", &[], Some("/admin/apiary/hive/"))]
    #[case("admin:apiary_revisionattachment_add", &[], Some("/admin/apiary/revisionattachment/add/"))]
    #[case("admin:apiary_hive_change", &["hiv-0a1b2c3d"], Some("/admin/apiary/hive/hiv-0a1b2c3d/change/"))]
    #[case("admin:core_menuitem_delete", &["mni-00000001"], Some("/admin/core/menuitem/mni-00000001/delete/"))]
    #[case("admin:app_list", &["apiary"], Some("/admin/apiary/"))]
    #[case("production-dashboard-hive-detail", &["hiv-1"], Some("/admin/producao/colmeia/hiv-1/"))]
    #[case("admin:apiary_hive_change", &[], None)]
    #[case("admin:apiary_queen_changelist", &[], None)]
    #[case("admin:apiary_hive_export", &[], None)]
    #[case("admin:index", &["x"], None)]
    #[case("nao-existe", &[], None)]
    fn reverses_named_routes(#[case] name: &str, #[case] args: &[&str], #[case] expected: Option<&str>) {
        let routes = Routes::default();
        assert_eq!(routes.reverse_with(name, args).as_deref(), expected);
    }
}
