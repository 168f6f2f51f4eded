//! Registered admin apps and models.
//!
//! The registry is built once at startup and carried in [`crate::AppState`].
//! It knows each model's names and permission codenames and produces the
//! default app list the menu builder starts from.

use colmeia_core::identity::Actor;
use serde::Serialize;

use crate::menu::capfirst;
use crate::routes::Routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppInfo {
    pub app_label: &'static str,
    pub verbose_name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub app_label: &'static str,
    /// Lowercase name used in URLs and codenames.
    pub model_name: &'static str,
    pub object_name: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub superuser_only: bool,
}

impl ModelInfo {
    /// `<app_label>.<action>_<model_name>`
    #[must_use]
    pub fn codename(&self, action: &str) -> String {
        format!("{}.{action}_{}", self.app_label, self.model_name)
    }
}

/// What an actor may do with one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelPerms {
    pub add: bool,
    pub change: bool,
    pub delete: bool,
    pub view: bool,
}

impl ModelPerms {
    #[must_use]
    pub const fn any(self) -> bool {
        self.add || self.change || self.delete || self.view
    }

    pub(crate) const fn view_only() -> Self {
        Self {
            add: false,
            change: false,
            delete: false,
            view: true,
        }
    }
}

/// One model entry of a navigation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuModel {
    pub name: String,
    pub object_name: String,
    pub perms: ModelPerms,
    pub admin_url: Option<String>,
    pub add_url: Option<String>,
    pub view_only: bool,
}

/// A navigation group: an app, a configured section, or the links group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppMenu {
    pub name: String,
    pub app_label: String,
    pub app_url: String,
    pub models: Vec<MenuModel>,
}

const APPS: &[AppInfo] = &[
    AppInfo {
        app_label: "apiary",
        verbose_name: "Meliponário",
    },
    AppInfo {
        app_label: "core",
        verbose_name: "Configurações principais",
    },
];

const fn model(
    app_label: &'static str,
    model_name: &'static str,
    object_name: &'static str,
    verbose_name: &'static str,
    verbose_name_plural: &'static str,
) -> ModelInfo {
    ModelInfo {
        app_label,
        model_name,
        object_name,
        verbose_name,
        verbose_name_plural,
        superuser_only: false,
    }
}

const MODELS: &[ModelInfo] = &[
    model("apiary", "species", "Species", "Espécie", "Espécies"),
    model(
        "apiary",
        "apiary",
        "Apiary",
        "Meliponário/Apiário",
        "Meliponários/Apiários",
    ),
    model("apiary", "hive", "Hive", "Colmeia", "Colmeias"),
    model("apiary", "revision", "Revision", "Revisão", "Revisões"),
    model(
        "apiary",
        "revisionattachment",
        "RevisionAttachment",
        "Anexo da Revisão",
        "Anexos da Revisão",
    ),
    model(
        "apiary",
        "boxmodel",
        "BoxModel",
        "Modelo de caixa",
        "Modelos de caixas",
    ),
    model("apiary", "city", "City", "Cidade", "Cidades"),
    model(
        "apiary",
        "creatorprofile",
        "CreatorProfile",
        "Criador inscrito",
        "Criadores inscritos",
    ),
    ModelInfo {
        superuser_only: true,
        ..model(
            "core",
            "menuconfig",
            "MenuConfig",
            "Configuração de menu",
            "Configurações de menu",
        )
    },
    ModelInfo {
        superuser_only: true,
        ..model("core", "menuitem", "MenuItem", "Item de menu", "Itens de menu")
    },
];

#[derive(Debug, Clone)]
pub struct AdminRegistry {
    apps: Vec<AppInfo>,
    models: Vec<ModelInfo>,
}

impl Default for AdminRegistry {
    fn default() -> Self {
        Self {
            apps: APPS.to_vec(),
            models: MODELS.to_vec(),
        }
    }
}

impl AdminRegistry {
    #[must_use]
    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    #[must_use]
    pub fn app(&self, app_label: &str) -> Option<&AppInfo> {
        self.apps.iter().find(|app| app.app_label == app_label)
    }

    /// Look up a model; `model_name` is matched case-insensitively.
    #[must_use]
    pub fn get(&self, app_label: &str, model_name: &str) -> Option<&ModelInfo> {
        self.models.iter().find(|model| {
            model.app_label == app_label && model.model_name.eq_ignore_ascii_case(model_name)
        })
    }

    #[must_use]
    pub fn model_perms(&self, actor: &Actor, model: &ModelInfo) -> ModelPerms {
        if model.superuser_only && !actor.is_superuser {
            return ModelPerms::default();
        }
        ModelPerms {
            add: actor.has_perm(&model.codename("add")),
            change: actor.has_perm(&model.codename("change")),
            delete: actor.has_perm(&model.codename("delete")),
            view: actor.has_perm(&model.codename("view")),
        }
    }

    #[must_use]
    pub fn has_module_permission(&self, actor: &Actor, model: &ModelInfo) -> bool {
        if model.superuser_only {
            return actor.is_superuser;
        }
        actor.has_module_perms(model.app_label)
    }

    /// Menu entry for one model, or `None` when the actor cannot touch it.
    #[must_use]
    pub fn menu_model(&self, actor: &Actor, model: &ModelInfo, routes: &Routes) -> Option<MenuModel> {
        if !self.has_module_permission(actor, model) {
            return None;
        }
        let perms = self.model_perms(actor, model);
        if !perms.any() {
            return None;
        }
        Some(MenuModel {
            name: capfirst(model.verbose_name_plural),
            object_name: model.object_name.to_string(),
            perms,
            admin_url: (perms.view || perms.change)
                .then(|| routes.changelist(model.app_label, model.model_name)),
            add_url: perms
                .add
                .then(|| routes.add(model.app_label, model.model_name)),
            view_only: !perms.change,
        })
    }

    /// Apps and models visible to the actor, sorted by name.
    #[must_use]
    pub fn default_app_list(&self, actor: &Actor, routes: &Routes) -> Vec<AppMenu> {
        let mut apps: Vec<AppMenu> = self
            .apps
            .iter()
            .filter_map(|app| {
                let mut models: Vec<MenuModel> = self
                    .models
                    .iter()
                    .filter(|model| model.app_label == app.app_label)
                    .filter_map(|model| self.menu_model(actor, model, routes))
                    .collect();
                if models.is_empty() {
                    return None;
                }
                models.sort_by(|a, b| a.name.cmp(&b.name));
                Some(AppMenu {
                    name: capfirst(app.verbose_name),
                    app_label: app.app_label.to_string(),
                    app_url: routes.app_index(app.app_label),
                    models,
                })
            })
            .collect();
        apps.sort_by_key(|app| app.name.to_lowercase());
        apps
    }
}
