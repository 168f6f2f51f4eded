//! Menu configurations and their items.
//!
//! At most one configuration is active per scope, backed by a partial unique
//! index. Saving an active configuration while a sibling is active fails
//! validation; the
//! [`activate_menu_config`](ColmeiaService::activate_menu_config) action
//! swaps the active one atomically instead.

use chrono::Utc;
use colmeia_core::entities::{MenuConfig, MenuItem};
use colmeia_core::enums::MenuScope;
use colmeia_core::ids::{PREFIX_MENU_CONFIG, PREFIX_MENU_ITEM};
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::{
    bool_value, exists, format_datetime, get_bool, is_unique_violation, parse_datetime, parse_enum,
};
use crate::repos::{REQUIRED, already_exists};
use crate::service::ColmeiaService;
use crate::updates::menu::{MenuConfigDraft, MenuConfigUpdate, MenuItemDraft, MenuItemUpdate};

const CONFIG_COLS: &str = "id, name, scope, active, include_unlisted, updated_at";
const ITEM_COLS: &str = "id, config_id, sort_order, item_type, section, label, app_label, \
     model_name, url_name, absolute_url, permission_codename";

const ACTIVE_CONFLICT: &str =
    "Já existe uma configuração ativa para este escopo. Desative-a antes de ativar outra.";

fn row_to_config(row: &libsql::Row) -> Result<MenuConfig, DatabaseError> {
    Ok(MenuConfig {
        id: row.get(0)?,
        name: row.get(1)?,
        scope: parse_enum(&row.get::<String>(2)?)?,
        active: get_bool(row, 3)?,
        include_unlisted: get_bool(row, 4)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_item(row: &libsql::Row) -> Result<MenuItem, DatabaseError> {
    let order: i64 = row.get(2)?;
    Ok(MenuItem {
        id: row.get(0)?,
        config_id: row.get(1)?,
        order: u32::try_from(order)
            .map_err(|_| DatabaseError::Query(format!("Invalid menu item order: {order}")))?,
        item_type: parse_enum(&row.get::<String>(3)?)?,
        section: row.get(4)?,
        label: row.get(5)?,
        app_label: row.get(6)?,
        model_name: row.get(7)?,
        url_name: row.get(8)?,
        absolute_url: row.get(9)?,
        permission_codename: row.get(10)?,
    })
}

async fn check_config(
    conn: &libsql::Connection,
    config: &MenuConfig,
) -> Result<(), DatabaseError> {
    let mut errors = ValidationErrors::new();
    if config.name.is_empty() {
        errors.add("name", REQUIRED);
    } else if exists(
        conn,
        "SELECT 1 FROM menu_configs WHERE name = ?1 AND id != ?2",
        vec![config.name.as_str().into(), config.id.as_str().into()],
    )
    .await?
    {
        errors.add("name", already_exists("Configuração de menu", "Nome"));
    }
    if config.active
        && exists(
            conn,
            "SELECT 1 FROM menu_configs WHERE scope = ?1 AND active = 1 AND id != ?2",
            vec![config.scope.as_str().into(), config.id.as_str().into()],
        )
        .await?
    {
        errors.add("active", ACTIVE_CONFLICT);
    }
    errors.into_result().map_err(Into::into)
}

/// Turn a unique index rejection into the field error `check_config` reports.
fn config_write_error(error: libsql::Error) -> DatabaseError {
    if is_unique_violation(&error, "menu_configs.scope") {
        ValidationErrors::single("active", ACTIVE_CONFLICT).into()
    } else if is_unique_violation(&error, "menu_configs.name") {
        ValidationErrors::single("name", already_exists("Configuração de menu", "Nome")).into()
    } else {
        error.into()
    }
}

async fn touch_config(conn: &libsql::Connection, config_id: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE menu_configs SET updated_at = ?1 WHERE id = ?2",
        libsql::params![format_datetime(&Utc::now()), config_id],
    )
    .await?;
    Ok(())
}

impl ColmeiaService {
    pub async fn create_menu_config(
        &self,
        draft: MenuConfigDraft,
    ) -> Result<MenuConfig, DatabaseError> {
        let id = self.db().generate_id(PREFIX_MENU_CONFIG).await?;
        let config = MenuConfig {
            id,
            name: draft.name.trim().to_string(),
            scope: draft.scope,
            active: draft.active,
            include_unlisted: draft.include_unlisted,
            updated_at: Utc::now(),
        };
        let tx = self.db().begin().await?;
        check_config(&tx, &config).await?;
        tx.execute(
            "INSERT INTO menu_configs (id, name, scope, active, include_unlisted, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                config.id.as_str(),
                config.name.as_str(),
                config.scope.as_str(),
                bool_value(config.active),
                bool_value(config.include_unlisted),
                format_datetime(&config.updated_at)
            ],
        )
        .await
        .map_err(config_write_error)?;
        tx.commit().await?;
        tracing::debug!(config_id = %config.id, name = %config.name, "menu config created");
        Ok(config)
    }

    pub async fn get_menu_config(&self, id: &str) -> Result<MenuConfig, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {CONFIG_COLS} FROM menu_configs WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_config(&row)
    }

    pub async fn list_menu_configs(&self) -> Result<Vec<MenuConfig>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {CONFIG_COLS} FROM menu_configs ORDER BY name"),
                (),
            )
            .await?;
        let mut configs = Vec::new();
        while let Some(row) = rows.next().await? {
            configs.push(row_to_config(&row)?);
        }
        Ok(configs)
    }

    /// The active configuration for a scope, latest update first.
    pub async fn active_menu_config(
        &self,
        scope: MenuScope,
    ) -> Result<Option<MenuConfig>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {CONFIG_COLS} FROM menu_configs WHERE scope = ?1 AND active = 1 \
                     ORDER BY updated_at DESC, rowid DESC LIMIT 1"
                ),
                [scope.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_config(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_menu_config(
        &self,
        id: &str,
        update: MenuConfigUpdate,
    ) -> Result<MenuConfig, DatabaseError> {
        let tx = self.db().begin().await?;
        let mut config = self.get_menu_config(id).await?;
        update.apply(&mut config);
        config.updated_at = Utc::now();
        check_config(&tx, &config).await?;
        tx.execute(
            "UPDATE menu_configs SET name = ?1, scope = ?2, active = ?3, include_unlisted = ?4,
             updated_at = ?5 WHERE id = ?6",
            libsql::params![
                config.name.as_str(),
                config.scope.as_str(),
                bool_value(config.active),
                bool_value(config.include_unlisted),
                format_datetime(&config.updated_at),
                config.id.as_str()
            ],
        )
        .await
        .map_err(config_write_error)?;
        tx.commit().await?;
        Ok(config)
    }

    /// Make `id` the only active configuration of its scope.
    pub async fn activate_menu_config(&self, id: &str) -> Result<MenuConfig, DatabaseError> {
        let mut config = self.get_menu_config(id).await?;
        config.active = true;
        config.updated_at = Utc::now();

        let tx = self.db().begin().await?;
        let deactivated = tx
            .execute(
                "UPDATE menu_configs SET active = 0, updated_at = ?1
                 WHERE scope = ?2 AND active = 1 AND id != ?3",
                libsql::params![
                    format_datetime(&config.updated_at),
                    config.scope.as_str(),
                    config.id.as_str()
                ],
            )
            .await?;
        tx.execute(
            "UPDATE menu_configs SET active = 1, updated_at = ?1 WHERE id = ?2",
            libsql::params![format_datetime(&config.updated_at), config.id.as_str()],
        )
        .await?;
        tx.commit().await?;
        tracing::info!(config_id = %config.id, deactivated, "menu config activated");
        Ok(config)
    }

    pub async fn delete_menu_config(&self, id: &str) -> Result<(), DatabaseError> {
        let tx = self.db().begin().await?;
        let affected = tx
            .execute("DELETE FROM menu_configs WHERE id = ?1", [id])
            .await?;
        tx.commit().await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    pub async fn create_menu_item(&self, draft: MenuItemDraft) -> Result<MenuItem, DatabaseError> {
        let config_id = draft.config_id.trim().to_string();
        if config_id.is_empty() {
            return Err(ValidationErrors::single("config", REQUIRED).into());
        }
        let config = match self.get_menu_config(&config_id).await {
            Ok(config) => config,
            Err(DatabaseError::NoResult) => {
                return Err(
                    ValidationErrors::single("config", "Selecione uma opção válida.").into(),
                );
            }
            Err(e) => return Err(e),
        };

        let id = self.db().generate_id(PREFIX_MENU_ITEM).await?;
        let mut item = draft.into_item(id);
        item.config_id = config.id;
        item.validate()?;

        let tx = self.db().begin().await?;
        tx.execute(
            &format!("INSERT INTO menu_items ({ITEM_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
            libsql::params![
                item.id.as_str(),
                item.config_id.as_str(),
                i64::from(item.order),
                item.item_type.as_str(),
                item.section.as_str(),
                item.label.as_str(),
                item.app_label.as_str(),
                item.model_name.as_str(),
                item.url_name.as_str(),
                item.absolute_url.as_str(),
                item.permission_codename.as_str()
            ],
        )
        .await?;
        touch_config(&tx, &item.config_id).await?;
        tx.commit().await?;
        Ok(item)
    }

    pub async fn get_menu_item(&self, id: &str) -> Result<MenuItem, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ITEM_COLS} FROM menu_items WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_item(&row)
    }

    /// Items of one configuration in display order (order, then insertion).
    pub async fn list_menu_items(&self, config_id: &str) -> Result<Vec<MenuItem>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {ITEM_COLS} FROM menu_items WHERE config_id = ?1 ORDER BY sort_order, rowid"
                ),
                [config_id],
            )
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_item(&row)?);
        }
        Ok(items)
    }

    /// Every item across configurations, grouped by configuration.
    pub async fn list_all_menu_items(&self) -> Result<Vec<MenuItem>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ITEM_COLS} FROM menu_items ORDER BY config_id, sort_order, rowid"),
                (),
            )
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_item(&row)?);
        }
        Ok(items)
    }

    pub async fn update_menu_item(
        &self,
        id: &str,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, DatabaseError> {
        let mut item = self.get_menu_item(id).await?;
        update.apply(&mut item);
        item.validate()?;

        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE menu_items SET sort_order = ?1, item_type = ?2, section = ?3, label = ?4,
             app_label = ?5, model_name = ?6, url_name = ?7, absolute_url = ?8,
             permission_codename = ?9 WHERE id = ?10",
            libsql::params![
                i64::from(item.order),
                item.item_type.as_str(),
                item.section.as_str(),
                item.label.as_str(),
                item.app_label.as_str(),
                item.model_name.as_str(),
                item.url_name.as_str(),
                item.absolute_url.as_str(),
                item.permission_codename.as_str(),
                item.id.as_str()
            ],
        )
        .await?;
        touch_config(&tx, &item.config_id).await?;
        tx.commit().await?;
        Ok(item)
    }

    pub async fn delete_menu_item(&self, id: &str) -> Result<(), DatabaseError> {
        let item = self.get_menu_item(id).await?;
        let tx = self.db().begin().await?;
        tx.execute("DELETE FROM menu_items WHERE id = ?1", [item.id.as_str()])
            .await?;
        touch_config(&tx, &item.config_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use colmeia_core::enums::MenuItemType;
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::test_service;
    use crate::updates::menu::MenuConfigUpdateBuilder;

    use super::*;

    fn config(name: &str, active: bool) -> MenuConfigDraft {
        MenuConfigDraft {
            name: name.to_string(),
            active,
            ..MenuConfigDraft::default()
        }
    }

    #[tokio::test]
    async fn second_active_config_is_rejected() {
        let svc = test_service().await;
        svc.create_menu_config(config("Operadores", true)).await.unwrap();
        let err = svc
            .create_menu_config(config("Visitantes", true))
            .await
            .unwrap_err();
        match err {
            DatabaseError::Validation(errors) => {
                assert_eq!(errors.messages("active"), [ACTIVE_CONFLICT]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn database_refuses_a_second_active_config() {
        let svc = test_service().await;
        svc.create_menu_config(config("Operadores", true)).await.unwrap();

        let err = svc
            .db()
            .conn()
            .execute(
                "INSERT INTO menu_configs (id, name, scope, active, include_unlisted, updated_at)
                 VALUES ('mnc-00000002', 'Visitantes', 'non_superuser', 1, 0, '2025-01-01T00:00:00Z')",
                (),
            )
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err, "menu_configs.scope"));
        match config_write_error(err) {
            DatabaseError::Validation(errors) => {
                assert_eq!(errors.messages("active"), [ACTIVE_CONFLICT]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        svc.db()
            .conn()
            .execute(
                "INSERT INTO menu_configs (id, name, scope, active, include_unlisted, updated_at)
                 VALUES ('mnc-00000003', 'Rascunho', 'non_superuser', 0, 0, '2025-01-01T00:00:00Z')",
                (),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn activate_swaps_active_config() {
        let svc = test_service().await;
        let first = svc.create_menu_config(config("Operadores", true)).await.unwrap();
        let second = svc.create_menu_config(config("Visitantes", false)).await.unwrap();

        svc.activate_menu_config(&second.id).await.unwrap();

        assert!(!svc.get_menu_config(&first.id).await.unwrap().active);
        let active = svc
            .active_menu_config(MenuScope::NonSuperuser)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.id, second.id);
    }

    #[tokio::test]
    async fn names_are_unique() {
        let svc = test_service().await;
        svc.create_menu_config(config("Operadores", false)).await.unwrap();
        let err = svc
            .create_menu_config(config(" Operadores ", false))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(e) if e.contains("name")));
    }

    #[tokio::test]
    async fn deactivating_leaves_no_active_config() {
        let svc = test_service().await;
        let first = svc.create_menu_config(config("Operadores", true)).await.unwrap();
        svc.update_menu_config(&first.id, MenuConfigUpdateBuilder::new().active(false).build())
            .await
            .unwrap();
        assert_eq!(
            svc.active_menu_config(MenuScope::NonSuperuser).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn items_are_trimmed_and_ordered() {
        let svc = test_service().await;
        let cfg = svc.create_menu_config(config("Operadores", true)).await.unwrap();

        for (order, model) in [(2, "revision"), (1, "hive"), (1, "apiary")] {
            svc.create_menu_item(MenuItemDraft {
                config_id: cfg.id.clone(),
                order,
                app_label: " apiary ".to_string(),
                model_name: model.to_string(),
                ..MenuItemDraft::default()
            })
            .await
            .unwrap();
        }

        let items = svc.list_menu_items(&cfg.id).await.unwrap();
        let models: Vec<&str> = items.iter().map(|i| i.model_name.as_str()).collect();
        assert_eq!(models, vec!["hive", "apiary", "revision"]);
        assert!(items.iter().all(|i| i.app_label == "apiary"));
    }

    #[tokio::test]
    async fn url_item_without_destination_is_rejected() {
        let svc = test_service().await;
        let cfg = svc.create_menu_config(config("Operadores", true)).await.unwrap();
        let err = svc
            .create_menu_item(MenuItemDraft {
                config_id: cfg.id.clone(),
                item_type: MenuItemType::Url,
                label: "Ajuda".to_string(),
                ..MenuItemDraft::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(e) if e.contains("url_name")));
        assert!(svc.list_menu_items(&cfg.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_config_removes_items() {
        let svc = test_service().await;
        let cfg = svc.create_menu_config(config("Operadores", false)).await.unwrap();
        svc.create_menu_item(MenuItemDraft {
            config_id: cfg.id.clone(),
            app_label: "apiary".to_string(),
            model_name: "hive".to_string(),
            ..MenuItemDraft::default()
        })
        .await
        .unwrap();
        svc.delete_menu_config(&cfg.id).await.unwrap();
        assert!(svc.list_all_menu_items().await.unwrap().is_empty());
    }
}
