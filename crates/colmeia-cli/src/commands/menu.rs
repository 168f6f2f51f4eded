use anyhow::bail;
use chrono::{DateTime, Utc};
use colmeia_core::entities::MenuConfig;
use colmeia_db::error::DatabaseError;
use colmeia_db::service::ColmeiaService;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MenuCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct MenuConfigRow {
    id: String,
    name: String,
    scope: &'static str,
    active: bool,
    include_unlisted: bool,
    items: usize,
    updated_at: DateTime<Utc>,
}

/// Handle `colmeia menu <action>`.
pub async fn handle(
    action: &MenuCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MenuCommands::List => output(&list(&ctx.service).await?, flags.format),
        MenuCommands::Activate(args) => {
            output(&activate(&ctx.service, &args.id).await?, flags.format)
        }
    }
}

async fn list(service: &ColmeiaService) -> anyhow::Result<Vec<MenuConfigRow>> {
    let mut rows = Vec::new();
    for config in service.list_menu_configs().await? {
        rows.push(config_row(service, config).await?);
    }
    Ok(rows)
}

async fn activate(service: &ColmeiaService, id: &str) -> anyhow::Result<MenuConfigRow> {
    let config = match service.activate_menu_config(id).await {
        Ok(config) => config,
        Err(DatabaseError::NoResult) => bail!("Configuração de menu não encontrada: {id}"),
        Err(error) => return Err(error.into()),
    };
    config_row(service, config).await
}

async fn config_row(service: &ColmeiaService, config: MenuConfig) -> anyhow::Result<MenuConfigRow> {
    let items = service.list_menu_items(&config.id).await?.len();
    Ok(MenuConfigRow {
        scope: config.scope.label(),
        id: config.id,
        name: config.name,
        active: config.active,
        include_unlisted: config.include_unlisted,
        items,
        updated_at: config.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use colmeia_core::enums::MenuScope;
    use colmeia_db::updates::menu::MenuConfigDraft;
    use pretty_assertions::assert_eq;

    use super::*;

    async fn service_with_configs() -> (ColmeiaService, String, String) {
        let svc = ColmeiaService::new_local(":memory:")
            .await
            .expect("in-memory database should open");
        let mut ids = Vec::new();
        for name in ["Produtores", "Visitantes"] {
            let config = svc
                .create_menu_config(MenuConfigDraft {
                    name: name.to_string(),
                    scope: MenuScope::NonSuperuser,
                    active: false,
                    include_unlisted: false,
                })
                .await
                .unwrap();
            ids.push(config.id);
        }
        let second = ids.pop().unwrap();
        let first = ids.pop().unwrap();
        (svc, first, second)
    }

    #[tokio::test]
    async fn activate_leaves_one_active_config() {
        let (svc, first, second) = service_with_configs().await;

        activate(&svc, &first).await.unwrap();
        let row = activate(&svc, &second).await.unwrap();
        assert!(row.active);
        assert_eq!(row.items, 0);

        let active: Vec<String> = list(&svc)
            .await
            .unwrap()
            .into_iter()
            .filter(|row| row.active)
            .map(|row| row.name)
            .collect();
        assert_eq!(active, ["Visitantes"]);
    }

    #[tokio::test]
    async fn activate_unknown_config_fails() {
        let (svc, _, _) = service_with_configs().await;
        let error = activate(&svc, "mnc-00000000").await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Configuração de menu não encontrada: mnc-00000000"
        );
    }
}
