use anyhow::bail;
use chrono::{DateTime, Utc};
use colmeia_db::error::DatabaseError;
use colmeia_db::service::ColmeiaService;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{UserCommands, UserCreateArgs, UserGrantArgs};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct UserRow {
    id: String,
    username: String,
    is_superuser: bool,
    is_staff: bool,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
}

/// Handle `colmeia user <action>`.
pub async fn handle(
    action: &UserCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        UserCommands::Create(args) => output(&create(&ctx.service, args).await?, flags.format),
        UserCommands::Grant(args) => output(&grant(&ctx.service, args).await?, flags.format),
        UserCommands::List => output(&list(&ctx.service).await?, flags.format),
    }
}

async fn create(service: &ColmeiaService, args: &UserCreateArgs) -> anyhow::Result<UserRow> {
    let is_staff = args.staff || args.superuser;
    let user = service
        .create_user(&args.username, args.superuser, is_staff)
        .await?;
    user_row(service, user).await
}

async fn grant(service: &ColmeiaService, args: &UserGrantArgs) -> anyhow::Result<UserRow> {
    for codename in &args.codenames {
        if !is_codename(codename) {
            bail!("Permissão inválida: '{codename}' (use <app>.<ação>_<modelo>)");
        }
    }

    let user = match service.get_user_by_username(args.username.trim()).await {
        Ok(user) => user,
        Err(DatabaseError::NoResult) => bail!("Usuário não encontrado: {}", args.username),
        Err(error) => return Err(error.into()),
    };
    service.grant_permissions(&user.id, &args.codenames).await?;
    user_row(service, user).await
}

async fn list(service: &ColmeiaService) -> anyhow::Result<Vec<UserRow>> {
    let mut rows = Vec::new();
    for user in service.list_users().await? {
        rows.push(user_row(service, user).await?);
    }
    Ok(rows)
}

async fn user_row(
    service: &ColmeiaService,
    user: colmeia_core::entities::User,
) -> anyhow::Result<UserRow> {
    let permissions = service.list_permissions(&user.id).await?;
    Ok(UserRow {
        permissions: permissions.into_iter().collect(),
        id: user.id,
        username: user.username,
        is_superuser: user.is_superuser,
        is_staff: user.is_staff,
        created_at: user.created_at,
    })
}

/// `apiary.view_hive`: an app label, a dot, then `<action>_<model>`.
fn is_codename(value: &str) -> bool {
    let Some((app, rest)) = value.trim().split_once('.') else {
        return false;
    };
    let Some((action, model)) = rest.split_once('_') else {
        return false;
    };
    [app, action, model]
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c == '_'))
}
