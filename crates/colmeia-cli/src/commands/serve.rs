use anyhow::Context;
use colmeia_web::AppState;

use crate::cli::root_commands::ServeArgs;
use crate::context::AppContext;

/// Handle `colmeia serve`. Runs until the listener fails or the process ends.
pub async fn handle(args: &ServeArgs, ctx: AppContext) -> anyhow::Result<()> {
    let AppContext { service, config } = ctx;
    let bind = args.bind.clone().unwrap_or_else(|| config.server.bind.clone());

    tracing::info!(
        database = %config.database.path,
        media_dir = %config.server.media_dir,
        "starting admin server"
    );

    let state = AppState::new(service, config).context("invalid server configuration")?;
    colmeia_web::serve(state, &bind)
        .await
        .with_context(|| format!("admin server on {bind} stopped"))
}
