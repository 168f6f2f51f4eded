pub mod menu;
pub mod seed;
pub mod serve;
pub mod user;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Serve(args) => serve::handle(&args, ctx).await,
        Commands::Seed { action } => seed::handle(&action, &ctx, flags).await,
        Commands::User { action } => user::handle(&action, &ctx, flags).await,
        Commands::Menu { action } => menu::handle(&action, &ctx, flags).await,
    }
}
