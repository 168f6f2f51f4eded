use clap::{Args, Subcommand};

use crate::cli::subcommands::{MenuCommands, SeedCommands, UserCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the admin HTTP server.
    Serve(ServeArgs),
    /// Load reference catalogs.
    Seed {
        #[command(subcommand)]
        action: SeedCommands,
    },
    /// User accounts and permissions.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Admin menu configurations.
    Menu {
        #[command(subcommand)]
        action: MenuCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to `server.bind`).
    #[arg(long)]
    pub bind: Option<String>,
}
