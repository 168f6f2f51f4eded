use clap::{Args, Subcommand};

/// Admin menu configuration commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MenuCommands {
    /// List configurations with their item counts.
    List,
    /// Make a configuration the active one for its scope.
    Activate(MenuActivateArgs),
}

#[derive(Clone, Debug, Args)]
pub struct MenuActivateArgs {
    /// Configuration ID.
    pub id: String,
}
