use clap::{Args, Subcommand};

/// User account commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user.
    Create(UserCreateArgs),
    /// Grant permission codenames such as `apiary.view_hive`.
    Grant(UserGrantArgs),
    /// List users with their permissions.
    List,
}

#[derive(Clone, Debug, Args)]
pub struct UserCreateArgs {
    #[arg(long)]
    pub username: String,
    /// Superusers are always staff members.
    #[arg(long)]
    pub superuser: bool,
    /// Allow access to the admin pages.
    #[arg(long)]
    pub staff: bool,
}

#[derive(Clone, Debug, Args)]
pub struct UserGrantArgs {
    pub username: String,
    #[arg(required = true)]
    pub codenames: Vec<String>,
}
