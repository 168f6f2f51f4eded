mod menu;
mod seed;
mod user;

pub use menu::MenuCommands;
pub use seed::SeedCommands;
pub use user::{UserCommands, UserCreateArgs, UserGrantArgs};
