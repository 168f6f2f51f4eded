use std::path::PathBuf;

use clap::{Args, Subcommand};
use colmeia_core::enums::SpeciesGroup;

/// Reference catalog seeds. Every seed can be run again safely.
#[derive(Clone, Debug, Subcommand)]
pub enum SeedCommands {
    /// Built-in hive box models.
    BoxModels,
    /// Cities from a JSON list of states.
    Cities(SeedFileArgs),
    /// Species from a JSON list.
    Species(SeedSpeciesArgs),
    /// The four seasons of the southern hemisphere.
    Seasons,
}

#[derive(Clone, Debug, Args)]
pub struct SeedFileArgs {
    /// Path to the JSON file.
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct SeedSpeciesArgs {
    /// Path to the JSON file.
    #[arg(long)]
    pub file: PathBuf,
    /// Group assigned to every imported species.
    #[arg(long, default_value = "sem_ferrao", value_parser = parse_group)]
    pub group: SpeciesGroup,
}

fn parse_group(value: &str) -> Result<SpeciesGroup, String> {
    value.parse::<SpeciesGroup>().map_err(|error| error.to_string())
}
