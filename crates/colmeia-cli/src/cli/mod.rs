use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `colmeia` binary.
#[derive(Debug, Parser)]
#[command(
    name = "colmeia",
    version,
    about = "Colmeia - registros de meliponicultura"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use colmeia_core::enums::SpeciesGroup;

    use super::subcommands::{MenuCommands, SeedCommands, UserCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["colmeia", "--format", "table", "--verbose", "serve"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve(ref args) if args.bind.is_none()));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["colmeia", "user", "list", "-f", "raw", "-q"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::User {
                action: UserCommands::List
            }
        ));
    }

    #[test]
    fn serve_accepts_bind_override() {
        let cli = Cli::try_parse_from(["colmeia", "serve", "--bind", "0.0.0.0:9000"])
            .expect("cli should parse");
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000"));
    }

    #[test]
    fn seed_species_defaults_to_stingless_group() {
        let cli = Cli::try_parse_from(["colmeia", "seed", "species", "--file", "especies.json"])
            .expect("cli should parse");
        let Commands::Seed {
            action: SeedCommands::Species(args),
        } = cli.command
        else {
            panic!("expected seed species");
        };
        assert_eq!(args.file.to_str(), Some("especies.json"));
        assert_eq!(args.group, SpeciesGroup::Stingless);
    }

    #[test]
    fn seed_species_accepts_group_value() {
        let cli = Cli::try_parse_from([
            "colmeia",
            "seed",
            "species",
            "--file",
            "especies.json",
            "--group",
            "apis_mellifera",
        ])
        .expect("cli should parse");
        let Commands::Seed {
            action: SeedCommands::Species(args),
        } = cli.command
        else {
            panic!("expected seed species");
        };
        assert_eq!(args.group, SpeciesGroup::ApisMellifera);
    }

    #[test]
    fn seed_cities_requires_file() {
        assert!(Cli::try_parse_from(["colmeia", "seed", "cities"]).is_err());
    }

    #[test]
    fn user_grant_takes_many_codenames() {
        let cli = Cli::try_parse_from([
            "colmeia",
            "user",
            "grant",
            "ana",
            "apiary.view_hive",
            "apiary.add_hive",
        ])
        .expect("cli should parse");
        let Commands::User {
            action: UserCommands::Grant(args),
        } = cli.command
        else {
            panic!("expected user grant");
        };
        assert_eq!(args.username, "ana");
        assert_eq!(args.codenames, ["apiary.view_hive", "apiary.add_hive"]);
    }

    #[test]
    fn user_grant_requires_a_codename() {
        assert!(Cli::try_parse_from(["colmeia", "user", "grant", "ana"]).is_err());
    }

    #[test]
    fn menu_activate_takes_id() {
        let cli = Cli::try_parse_from(["colmeia", "menu", "activate", "mnc-0000abcd"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Menu {
                action: MenuCommands::Activate(ref args)
            } if args.id == "mnc-0000abcd"
        ));
    }
}
