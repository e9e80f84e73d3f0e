use clap::{Parser, Subcommand};

pub mod global;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
use subcommands::{AssetCommands, LocationCommands, WorkOrderCommands};

/// Top-level CLI parser for the `ezo` binary.
#[derive(Debug, Parser)]
#[command(name = "ezo", version, about = "EZOfficeInventory from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Print records read before a listing failed instead of only erroring
    #[arg(long, global = true)]
    pub allow_partial: bool,

    /// Quiet mode (errors only)
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
            allow_partial: self.allow_partial,
        }
    }
}

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Fixed assets.
    Assets {
        #[command(subcommand)]
        action: AssetCommands,
    },
    /// Locations.
    Locations {
        #[command(subcommand)]
        action: LocationCommands,
    },
    /// Work orders and checklists.
    #[command(name = "work-orders")]
    WorkOrders {
        #[command(subcommand)]
        action: WorkOrderCommands,
    },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::subcommands::{AssetCommands, LocationCommands, WorkOrderCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["ezo", "locations", "list", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Locations {
                action: LocationCommands::List { status: None }
            }
        ));
    }

    #[test]
    fn asset_list_collects_key_value_filters() {
        let cli = Cli::try_parse_from([
            "ezo",
            "assets",
            "list",
            "--status",
            "available",
            "--param",
            "location_id=3",
            "--param",
            "group_id=7",
        ])
        .expect("cli should parse");

        let Commands::Assets {
            action: AssetCommands::List { status, params },
        } = cli.command
        else {
            panic!("expected assets list");
        };
        assert_eq!(status.as_deref(), Some("available"));
        assert_eq!(
            params,
            vec![
                ("location_id".to_string(), "3".to_string()),
                ("group_id".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_param_is_rejected() {
        let parsed = Cli::try_parse_from(["ezo", "assets", "list", "--param", "location_id"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn location_status_rejects_unknown_value() {
        let parsed = Cli::try_parse_from(["ezo", "locations", "list", "--status", "archived"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn work_order_filter_parses() {
        let cli = Cli::try_parse_from(["ezo", "work-orders", "list", "in_progress"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::WorkOrders {
                action: WorkOrderCommands::List { .. }
            }
        ));
    }

    #[test]
    fn checkout_requires_user() {
        let parsed = Cli::try_parse_from(["ezo", "assets", "checkout", "55"]);
        assert!(parsed.is_err());
    }
}
