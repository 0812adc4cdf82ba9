//! Command line parsing and [`Action`] construction.

use clap::{Arg, ArgAction, Command};

use crate::cli::{convert::ConvertConfig, inspect::InspectConfig};

pub mod convert;
pub mod inspect;

/// The action to carry out.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    /// Convert the fonts of a `.fon` file into a container.
    Convert(ConvertConfig),
    /// Decode and display the fonts of a container.
    Inspect(InspectConfig),
}

/// Settings shared by every [`Action`].
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Cli {
    /// Whether debug logging is enabled.
    pub verbose: bool,
    /// The [`Action`] to carry out.
    pub action: Action,
}

/// Parses `fon-converter`'s arguments to construct a [`Cli`].
pub fn get_cli() -> Cli {
    let matches = command_parser().get_matches();
    let verbose = matches.get_flag("verbose");

    let Some((subcommand_name, subcommand_matches)) = matches.subcommand() else {
        unreachable!("subcommand is required");
    };
    let action = match subcommand_name {
        "convert" => Action::Convert(convert::parse_arguments(subcommand_matches)),
        "inspect" => Action::Inspect(inspect::parse_arguments(subcommand_matches)),
        _ => unreachable!("unexpected subcommand: {subcommand_name:?}"),
    };

    Cli { verbose, action }
}

/// Returns the command parser for all [`Action`]s.
fn command_parser() -> Command {
    let verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help("Enables debug logging")
        .action(ArgAction::SetTrue)
        .env("FON_CONVERTER_VERBOSE")
        .global(true);

    Command::new("fon-converter")
        .about("Converts raster .fon fonts into delta run-length encoded font containers")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(verbose)
        .subcommand(convert::subcommand_parser())
        .subcommand(inspect::subcommand_parser())
        .subcommand_required(true)
        .arg_required_else_help(true)
}
