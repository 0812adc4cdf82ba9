//! Command line parsing and [`Action::Inspect`][ai] construction.
//!
//! [ai]: crate::cli::Action::Inspect

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command, value_parser};

/// Description of a container to decode and display.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct InspectConfig {
    /// The container to inspect.
    pub container: PathBuf,
    /// The first character code of every font in the container.
    pub first_char: u8,
    /// The last character code of every font in the container.
    pub last_char: u8,
}

/// Parses the arguments required to produce a valid [`InspectConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> InspectConfig {
    let container = matches
        .get_one::<PathBuf>("container")
        .cloned()
        .unwrap_or_else(|| unreachable!("`container` is a required argument"));

    let first_char = matches
        .get_one::<u8>("first-char")
        .copied()
        .unwrap_or_else(|| unreachable!("`first-char` should have a default value"));

    let last_char = matches
        .get_one::<u8>("last-char")
        .copied()
        .unwrap_or_else(|| unreachable!("`last-char` should have a default value"));

    InspectConfig {
        container,
        first_char,
        last_char,
    }
}

/// Returns the command parser for an [`Action::Inspect`][ai].
///
/// [ai]: crate::cli::Action::Inspect
pub fn subcommand_parser() -> Command {
    let container = Arg::new("container")
        .help("The container to inspect")
        .value_parser(value_parser!(PathBuf))
        .required(true);

    let first_char = Arg::new("first-char")
        .long("first-char")
        .help("The first character code of the fonts, decimal or 0x-prefixed hexadecimal")
        .value_parser(parse_char_code)
        .default_value("0x20");

    let last_char = Arg::new("last-char")
        .long("last-char")
        .help("The last character code of the fonts, decimal or 0x-prefixed hexadecimal")
        .value_parser(parse_char_code)
        .default_value("0xff");

    Command::new("inspect")
        .about("Decodes the fonts of a container and prints their glyphs")
        .arg(container)
        .arg(first_char)
        .arg(last_char)
}

/// Parses a character code written in decimal or in 0x-prefixed hexadecimal.
fn parse_char_code(value: &str) -> Result<u8, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };

    parsed.map_err(|error| format!("invalid character code `{value}`: {error}"))
}

#[cfg(test)]
mod test {
    use super::{parse_arguments, parse_char_code, subcommand_parser};

    #[test]
    fn char_codes() {
        assert_eq!(parse_char_code("0x7f"), Ok(0x7F));
        assert_eq!(parse_char_code("32"), Ok(32));
        assert!(parse_char_code("0x100").is_err());
        assert!(parse_char_code("space").is_err());
    }

    #[test]
    fn defaults_cover_the_upper_ansi_range() {
        let matches = subcommand_parser()
            .try_get_matches_from(["inspect", "fonts.dfbf"])
            .unwrap();
        let config = parse_arguments(&matches);

        assert_eq!(config.first_char, 0x20);
        assert_eq!(config.last_char, 0xFF);
    }
}
