//! Command line parsing and [`Action::Convert`][ac] construction.
//!
//! [ac]: crate::cli::Action::Convert

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, builder::EnumValueParser, value_parser};
use fon_converter::dump::is_valid_identifier;

/// Description of a conversion from a `.fon` file into a container.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ConvertConfig {
    /// The `.fon` executable or raw `.fnt` record to convert.
    pub input: PathBuf,
    /// The path at which the container is written.
    pub output: PathBuf,
    /// The [`OutputFormat`] of the container.
    pub format: OutputFormat,
    /// The identifier used for text dumps.
    pub name: String,
    /// Whether every font is decoded again and compared against its glyphs.
    pub verify: bool,
    /// Whether a single broken font aborts the conversion.
    pub strict: bool,
}

/// Parses the arguments required to produce a valid [`ConvertConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> ConvertConfig {
    let input = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .unwrap_or_else(|| unreachable!("`input` is a required argument"));

    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| unreachable!("`output` is a required argument"));

    let format = matches
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or_else(|| unreachable!("`format` should have a default value"));

    let name = matches
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_else(|| unreachable!("`name` should have a default value"));

    ConvertConfig {
        input,
        output,
        format,
        name,
        verify: matches.get_flag("verify"),
        strict: matches.get_flag("strict"),
    }
}

/// Returns the command parser for an [`Action::Convert`][ac].
///
/// [ac]: crate::cli::Action::Convert
pub fn subcommand_parser() -> Command {
    let input = Arg::new("input")
        .help("The .fon executable or raw .fnt record to convert")
        .value_parser(value_parser!(PathBuf))
        .required(true);

    let output = Arg::new("output")
        .short('o')
        .long("output")
        .help("The path at which the container is written")
        .value_parser(value_parser!(PathBuf))
        .required(true);

    let format = Arg::new("format")
        .long("format")
        .help("The format in which the container is written")
        .value_parser(EnumValueParser::<OutputFormat>::new())
        .env("FON_CONVERTER_FORMAT")
        .default_value("bin");

    let name = Arg::new("name")
        .long("name")
        .help("The identifier of the array in text dumps")
        .value_parser(|name: &str| {
            if is_valid_identifier(name) {
                Ok(name.to_owned())
            } else {
                Err(format!("`{name}` is not a valid identifier"))
            }
        })
        .default_value("fonts");

    let verify = Arg::new("verify")
        .long("verify")
        .help("Decodes every encoded font and checks it against the original glyphs")
        .action(ArgAction::SetTrue);

    let strict = Arg::new("strict")
        .long("strict")
        .help("Fails instead of skipping fonts that cannot be converted")
        .action(ArgAction::SetTrue);

    Command::new("convert")
        .about("Converts the fonts of a .fon file into a container")
        .arg(input)
        .arg(output)
        .arg(format)
        .arg(name)
        .arg(verify)
        .arg(strict)
}

/// The format in which a container is written.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum OutputFormat {
    /// The raw container bytes.
    #[default]
    Binary,
    /// A C array definition.
    C,
    /// A Rust static definition.
    Rust,
}

impl OutputFormat {
    /// Returns the textual representation of the [`OutputFormat`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::C => "c",
            Self::Rust => "rust",
        }
    }
}

impl clap::ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        static FORMATS: &[OutputFormat] =
            &[OutputFormat::Binary, OutputFormat::C, OutputFormat::Rust];

        FORMATS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::{OutputFormat, parse_arguments, subcommand_parser};

    #[test]
    fn defaults() {
        let matches = subcommand_parser()
            .try_get_matches_from(["convert", "fonts.fon", "-o", "fonts.dfbf"])
            .unwrap();
        let config = parse_arguments(&matches);

        assert_eq!(config.input, PathBuf::from("fonts.fon"));
        assert_eq!(config.output, PathBuf::from("fonts.dfbf"));
        assert_eq!(config.name, "fonts");
        assert!(!config.verify);
        assert!(!config.strict);
    }

    #[test]
    fn text_dump_options() {
        let matches = subcommand_parser()
            .try_get_matches_from([
                "convert", "a.fon", "-o", "a.h", "--format", "c", "--name", "small_font",
                "--verify", "--strict",
            ])
            .unwrap();
        let config = parse_arguments(&matches);

        assert_eq!(config.format, OutputFormat::C);
        assert_eq!(config.name, "small_font");
        assert!(config.verify);
        assert!(config.strict);

        assert!(
            subcommand_parser()
                .try_get_matches_from(["convert", "a.fon", "-o", "a.h", "--name", "1font"])
                .is_err()
        );
    }
}
