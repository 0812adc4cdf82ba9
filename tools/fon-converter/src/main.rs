//! Converts the raster fonts stored in `.fon` files into delta run-length encoded containers and
//! displays the contents of such containers.

use anyhow::Result;
use tracing::Level;

use crate::{
    action::{convert::convert, inspect::inspect},
    cli::Action,
};

pub mod action;
pub mod cli;

fn main() -> Result<()> {
    let cli = cli::get_cli();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.action {
        Action::Convert(config) => {
            let path = convert(config)?;
            println!("container located at \"{}\"", path.display());
        }
        Action::Inspect(config) => inspect(config)?,
    }

    Ok(())
}
