//! Conversion of a `.fon` file into a container given a [`ConvertConfig`].

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use fon_converter::{
    container,
    convert::{ConvertOptions, convert_file},
    dump,
};
use font::codec::EncodedFont;
use tracing::info;

use crate::cli::convert::{ConvertConfig, OutputFormat};

/// Converts every font in the file described by `config` and writes the resulting container.
///
/// Returns the path at which the container was written.
///
/// # Errors
///
/// Returns errors when the input cannot be read, no font can be converted, the container cannot
/// be built, or the output cannot be written.
pub fn convert(config: ConvertConfig) -> Result<PathBuf> {
    let file = fs::read(&config.input)
        .with_context(|| format!("failed to read \"{}\"", config.input.display()))?;

    let options = ConvertOptions {
        verify: config.verify,
        strict: config.strict,
    };
    let fonts: Vec<EncodedFont> = convert_file(&file, options)?
        .into_iter()
        .map(|font| font.encoded)
        .collect();
    let blob = container::build(&fonts).context("failed to build container")?;

    let output = File::create(&config.output)
        .with_context(|| format!("failed to create \"{}\"", config.output.display()))?;
    let mut writer = BufWriter::new(output);
    match config.format {
        OutputFormat::Binary => writer.write_all(&blob)?,
        OutputFormat::C => dump::write_c_array(&mut writer, &config.name, &blob)?,
        OutputFormat::Rust => dump::write_rust_static(&mut writer, &config.name, &blob)?,
    }
    writer
        .flush()
        .with_context(|| format!("failed to write \"{}\"", config.output.display()))?;

    info!(
        fonts = fonts.len(),
        bytes = blob.len(),
        format = config.format.as_str(),
        "wrote container"
    );

    Ok(config.output)
}
