//! Decoding and display of a container given an [`InspectConfig`].

use std::{
    fs,
    io::{self, Write},
};

use anyhow::{Context, Result, bail};
use fon_converter::{container::Container, preview};
use font::codec::EncodedFont;
use tracing::debug;

use crate::cli::inspect::InspectConfig;

/// Decodes every font in the container described by `config` and prints its glyphs.
///
/// # Errors
///
/// Returns errors when the container cannot be read or parsed, or when a font fails to decode.
pub fn inspect(config: InspectConfig) -> Result<()> {
    if config.last_char < config.first_char {
        bail!(
            "last character {:#04x} precedes first character {:#04x}",
            config.last_char,
            config.first_char
        );
    }
    let glyph_count = usize::from(config.last_char - config.first_char) + 1;

    let bytes = fs::read(&config.container)
        .with_context(|| format!("failed to read \"{}\"", config.container.display()))?;
    let container = Container::parse(&bytes).context("failed to parse container")?;
    debug!(fonts = container.font_count(), glyph_count, "parsed container");

    let mut out = io::stdout().lock();
    for (index, block) in container.fonts().enumerate() {
        let font = EncodedFont::parse(block, glyph_count)
            .with_context(|| format!("failed to parse font {index}"))?;
        let atlas = font
            .decode(glyph_count)
            .with_context(|| format!("failed to decode font {index}"))?;

        writeln!(
            out,
            "font {index}: {} glyphs, {}x{} cells, {} width, {} encoded bytes",
            atlas.glyph_count(),
            font.max_width,
            font.height,
            if font.is_variable_width() {
                "variable"
            } else {
                "fixed"
            },
            font.encoded_len(),
        )?;
        preview::render(&mut out, &atlas)?;
        writeln!(out)?;
    }

    Ok(())
}
