//! Text rendering of a [`GlyphAtlas`] for visual inspection.

use std::io::{self, Write};

use font::glyph::{GlyphAtlas, Pixel};

/// Returns the character used to draw `pixel`.
const fn pixel_char(pixel: Pixel) -> char {
    match pixel {
        Pixel::Foreground => '#',
        Pixel::Background => '.',
        Pixel::Padding => ' ',
    }
}

/// Writes every row of `atlas`, drawing foreground pixels as `#`, background pixels as `.`, and
/// padding as spaces. Trailing padding is trimmed from each row.
///
/// # Errors
///
/// Returns any error produced by `writer`.
pub fn render<W: Write>(mut writer: W, atlas: &GlyphAtlas) -> io::Result<()> {
    for row in atlas.rows() {
        let line: String = row.iter().copied().map(pixel_char).collect();
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use font::glyph::{GlyphAtlas, Pixel};

    use super::render;

    #[test]
    fn renders_pixels_and_padding() {
        let mut atlas = GlyphAtlas::new(3, 2, 2);
        for y in 0..2 {
            for x in 0..2 {
                atlas.set_glyph_pixel(0, x, y, Pixel::from_bit(x == y));
            }
            atlas.set_glyph_pixel(1, 0, y, Pixel::Foreground);
        }

        let mut out = Vec::new();
        render(&mut out, &atlas).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "#. #\n.# #\n");
    }
}
