//! Vertical delta transform applied to glyphs before run-length encoding.
//!
//! Every scanline of a glyph is replaced by its exclusive-or with the scanline above it. The first
//! scanline is compared against an implicit scanline of [`Pixel::Background`] and so is left
//! unchanged. Only positions inside each glyph's true width are touched.

use crate::glyph::{GlyphAtlas, Pixel, WidthTable};

/// Applies the delta transform to every glyph of `atlas` in place.
pub fn forward(atlas: &mut GlyphAtlas, widths: &WidthTable) {
    for_each_glyph(atlas, widths, |atlas, index, width, height| {
        // Bottom-up so each scanline is compared against the untransformed one above it.
        for y in (1..height).rev() {
            xor_with_previous(atlas, index, width, y);
        }
    });
}

/// Reverses [`forward()`] on every glyph of `atlas` in place.
pub fn inverse(atlas: &mut GlyphAtlas, widths: &WidthTable) {
    for_each_glyph(atlas, widths, |atlas, index, width, height| {
        for y in 1..height {
            xor_with_previous(atlas, index, width, y);
        }
    });
}

/// Calls `f` with the index, true width, and height of every glyph in `atlas`.
fn for_each_glyph<F: FnMut(&mut GlyphAtlas, usize, usize, usize)>(
    atlas: &mut GlyphAtlas,
    widths: &WidthTable,
    mut f: F,
) {
    let height = usize::from(atlas.glyph_height());
    let cell_width = atlas.glyph_width();
    for index in 0..atlas.glyph_count() {
        let width = widths.width(index).unwrap_or(0).min(cell_width);
        f(atlas, index, usize::from(width), height);
    }
}

/// Replaces scanline `y` of the glyph at `index` with its exclusive-or against scanline `y - 1`.
fn xor_with_previous(atlas: &mut GlyphAtlas, index: usize, width: usize, y: usize) {
    for x in 0..width {
        let above = atlas.glyph_pixel(index, x, y - 1).unwrap_or(Pixel::Padding);
        let current = atlas.glyph_pixel(index, x, y).unwrap_or(Pixel::Padding);
        atlas.set_glyph_pixel(index, x, y, current.xor(above));
    }
}

#[cfg(test)]
mod test {
    use alloc::vec;

    use super::{forward, inverse};
    use crate::glyph::{GlyphAtlas, Pixel, WidthTable};

    /// Builds a single glyph atlas from rows of `0`/`1` characters.
    fn atlas_from_rows(rows: &[&str]) -> (GlyphAtlas, WidthTable) {
        let width = u8::try_from(rows[0].len()).unwrap();
        let height = u8::try_from(rows.len()).unwrap();
        let mut atlas = GlyphAtlas::new(width, height, 1);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                atlas.set_glyph_pixel(0, x, y, Pixel::from_bit(c == '1'));
            }
        }

        (atlas, WidthTable::Variable(vec![width]))
    }

    #[test]
    fn box_glyph_transform() {
        let (mut atlas, widths) =
            atlas_from_rows(&["11111111", "10000001", "10000001", "11111111"]);
        let original = atlas.clone();

        forward(&mut atlas, &widths);
        let (expected, _) = atlas_from_rows(&["11111111", "01111110", "00000000", "01111110"]);
        assert_eq!(atlas, expected);

        inverse(&mut atlas, &widths);
        assert_eq!(atlas, original);
    }

    #[test]
    fn padding_is_left_alone() {
        let mut atlas = GlyphAtlas::new(4, 3, 2);
        for y in 0..3 {
            for x in 0..2 {
                atlas.set_glyph_pixel(0, x, y, Pixel::Foreground);
            }
        }
        let widths = WidthTable::Variable(vec![2, 0]);

        forward(&mut atlas, &widths);
        for y in 0..3 {
            let expected = if y == 0 {
                Pixel::Foreground
            } else {
                Pixel::Background
            };
            assert_eq!(atlas.glyph_pixel(0, 0, y), Some(expected));
            assert_eq!(atlas.glyph_pixel(0, 2, y), Some(Pixel::Padding));
            assert_eq!(atlas.glyph_pixel(1, 0, y), Some(Pixel::Padding));
        }
    }
}
