//! Delta run-length encoding of a [`GlyphAtlas`].

use core::{error, fmt};

use alloc::vec::Vec;

use crate::{
    codec::{EncodedFont, VARIABLE_WIDTH_FLAG, delta, nibble::NibbleWriter},
    glyph::{GlyphAtlas, Pixel, WidthTable},
};

/// The longest run that fits in a single escape triple.
pub const MAX_ESCAPED_RUN: usize = 255;

/// The longest run that fits in a single nibble.
pub const MAX_NIBBLE_RUN: usize = 15;

/// Encodes the glyphs of `atlas` into an [`EncodedFont`].
///
/// Glyphs are scanned in order, each one row-major and bounded by its width in `widths`, after
/// the vertical [delta transform][delta] has been applied.
///
/// # Errors
///
/// - [`EncodeError::GlyphCountMismatch`]: `widths` does not describe every glyph of `atlas`.
/// - [`EncodeError::GlyphTooWide`]: A width in `widths` exceeds the cell width of `atlas`.
/// - [`EncodeError::UnexpectedPadding`]: A position inside a glyph's width is
///   [`Pixel::Padding`].
pub fn encode(atlas: &GlyphAtlas, widths: &WidthTable) -> Result<EncodedFont, EncodeError> {
    check_layout(atlas, widths)?;

    let mut transformed = atlas.clone();
    delta::forward(&mut transformed, widths);

    let height = usize::from(atlas.glyph_height());
    let mut encoder = RunEncoder::new();
    for (index, width) in widths.iter().enumerate() {
        for y in 0..height {
            for x in 0..usize::from(width) {
                let pixel = transformed
                    .glyph_pixel(index, x, y)
                    .unwrap_or(Pixel::Padding);
                encoder.push(pixel);
            }
        }
    }

    let (flags, width_table) = match widths {
        WidthTable::Fixed { .. } => (0, None),
        WidthTable::Variable(widths) => (VARIABLE_WIDTH_FLAG, Some(widths.clone())),
    };

    Ok(EncodedFont {
        max_width: atlas.glyph_width(),
        height: atlas.glyph_height(),
        flags,
        width_table,
        bitstream: encoder.finish(),
    })
}

/// Ensures `widths` matches the layout of `atlas` and that no glyph contains padding.
///
/// Every width is checked against the cell width before any glyph is scanned for padding.
fn check_layout(atlas: &GlyphAtlas, widths: &WidthTable) -> Result<(), EncodeError> {
    if widths.glyph_count() != atlas.glyph_count() {
        return Err(EncodeError::GlyphCountMismatch {
            atlas: atlas.glyph_count(),
            widths: widths.glyph_count(),
        });
    }

    if let Some((index, width)) = widths
        .iter()
        .enumerate()
        .find(|&(_, width)| width > atlas.glyph_width())
    {
        return Err(EncodeError::GlyphTooWide {
            index,
            width,
            max_width: atlas.glyph_width(),
        });
    }

    for (index, width) in widths.iter().enumerate() {
        for y in 0..usize::from(atlas.glyph_height()) {
            for x in 0..usize::from(width) {
                if atlas.glyph_pixel(index, x, y) == Some(Pixel::Padding) {
                    return Err(EncodeError::UnexpectedPadding { index, x, y });
                }
            }
        }
    }

    Ok(())
}

/// Accumulates pixels into runs of alternating value and writes them as nibbles.
///
/// The first run is always [`Pixel::Background`], so a stream starting with
/// [`Pixel::Foreground`] begins with a zero-length run.
#[derive(Clone, Debug)]
struct RunEncoder {
    /// The destination of the encoded runs.
    writer: NibbleWriter,
    /// The value of the current run.
    value: Pixel,
    /// The length of the current run.
    run: usize,
    /// Whether any pixel has been pushed.
    started: bool,
}

impl RunEncoder {
    /// Creates a new [`RunEncoder`] whose first run is [`Pixel::Background`].
    const fn new() -> Self {
        Self {
            writer: NibbleWriter::new(),
            value: Pixel::Background,
            run: 0,
            started: false,
        }
    }

    /// Appends `pixel` to the current run, or ends the run if `pixel` differs.
    fn push(&mut self, pixel: Pixel) {
        self.started = true;
        if pixel == self.value {
            self.run += 1;
        } else {
            write_run(&mut self.writer, self.run);
            self.value = self.value.toggle();
            self.run = 1;
        }
    }

    /// Writes the final run and returns the encoded bytes.
    fn finish(mut self) -> Vec<u8> {
        if self.started {
            write_run(&mut self.writer, self.run);
        }

        self.writer.finish()
    }
}

/// Writes a run of `run` pixels.
///
/// Runs longer than [`MAX_ESCAPED_RUN`] are split into chunks of [`MAX_ESCAPED_RUN`] pixels, each
/// followed by a zero-length run so that the value still alternates correctly for the decoder.
pub(crate) fn write_run(writer: &mut NibbleWriter, mut run: usize) {
    while run > MAX_ESCAPED_RUN {
        write_escaped(writer, u8::MAX);
        write_escaped(writer, 0);
        run -= MAX_ESCAPED_RUN;
    }

    #[expect(clippy::cast_possible_truncation, reason = "run is at most 255")]
    let run = run as u8;
    if run != 0 && usize::from(run) <= MAX_NIBBLE_RUN {
        writer.push(run);
    } else {
        write_escaped(writer, run);
    }
}

/// Writes `run` as an escape triple: a zero nibble, then the low and high nibbles of `run`.
fn write_escaped(writer: &mut NibbleWriter, run: u8) {
    writer.push(0);
    writer.push(run & 0xF);
    writer.push(run >> 4);
}

/// Errors caused by a [`WidthTable`] that does not fit the [`GlyphAtlas`] being encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// The atlas and the width table disagree on the number of glyphs.
    GlyphCountMismatch {
        /// The number of glyphs in the atlas.
        atlas: usize,
        /// The number of glyphs in the width table.
        widths: usize,
    },
    /// A glyph is wider than the cells of the atlas.
    GlyphTooWide {
        /// The index of the glyph.
        index: usize,
        /// The width of the glyph.
        width: u8,
        /// The width of an atlas cell.
        max_width: u8,
    },
    /// A position inside a glyph's width holds [`Pixel::Padding`].
    UnexpectedPadding {
        /// The index of the glyph.
        index: usize,
        /// The column inside the glyph.
        x: usize,
        /// The scanline inside the glyph.
        y: usize,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlyphCountMismatch { atlas, widths } => write!(
                f,
                "atlas holds {atlas} glyphs but the width table describes {widths} glyphs"
            ),
            Self::GlyphTooWide {
                index,
                width,
                max_width,
            } => write!(
                f,
                "glyph {index} is {width} pixels wide but atlas cells are {max_width} pixels wide"
            ),
            Self::UnexpectedPadding { index, x, y } => {
                write!(f, "glyph {index} has padding at ({x}, {y})")
            }
        }
    }
}

impl error::Error for EncodeError {}

#[cfg(test)]
mod test {
    use alloc::{vec, vec::Vec};

    use super::{EncodeError, encode, write_run};
    use crate::{
        codec::nibble::{NibbleReader, NibbleWriter},
        glyph::{GlyphAtlas, Pixel, WidthTable},
    };

    /// Returns the nibbles written for a single run of `run` pixels.
    fn run_nibbles(run: usize) -> Vec<u8> {
        let mut writer = NibbleWriter::new();
        write_run(&mut writer, run);
        let count = writer.nibble_count();
        let bytes = writer.finish();
        NibbleReader::new(&bytes).take(count).collect()
    }

    #[test]
    fn boundary_run_lengths() {
        assert_eq!(run_nibbles(1), [0x1]);
        assert_eq!(run_nibbles(15), [0xF]);
        assert_eq!(run_nibbles(16), [0x0, 0x0, 0x1]);
        assert_eq!(run_nibbles(0xA7), [0x0, 0x7, 0xA]);
        assert_eq!(run_nibbles(255), [0x0, 0xF, 0xF]);
        assert_eq!(run_nibbles(256), [0x0, 0xF, 0xF, 0x0, 0x0, 0x0, 0x1]);
    }

    #[test]
    fn zero_run_is_escaped() {
        assert_eq!(run_nibbles(0), [0x0, 0x0, 0x0]);
    }

    #[test]
    fn long_runs_repeat_separator() {
        // 1000 = 3 * 255 + 235
        assert_eq!(
            run_nibbles(1000),
            [
                0x0, 0xF, 0xF, 0x0, 0x0, 0x0, //
                0x0, 0xF, 0xF, 0x0, 0x0, 0x0, //
                0x0, 0xF, 0xF, 0x0, 0x0, 0x0, //
                0x0, 0xB, 0xE,
            ]
        );
        assert_eq!(run_nibbles(510), [0x0, 0xF, 0xF, 0x0, 0x0, 0x0, 0x0, 0xF, 0xF]);
    }

    #[test]
    fn box_glyph_runs() {
        let rows = ["11111111", "10000001", "10000001", "11111111"];
        let mut atlas = GlyphAtlas::new(8, 4, 1);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                atlas.set_glyph_pixel(0, x, y, Pixel::from_bit(c == '1'));
            }
        }
        let widths = WidthTable::Fixed {
            width: 8,
            glyph_count: 1,
        };

        let encoded = encode(&atlas, &widths).unwrap();
        assert_eq!(encoded.max_width, 8);
        assert_eq!(encoded.height, 4);
        assert_eq!(encoded.flags, 0);
        assert_eq!(encoded.width_table, None);

        // Delta rows are 11111111 01111110 00000000 01111110, giving the runs
        // background 0, foreground 8, background 1, foreground 6, background 10,
        // foreground 6, background 1.
        let nibbles: Vec<u8> = NibbleReader::new(&encoded.bitstream).collect();
        assert_eq!(nibbles, [0x0, 0x0, 0x0, 0x8, 0x1, 0x6, 0xA, 0x6, 0x1, 0x0]);
    }

    #[test]
    fn variable_width_font_keeps_widths() {
        let widths: Vec<u8> = (0..96).map(|index| index % 7 + 2).collect();
        let mut atlas = GlyphAtlas::new(8, 3, 96);
        for (index, &width) in widths.iter().enumerate() {
            for y in 0..3 {
                for x in 0..usize::from(width) {
                    atlas.set_glyph_pixel(index, x, y, Pixel::from_bit((x + y) % 3 == 0));
                }
            }
        }

        let encoded = encode(&atlas, &WidthTable::Variable(widths.clone())).unwrap();
        assert_eq!(encoded.flags, 0x1);
        assert_eq!(encoded.width_table.as_deref(), Some(widths.as_slice()));
        assert_eq!(encoded.width_table.map(|table| table.len()), Some(96));
    }

    #[test]
    fn rejects_mismatched_width_table() {
        let atlas = GlyphAtlas::new(4, 2, 2);

        assert_eq!(
            encode(&atlas, &WidthTable::Variable(vec![4])),
            Err(EncodeError::GlyphCountMismatch {
                atlas: 2,
                widths: 1
            })
        );
        assert_eq!(
            encode(&atlas, &WidthTable::Variable(vec![4, 5])),
            Err(EncodeError::GlyphTooWide {
                index: 1,
                width: 5,
                max_width: 4
            })
        );
        assert_eq!(
            encode(&atlas, &WidthTable::Variable(vec![0, 5])),
            Err(EncodeError::GlyphTooWide {
                index: 1,
                width: 5,
                max_width: 4
            })
        );
        assert_eq!(
            encode(&atlas, &WidthTable::Variable(vec![1, 0])),
            Err(EncodeError::UnexpectedPadding { index: 0, x: 0, y: 0 })
        );
    }

    #[test]
    fn empty_font_encodes_to_nothing() {
        let atlas = GlyphAtlas::new(4, 2, 2);
        let encoded = encode(&atlas, &WidthTable::Variable(vec![0, 0])).unwrap();
        assert!(encoded.bitstream.is_empty());
    }
}
