//! Decoding of delta run-length encoded glyphs back into a [`GlyphAtlas`].

use core::{error, fmt};

use crate::{
    codec::{delta, nibble::NibbleReader},
    glyph::{GlyphAtlas, Pixel, WidthTable},
};

/// Decodes `bitstream` into a [`GlyphAtlas`] with cells of `max_width` by `height` pixels.
///
/// The glyph count and the width of every glyph are taken from `widths`. Positions of a cell
/// beyond its glyph's width are [`Pixel::Padding`].
///
/// # Errors
///
/// - [`CorruptStream::GlyphTooWide`]: A width in `widths` exceeds `max_width`.
/// - [`CorruptStream::UnexpectedEnd`]: The stream ended before every pixel was decoded.
/// - [`CorruptStream::TruncatedEscape`]: The stream ended inside an escape triple.
/// - [`CorruptStream::PixelCountMismatch`]: The final run extends past the last pixel.
/// - [`CorruptStream::TrailingData`]: Nibbles other than a single fill nibble follow the last
///   run.
pub fn decode(
    bitstream: &[u8],
    widths: &WidthTable,
    max_width: u8,
    height: u8,
) -> Result<GlyphAtlas, CorruptStream> {
    for (index, width) in widths.iter().enumerate() {
        if width > max_width {
            return Err(CorruptStream::GlyphTooWide {
                index,
                width,
                max_width,
            });
        }
    }

    let expected = widths.pixel_count(height);
    let mut decoder = RunDecoder::new(bitstream);
    let mut atlas = GlyphAtlas::new(max_width, height, widths.glyph_count());
    let mut decoded = 0;
    for (index, width) in widths.iter().enumerate() {
        for y in 0..usize::from(height) {
            for x in 0..usize::from(width) {
                let pixel = decoder
                    .next_pixel()
                    .map_err(|error| error.at(decoded, expected))?;
                atlas.set_glyph_pixel(index, x, y, pixel);
                decoded += 1;
            }
        }
    }

    decoder.finish(expected)?;
    delta::inverse(&mut atlas, widths);
    Ok(atlas)
}

/// Splits a nibble stream back into runs of alternating value.
struct RunDecoder<'buffer> {
    /// The source of the encoded runs.
    reader: NibbleReader<'buffer>,
    /// The value of the current run.
    value: Pixel,
    /// The number of pixels of the current run that have not been returned.
    left: usize,
    /// Whether the first run has been read.
    started: bool,
}

/// The ways the stream can end early, before the decoded pixel count is known.
enum RunError {
    /// No nibbles remain.
    End,
    /// The stream ended inside an escape triple that started at the given nibble.
    Escape(usize),
}

impl RunError {
    /// Converts this [`RunError`] into a [`CorruptStream`] after `decoded` of `expected` pixels.
    fn at(self, decoded: usize, expected: usize) -> CorruptStream {
        match self {
            Self::End => CorruptStream::UnexpectedEnd { decoded, expected },
            Self::Escape(position) => CorruptStream::TruncatedEscape { position },
        }
    }
}

impl<'buffer> RunDecoder<'buffer> {
    /// Creates a new [`RunDecoder`] whose first run is [`Pixel::Background`].
    fn new(bitstream: &'buffer [u8]) -> Self {
        Self {
            reader: NibbleReader::new(bitstream),
            value: Pixel::Background,
            left: 0,
            started: false,
        }
    }

    /// Returns the next decoded pixel, reading new runs as required.
    ///
    /// Zero-length runs flip the value without producing a pixel.
    fn next_pixel(&mut self) -> Result<Pixel, RunError> {
        while self.left == 0 {
            let run = self.read_run()?;
            if self.started {
                self.value = self.value.toggle();
            } else {
                self.started = true;
            }
            self.left = run;
        }

        self.left -= 1;
        Ok(self.value)
    }

    /// Reads the length of the next run.
    fn read_run(&mut self) -> Result<usize, RunError> {
        let position = self.reader.position();
        let nibble = self.reader.next().ok_or(RunError::End)?;
        if nibble != 0 {
            return Ok(usize::from(nibble));
        }

        let low = self.reader.next().ok_or(RunError::Escape(position))?;
        let high = self.reader.next().ok_or(RunError::Escape(position))?;
        Ok(usize::from((high << 4) | low))
    }

    /// Checks that the stream holds nothing beyond the `expected` pixels but a fill nibble.
    fn finish(mut self, expected: usize) -> Result<(), CorruptStream> {
        if self.left != 0 {
            return Err(CorruptStream::PixelCountMismatch {
                expected,
                actual: expected + self.left,
            });
        }

        let remaining = self.reader.remaining();
        let is_fill = remaining == 1 && self.reader.next() == Some(0);
        if remaining != 0 && !is_fill {
            return Err(CorruptStream::TrailingData {
                nibbles: remaining,
            });
        }

        Ok(())
    }
}

/// Errors caused by a bitstream that does not decode into the expected glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorruptStream {
    /// The stream ended before every pixel was decoded.
    UnexpectedEnd {
        /// The number of pixels decoded.
        decoded: usize,
        /// The number of pixels required.
        expected: usize,
    },
    /// The stream ended inside an escape triple.
    TruncatedEscape {
        /// The index of the escape's first nibble.
        position: usize,
    },
    /// The runs describe more pixels than the glyphs hold.
    PixelCountMismatch {
        /// The number of pixels required.
        expected: usize,
        /// The number of pixels described by the runs.
        actual: usize,
    },
    /// Data follows the final run.
    TrailingData {
        /// The number of nibbles following the final run.
        nibbles: usize,
    },
    /// A glyph is wider than the cell width.
    GlyphTooWide {
        /// The index of the glyph.
        index: usize,
        /// The width of the glyph.
        width: u8,
        /// The width of a cell.
        max_width: u8,
    },
    /// The encoded font is too short to hold its header and width table.
    TruncatedHeader {
        /// The required number of bytes.
        expected: usize,
        /// The actual number of bytes.
        actual: usize,
    },
}

impl fmt::Display for CorruptStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd { decoded, expected } => write!(
                f,
                "stream ended after {decoded} of {expected} pixels"
            ),
            Self::TruncatedEscape { position } => {
                write!(f, "stream ended inside the escape starting at nibble {position}")
            }
            Self::PixelCountMismatch { expected, actual } => write!(
                f,
                "stream describes {actual} pixels but the glyphs hold {expected} pixels"
            ),
            Self::TrailingData { nibbles } => {
                write!(f, "{nibbles} nibbles follow the final run")
            }
            Self::GlyphTooWide {
                index,
                width,
                max_width,
            } => write!(
                f,
                "glyph {index} is {width} pixels wide but cells are {max_width} pixels wide"
            ),
            Self::TruncatedHeader { expected, actual } => write!(
                f,
                "encoded font header is truncated: expected {expected} bytes but got {actual} \
                bytes"
            ),
        }
    }
}

impl error::Error for CorruptStream {}
