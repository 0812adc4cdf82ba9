//! Delta run-length codec for monochrome glyphs.
//!
//! Glyphs first pass through the vertical [`delta`] transform, then the resulting pixels are
//! scanned glyph by glyph, row-major, and stored as runs of alternating value. The first run is
//! always [`Pixel::Background`][bg].
//!
//! Each run length is stored in [`nibble`]s:
//!
//! - `1..=15`: a single nibble holding the length.
//! - `0` and `16..=255`: a zero nibble followed by the low and then the high nibble of the length.
//! - `256..`: chunks of 255 pixels, each followed by a zero-length run, then the remainder.
//!
//! [bg]: crate::glyph::Pixel::Background

use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::io::{self, Write};

use crate::glyph::{GlyphAtlas, WidthTable};

pub mod delta;
pub mod nibble;

mod decode;
mod encode;

pub use decode::{CorruptStream, decode};
pub use encode::{EncodeError, MAX_ESCAPED_RUN, MAX_NIBBLE_RUN, encode};

/// Flag set in [`EncodedFont::flags`] when a width table is present.
pub const VARIABLE_WIDTH_FLAG: u8 = 0x01;

/// The size, in bytes, of the header of a dumped [`EncodedFont`].
pub const ENCODED_HEADER_SIZE: usize = 3;

/// A font encoded with the delta run-length codec.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct EncodedFont {
    /// The width of the widest glyph.
    pub max_width: u8,
    /// The height of every glyph.
    pub height: u8,
    /// Flags describing the font. See [`VARIABLE_WIDTH_FLAG`].
    pub flags: u8,
    /// The width of every glyph in character code order, present for variable-width fonts.
    pub width_table: Option<Vec<u8>>,
    /// The encoded runs.
    pub bitstream: Vec<u8>,
}

impl EncodedFont {
    /// Parses a dumped [`EncodedFont`] holding `glyph_count` glyphs.
    ///
    /// # Errors
    ///
    /// Returns [`CorruptStream::TruncatedHeader`] if `bytes` is too short to contain the header
    /// and, for variable-width fonts, the width table.
    pub fn parse(bytes: &[u8], glyph_count: usize) -> Result<Self, CorruptStream> {
        let Some((&[max_width, height, flags], rest)) =
            bytes.split_first_chunk::<ENCODED_HEADER_SIZE>()
        else {
            return Err(CorruptStream::TruncatedHeader {
                expected: ENCODED_HEADER_SIZE,
                actual: bytes.len(),
            });
        };

        let (width_table, bitstream) = if flags & VARIABLE_WIDTH_FLAG == VARIABLE_WIDTH_FLAG {
            if rest.len() < glyph_count {
                return Err(CorruptStream::TruncatedHeader {
                    expected: ENCODED_HEADER_SIZE + glyph_count,
                    actual: bytes.len(),
                });
            }

            let (widths, bitstream) = rest.split_at(glyph_count);
            (Some(widths.to_vec()), bitstream)
        } else {
            (None, rest)
        };

        Ok(Self {
            max_width,
            height,
            flags,
            width_table,
            bitstream: bitstream.to_vec(),
        })
    }

    /// Returns `true` if each glyph stores its own width.
    pub const fn is_variable_width(&self) -> bool {
        self.flags & VARIABLE_WIDTH_FLAG == VARIABLE_WIDTH_FLAG
    }

    /// Returns the [`WidthTable`] of a font holding `glyph_count` glyphs.
    ///
    /// Fixed-width fonts make every glyph [`EncodedFont::max_width`] pixels wide.
    pub fn widths(&self, glyph_count: usize) -> WidthTable {
        match &self.width_table {
            Some(widths) if self.is_variable_width() => WidthTable::Variable(widths.clone()),
            _ => WidthTable::Fixed {
                width: self.max_width,
                glyph_count,
            },
        }
    }

    /// Decodes the glyphs of a font holding `glyph_count` glyphs.
    ///
    /// # Errors
    ///
    /// Returns a [`CorruptStream`] if the bitstream does not describe exactly the pixels of the
    /// glyphs.
    pub fn decode(&self, glyph_count: usize) -> Result<GlyphAtlas, CorruptStream> {
        decode(
            &self.bitstream,
            &self.widths(glyph_count),
            self.max_width,
            self.height,
        )
    }

    /// Returns the number of bytes produced by [`EncodedFont::to_bytes()`].
    pub fn encoded_len(&self) -> usize {
        ENCODED_HEADER_SIZE + self.width_table.as_ref().map_or(0, Vec::len) + self.bitstream.len()
    }

    /// Returns the dumped form of this [`EncodedFont`]: the header, the width table if present,
    /// and the bitstream.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(&[self.max_width, self.height, self.flags]);
        if let Some(widths) = &self.width_table {
            bytes.extend_from_slice(widths);
        }
        bytes.extend_from_slice(&self.bitstream);
        bytes
    }

    /// Dumps the [`EncodedFont`] into the `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error produced by `writer`.
    #[cfg(feature = "std")]
    pub fn dump<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&[self.max_width, self.height, self.flags])?;
        if let Some(widths) = &self.width_table {
            writer.write_all(widths)?;
        }
        writer.write_all(&self.bitstream)
    }
}

#[cfg(test)]
mod test {
    use alloc::{vec, vec::Vec};

    use proptest::{collection, prelude::*};

    use super::{CorruptStream, EncodedFont, delta, encode, nibble::NibbleReader};
    use crate::{
        fnt::{FontRecord, test::build_record},
        glyph::{GlyphAtlas, Pixel, WidthTable},
    };

    /// A deterministic pixel pattern with both short and long runs.
    fn pattern(glyph: usize, x: usize, y: usize) -> bool {
        (glyph * 7 + x * 3 + y * y) % 5 < 2 || (glyph % 3 == 0 && y > 4)
    }

    #[test]
    fn fixed_width_round_trip() {
        let bytes = build_record(0x20, 13, &[7; 224], true, pattern);
        let record = FontRecord::parse(&bytes).unwrap();
        let (atlas, widths) = record.reconstruct().unwrap();

        let encoded = encode(&atlas, &widths).unwrap();
        assert!(!encoded.is_variable_width());
        assert_eq!(encoded.decode(224), Ok(atlas));
    }

    #[test]
    fn variable_width_round_trip() {
        let widths: Vec<u16> = (0..96).map(|index| (index * 5) % 17).collect();
        let bytes = build_record(0x20, 11, &widths, false, pattern);
        let record = FontRecord::parse(&bytes).unwrap();
        let (atlas, width_table) = record.reconstruct().unwrap();

        let encoded = encode(&atlas, &width_table).unwrap();
        assert!(encoded.is_variable_width());

        let table = encoded.width_table.clone().unwrap();
        assert_eq!(table.len(), 96);
        for (index, &width) in widths.iter().enumerate() {
            assert_eq!(u16::from(table[index]), width);
        }

        let parsed = EncodedFont::parse(&encoded.to_bytes(), 96).unwrap();
        assert_eq!(parsed, encoded);
        assert_eq!(parsed.decode(96), Ok(atlas));
    }

    #[test]
    fn padding_never_decodes_to_pixels() {
        // Glyphs are 13 pixels wide, so the low 3 bits of each second column byte are unused.
        let mut bytes = build_record(0x41, 6, &[13; 3], true, |_, _, _| false);
        let bits_offset = bytes.len() - 3 * 2 * 6;
        for glyph in 0..3 {
            let second_column = bits_offset + glyph * 12 + 6;
            for byte in &mut bytes[second_column..second_column + 6] {
                *byte |= 0x07;
            }
        }

        let record = FontRecord::parse(&bytes).unwrap();
        let (atlas, widths) = record.reconstruct().unwrap();
        let decoded = encode(&atlas, &widths).unwrap().decode(3).unwrap();

        for index in 0..3 {
            for y in 0..6 {
                for x in 0..13 {
                    assert_eq!(decoded.glyph_pixel(index, x, y), Some(Pixel::Background));
                }
                assert_eq!(decoded.glyph_pixel(index, 13, y), None);
            }
        }
        assert_eq!(decoded, atlas);
    }

    #[test]
    fn dumped_layout() {
        let encoded = EncodedFont {
            max_width: 9,
            height: 12,
            flags: 0x1,
            width_table: Some(vec![3, 9]),
            bitstream: vec![0xAB, 0xC0],
        };

        assert_eq!(encoded.to_bytes(), [9, 12, 1, 3, 9, 0xAB, 0xC0]);
        assert_eq!(encoded.encoded_len(), 7);
        assert_eq!(encoded.widths(2), WidthTable::Variable(vec![3, 9]));
    }

    #[cfg(feature = "std")]
    #[test]
    fn dump_matches_to_bytes() {
        let encoded = EncodedFont {
            max_width: 6,
            height: 10,
            flags: 0,
            width_table: None,
            bitstream: vec![0x12, 0x30],
        };

        let mut dumped = Vec::new();
        encoded.dump(&mut dumped).unwrap();
        assert_eq!(dumped, encoded.to_bytes());
        assert_eq!(encoded.widths(4), WidthTable::Fixed { width: 6, glyph_count: 4 });
    }

    /// Returns `true` if the pixel at (`x`, `y`) is set for a glyph drawn from `seed` at
    /// `density` sixteenths coverage.
    fn seeded_pixel(seed: u64, density: u8, x: usize, y: usize) -> bool {
        let x = (x as u64).wrapping_mul(0x9E37_79B9);
        let y = (y as u64).wrapping_mul(0x85EB_CA6B);
        let mixed = (seed ^ x ^ y).wrapping_mul(0x2545_F491_4F6C_DD1D);
        (mixed >> 60) < u64::from(density)
    }

    /// Splits `bitstream` into run lengths, ignoring a trailing fill nibble.
    fn run_lengths(bitstream: &[u8]) -> Vec<usize> {
        let mut reader = NibbleReader::new(bitstream);
        let mut runs = Vec::new();
        while let Some(nibble) = reader.next() {
            if nibble != 0 {
                runs.push(usize::from(nibble));
                continue;
            }

            match (reader.next(), reader.next()) {
                (Some(low), Some(high)) => runs.push(usize::from((high << 4) | low)),
                _ => break,
            }
        }
        runs
    }

    /// Returns the delta transformed pixels of `atlas` in encoding order.
    fn transformed_scan(atlas: &GlyphAtlas, widths: &WidthTable) -> Vec<Pixel> {
        let mut transformed = atlas.clone();
        delta::forward(&mut transformed, widths);

        let mut pixels = Vec::new();
        for (index, width) in widths.iter().enumerate() {
            for y in 0..usize::from(atlas.glyph_height()) {
                for x in 0..usize::from(width) {
                    pixels.push(transformed.glyph_pixel(index, x, y).unwrap());
                }
            }
        }
        pixels
    }

    proptest! {
        #[test]
        fn record_round_trip(
            max_width in 1u16..=32,
            height in 1u16..=32,
            fixed in any::<bool>(),
            glyphs in collection::vec(
                (any::<u64>(), any::<u16>(), prop_oneof![Just(0u8), Just(16u8), 0u8..=16]),
                1..40,
            ),
        ) {
            let widths: Vec<u16> = glyphs
                .iter()
                .enumerate()
                .map(|(index, &(_, width, _))| {
                    if fixed || index == 0 {
                        max_width
                    } else {
                        width % (max_width + 1)
                    }
                })
                .collect();
            let bytes = build_record(0x20, height, &widths, fixed, |glyph, x, y| {
                let (seed, _, density) = glyphs[glyph];
                seeded_pixel(seed, density, x, y)
            });

            let record = FontRecord::parse(&bytes).unwrap();
            let (atlas, width_table) = record.reconstruct().unwrap();
            let encoded = encode(&atlas, &width_table).unwrap();
            prop_assert_eq!(encoded.is_variable_width(), width_table.is_variable());

            // Runs alternate strictly, starting with background, and a zero-length run only
            // flips the value.
            let mut expanded = Vec::new();
            for (index, run) in run_lengths(&encoded.bitstream).into_iter().enumerate() {
                let value = Pixel::from_bit(index % 2 == 1);
                expanded.extend(core::iter::repeat_n(value, run));
            }
            prop_assert_eq!(expanded, transformed_scan(&atlas, &width_table));

            let glyph_count = glyphs.len();
            let parsed = EncodedFont::parse(&encoded.to_bytes(), glyph_count).unwrap();
            prop_assert_eq!(parsed.decode(glyph_count), Ok(atlas));
        }
    }

    #[test]
    fn parse_rejects_short_input() {
        assert_eq!(
            EncodedFont::parse(&[8, 8], 1),
            Err(CorruptStream::TruncatedHeader {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            EncodedFont::parse(&[8, 8, 1, 4], 2),
            Err(CorruptStream::TruncatedHeader {
                expected: 5,
                actual: 4
            })
        );
    }
}
