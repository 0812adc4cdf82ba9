//! Reader for raster font records in the FNT version 2.0 format.
//!
//! A record starts with a [`FontHeader`], followed by a glyph table with one [`GlyphEntry`] per
//! character code in `first_char..=last_char` plus one sentinel entry. Each glyph's bitmap is
//! stored as a series of 8 pixel wide columns, each column holding one byte per scanline with the
//! most significant bit as the leftmost pixel.

use core::{error, fmt};

use alloc::vec::Vec;

use crate::glyph::{GlyphAtlas, Pixel, WidthTable};

/// The only version of the FNT format that is supported.
pub const SUPPORTED_VERSION: u16 = 0x0200;

/// The size, in bytes, of a version 2.0 [`FontHeader`].
pub const HEADER_SIZE: usize = 118;

/// The size, in bytes, of a version 2.0 [`GlyphEntry`].
pub const GLYPH_ENTRY_SIZE: usize = 4;

/// The fixed-size header at the start of a FNT record.
///
/// Only the fields required to locate and interpret the glyph bitmaps are retained.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct FontHeader {
    /// The version of the record.
    pub version: u16,
    /// The type of the font. Bit 0 is set for vector fonts.
    pub font_type: u16,
    /// The nominal point size.
    pub points: u16,
    /// The distance, in pixels, from the top of a glyph cell to the baseline.
    pub ascent: u16,
    /// The width of every glyph for fixed-width fonts, or zero for variable-width fonts.
    pub pix_width: u16,
    /// The height of every glyph in pixels.
    pub pix_height: u16,
    /// The pitch and family. Bit 0 is set for variable-width fonts.
    pub pitch_and_family: u8,
    /// The width of the widest glyph in pixels.
    pub max_width: u16,
    /// The first character code with a glyph.
    pub first_char: u8,
    /// The last character code with a glyph.
    pub last_char: u8,
    /// The character code substituted for codes outside of the font.
    pub default_char: u8,
    /// The offset, from the start of the record, of the NUL-terminated face name.
    pub face_offset: u32,
    /// The offset, from the start of the record, of the glyph bitmaps.
    pub bits_offset: u32,
}

impl FontHeader {
    /// Parses a [`FontHeader`] from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::TruncatedData`] if `bytes` is shorter than [`HEADER_SIZE`].
    pub fn parse(bytes: &[u8]) -> Result<Self, RecordError> {
        check_bounds(bytes, 0, HEADER_SIZE)?;

        let header = Self {
            version: read_u16(bytes, 0)?,
            font_type: read_u16(bytes, 66)?,
            points: read_u16(bytes, 68)?,
            ascent: read_u16(bytes, 74)?,
            pix_width: read_u16(bytes, 86)?,
            pix_height: read_u16(bytes, 88)?,
            pitch_and_family: read_u8(bytes, 90)?,
            max_width: read_u16(bytes, 93)?,
            first_char: read_u8(bytes, 95)?,
            last_char: read_u8(bytes, 96)?,
            default_char: read_u8(bytes, 97)?,
            face_offset: read_u32(bytes, 105)?,
            bits_offset: read_u32(bytes, 113)?,
        };
        Ok(header)
    }

    /// Validates that the [`FontHeader`] describes a raster font that can be reconstructed.
    ///
    /// # Errors
    ///
    /// - [`FormatError::UnsupportedVersion`]: The version is not [`SUPPORTED_VERSION`].
    /// - [`FormatError::VectorFont`]: The font stores vector glyphs.
    /// - [`FormatError::InvalidCharRange`]: `last_char` is smaller than `first_char`.
    /// - [`FormatError::ZeroHeight`] and [`FormatError::ZeroWidth`]: A glyph dimension is zero.
    /// - [`FormatError::DimensionTooLarge`]: A glyph dimension does not fit in a byte.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.version != SUPPORTED_VERSION {
            return Err(FormatError::UnsupportedVersion(self.version));
        }

        if self.font_type & 0x1 == 0x1 {
            return Err(FormatError::VectorFont);
        }

        if self.last_char < self.first_char {
            return Err(FormatError::InvalidCharRange {
                first_char: self.first_char,
                last_char: self.last_char,
            });
        }

        if self.pix_height == 0 {
            return Err(FormatError::ZeroHeight);
        }

        if self.max_width == 0 {
            return Err(FormatError::ZeroWidth);
        }

        if self.pix_height > u16::from(u8::MAX) || self.max_width > u16::from(u8::MAX) {
            return Err(FormatError::DimensionTooLarge {
                max_width: self.max_width,
                height: self.pix_height,
            });
        }

        Ok(())
    }

    /// Returns the number of glyphs in the font.
    pub fn glyph_count(&self) -> usize {
        usize::from(self.last_char.saturating_sub(self.first_char)) + 1
    }

    /// Returns `true` if every glyph of the font has the same width.
    pub const fn is_fixed_width(&self) -> bool {
        self.pix_width != 0 && self.pitch_and_family & 0x1 == 0
    }
}

/// An entry in the glyph table of a [`FontRecord`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct GlyphEntry {
    /// The width of the glyph in pixels.
    pub width: u16,
    /// The offset, from the start of the record, of the glyph's first bitmap column.
    pub offset: u32,
}

/// A raster font record together with the bytes its offsets point into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontRecord<'buffer> {
    /// The bytes of the entire record.
    bytes: &'buffer [u8],
    /// The header of the record.
    header: FontHeader,
    /// The glyph table, including the trailing sentinel entry.
    glyph_table: Vec<GlyphEntry>,
}

impl<'buffer> FontRecord<'buffer> {
    /// Parses a [`FontRecord`] from `bytes`, which must start with a [`FontHeader`].
    ///
    /// # Errors
    ///
    /// - [`RecordError::Format`]: The header or the glyph table is invalid.
    /// - [`RecordError::TruncatedData`]: The header or the glyph table extends past the end of
    ///   `bytes`.
    pub fn parse(bytes: &'buffer [u8]) -> Result<Self, RecordError> {
        let header = FontHeader::parse(bytes)?;

        let entry_count = header.glyph_count() + 1;
        check_bounds(bytes, HEADER_SIZE, entry_count * GLYPH_ENTRY_SIZE)?;

        let glyph_table = (0..entry_count)
            .map(|index| {
                let offset = HEADER_SIZE + index * GLYPH_ENTRY_SIZE;
                Ok(GlyphEntry {
                    width: read_u16(bytes, offset)?,
                    offset: u32::from(read_u16(bytes, offset + 2)?),
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        Self::new(bytes, header, glyph_table)
    }

    /// Creates a new [`FontRecord`] from an already decoded `header` and `glyph_table`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::Format`]: The header is invalid, the glyph table does not contain one
    ///   entry per glyph plus a sentinel, a glyph is wider than the header's maximum width, or
    ///   the bitmap offsets decrease.
    pub fn new(
        bytes: &'buffer [u8],
        header: FontHeader,
        glyph_table: Vec<GlyphEntry>,
    ) -> Result<Self, RecordError> {
        header.validate()?;

        let expected = header.glyph_count() + 1;
        if glyph_table.len() != expected {
            return Err(FormatError::GlyphTableLength {
                expected,
                actual: glyph_table.len(),
            }
            .into());
        }

        let glyph_count = header.glyph_count();
        for (index, entry) in glyph_table[..glyph_count].iter().enumerate() {
            if entry.width > header.max_width {
                return Err(FormatError::GlyphTooWide {
                    index,
                    width: entry.width,
                    max_width: header.max_width,
                }
                .into());
            }
        }

        for (index, pair) in glyph_table.windows(2).enumerate() {
            if pair[1].offset < pair[0].offset {
                return Err(FormatError::DecreasingOffset {
                    index: index + 1,
                    offset: pair[1].offset,
                    previous: pair[0].offset,
                }
                .into());
            }
        }

        Ok(Self {
            bytes,
            header,
            glyph_table,
        })
    }

    /// Returns the [`FontHeader`] of this [`FontRecord`].
    pub const fn header(&self) -> &FontHeader {
        &self.header
    }

    /// Returns the glyph table of this [`FontRecord`], including the sentinel entry.
    pub fn glyph_table(&self) -> &[GlyphEntry] {
        &self.glyph_table
    }

    /// Returns the underlying bytes of this [`FontRecord`].
    pub const fn bytes(&self) -> &'buffer [u8] {
        self.bytes
    }

    /// Returns the face name of the font, if present and valid UTF-8.
    pub fn face_name(&self) -> Option<&'buffer str> {
        let start = usize::try_from(self.header.face_offset).ok()?;
        let name = self.bytes.get(start..)?;
        let end = name.iter().position(|&byte| byte == 0).unwrap_or(name.len());
        core::str::from_utf8(&name[..end]).ok()
    }

    /// Reassembles every glyph bitmap of the font into a [`GlyphAtlas`] and returns it along with
    /// the [`WidthTable`] of the font.
    ///
    /// Positions of a glyph's cell beyond its declared width are left as [`Pixel::Padding`].
    ///
    /// # Errors
    ///
    /// - [`RecordError::TruncatedData`]: A glyph's bitmap extends past the end of the record.
    pub fn reconstruct(&self) -> Result<(GlyphAtlas, WidthTable), RecordError> {
        let max_width = narrow(self.header.max_width, &self.header)?;
        let height = narrow(self.header.pix_height, &self.header)?;
        let glyph_count = self.header.glyph_count();

        let mut atlas = GlyphAtlas::new(max_width, height, glyph_count);
        let mut widths = Vec::with_capacity(glyph_count);
        for (index, entry) in self.glyph_table[..glyph_count].iter().enumerate() {
            let width = narrow(entry.width, &self.header)?;
            self.reconstruct_glyph(&mut atlas, index, width, entry.offset)?;
            widths.push(width);
        }

        let width_table = WidthTable::from_widths(widths, max_width, self.header.is_fixed_width());
        Ok((atlas, width_table))
    }

    /// Copies the bitmap columns of the glyph at `index` into its cell of `atlas`.
    fn reconstruct_glyph(
        &self,
        atlas: &mut GlyphAtlas,
        index: usize,
        width: u8,
        offset: u32,
    ) -> Result<(), RecordError> {
        let height = usize::from(atlas.glyph_height());
        let width = usize::from(width);
        let offset = usize::try_from(offset).map_err(|_| RecordError::TruncatedData {
            offset: usize::MAX,
            length: height,
            size: self.bytes.len(),
        })?;

        for column in 0..width.div_ceil(8) {
            let start = offset.saturating_add(column * height);
            check_bounds(self.bytes, start, height)?;
            let scanlines = &self.bytes[start..start + height];

            let column_width = (width - column * 8).min(8);
            for (y, byte) in scanlines.iter().enumerate() {
                for bit in 0..column_width {
                    let pixel = Pixel::from_bit(byte & (0x80 >> bit) != 0);
                    atlas.set_glyph_pixel(index, column * 8 + bit, y, pixel);
                }
            }
        }

        Ok(())
    }
}

/// Narrows a validated header dimension to a byte.
fn narrow(value: u16, header: &FontHeader) -> Result<u8, FormatError> {
    u8::try_from(value).map_err(|_| FormatError::DimensionTooLarge {
        max_width: header.max_width,
        height: header.pix_height,
    })
}

/// Returns an error if `length` bytes at `offset` do not fit inside `bytes`.
fn check_bounds(bytes: &[u8], offset: usize, length: usize) -> Result<(), RecordError> {
    let error = RecordError::TruncatedData {
        offset,
        length,
        size: bytes.len(),
    };

    let end = offset.checked_add(length).ok_or(error)?;
    if end > bytes.len() {
        return Err(error);
    }

    Ok(())
}

/// Reads the byte at `offset`.
fn read_u8(bytes: &[u8], offset: usize) -> Result<u8, RecordError> {
    read_array::<1>(bytes, offset).map(|[byte]| byte)
}

/// Reads a little-endian `u16` at `offset`.
fn read_u16(bytes: &[u8], offset: usize) -> Result<u16, RecordError> {
    read_array(bytes, offset).map(u16::from_le_bytes)
}

/// Reads a little-endian `u32` at `offset`.
fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, RecordError> {
    read_array(bytes, offset).map(u32::from_le_bytes)
}

/// Reads `N` bytes at `offset`.
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], RecordError> {
    bytes
        .get(offset..)
        .and_then(|tail| tail.first_chunk::<N>())
        .copied()
        .ok_or(RecordError::TruncatedData {
            offset,
            length: N,
            size: bytes.len(),
        })
}

/// Errors caused by internally inconsistent or unsupported font records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The record's version is not [`SUPPORTED_VERSION`].
    UnsupportedVersion(u16),
    /// The record describes a vector font.
    VectorFont,
    /// The last character code precedes the first character code.
    InvalidCharRange {
        /// The first character code.
        first_char: u8,
        /// The last character code.
        last_char: u8,
    },
    /// The glyph height is zero.
    ZeroHeight,
    /// The maximum glyph width is zero.
    ZeroWidth,
    /// A glyph dimension does not fit in a byte.
    DimensionTooLarge {
        /// The maximum glyph width.
        max_width: u16,
        /// The glyph height.
        height: u16,
    },
    /// The glyph table does not contain one entry per glyph plus a sentinel.
    GlyphTableLength {
        /// The required number of entries.
        expected: usize,
        /// The actual number of entries.
        actual: usize,
    },
    /// A glyph is wider than the maximum glyph width.
    GlyphTooWide {
        /// The index of the glyph.
        index: usize,
        /// The width of the glyph.
        width: u16,
        /// The maximum glyph width.
        max_width: u16,
    },
    /// A glyph's bitmap offset is smaller than the offset of the preceding glyph.
    DecreasingOffset {
        /// The index of the glyph table entry.
        index: usize,
        /// The offset of the entry.
        offset: u32,
        /// The offset of the preceding entry.
        previous: u32,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion(version) => write!(
                f,
                "version {version:#06x} found, only version {SUPPORTED_VERSION:#06x} is supported"
            ),
            Self::VectorFont => write!(f, "vector fonts are not supported"),
            Self::InvalidCharRange {
                first_char,
                last_char,
            } => write!(
                f,
                "last character {last_char:#04x} precedes first character {first_char:#04x}"
            ),
            Self::ZeroHeight => write!(f, "glyph height is zero"),
            Self::ZeroWidth => write!(f, "maximum glyph width is zero"),
            Self::DimensionTooLarge { max_width, height } => write!(
                f,
                "glyph dimensions {max_width}x{height} do not fit in a byte"
            ),
            Self::GlyphTableLength { expected, actual } => write!(
                f,
                "glyph table has {actual} entries but {expected} entries are required"
            ),
            Self::GlyphTooWide {
                index,
                width,
                max_width,
            } => write!(
                f,
                "glyph {index} is {width} pixels wide but the maximum width is {max_width}"
            ),
            Self::DecreasingOffset {
                index,
                offset,
                previous,
            } => write!(
                f,
                "glyph table entry {index} has offset {offset:#x} below the previous offset \
                {previous:#x}"
            ),
        }
    }
}

impl error::Error for FormatError {}

/// Various errors that can occur while reading a [`FontRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// The record is malformed.
    Format(FormatError),
    /// A computed read range extends past the end of the record.
    TruncatedData {
        /// The offset, in bytes, of the start of the requested range.
        offset: usize,
        /// The size, in bytes, of the requested range.
        length: usize,
        /// The actual size of the record.
        size: usize,
    },
}

impl From<FormatError> for RecordError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(error) => write!(f, "malformed font record: {error}"),
            Self::TruncatedData {
                offset,
                length,
                size,
            } => write!(
                f,
                "data is truncated: {length} bytes at offset {offset} do not fit inside record of \
                {size} bytes"
            ),
        }
    }
}

impl error::Error for RecordError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Format(error) => Some(error),
            Self::TruncatedData { .. } => None,
        }
    }
}
