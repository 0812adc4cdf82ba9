//! Packaging of several [`EncodedFont`]s into a single `dfbf` container.
//!
//! The container starts with [`MAGIC`], a version byte, and a font count byte, followed by a
//! little-endian `u32` offset for every font. Each offset points at the dumped [`EncodedFont`]
//! relative to the start of the container.

use core::{error, fmt};

use font::codec::EncodedFont;

/// The magic bytes at the start of every container.
pub const MAGIC: [u8; 4] = *b"dfbf";

/// The version of the container format.
pub const VERSION: u8 = 0;

/// The size of the container header, excluding the offset table.
pub const HEADER_SIZE: usize = MAGIC.len() + 2;

/// The size of each entry in the offset table.
const OFFSET_SIZE: usize = 4;

/// Builds a container holding `fonts`.
///
/// # Errors
///
/// - [`ContainerError::TooManyFonts`]: More than 255 fonts were provided.
/// - [`ContainerError::TooLarge`]: An offset does not fit in a `u32`.
pub fn build(fonts: &[EncodedFont]) -> Result<Vec<u8>, ContainerError> {
    let count = u8::try_from(fonts.len()).map_err(|_| ContainerError::TooManyFonts(fonts.len()))?;

    let table_end = HEADER_SIZE + fonts.len() * OFFSET_SIZE;
    let total = table_end + fonts.iter().map(EncodedFont::encoded_len).sum::<usize>();

    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(&MAGIC);
    bytes.push(VERSION);
    bytes.push(count);

    let mut offset = table_end;
    for font in fonts {
        let encoded = u32::try_from(offset).map_err(|_| ContainerError::TooLarge(offset))?;
        bytes.extend_from_slice(&encoded.to_le_bytes());
        offset += font.encoded_len();
    }

    for font in fonts {
        bytes.extend_from_slice(&font.to_bytes());
    }

    Ok(bytes)
}

/// A parsed container.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Container<'buffer> {
    /// The bytes of the entire container.
    bytes: &'buffer [u8],
    /// The start of every font block.
    offsets: Vec<usize>,
}

impl<'buffer> Container<'buffer> {
    /// Parses the header and offset table of a container.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::InvalidMagic`]: `bytes` does not start with [`MAGIC`].
    /// - [`ContainerError::UnsupportedVersion`]: The version is not [`VERSION`].
    /// - [`ContainerError::Truncated`]: The offset table extends past the end of `bytes`.
    /// - [`ContainerError::InvalidOffset`]: An offset points outside of the container or before
    ///   the preceding font.
    pub fn parse(bytes: &'buffer [u8]) -> Result<Self, ContainerError> {
        let Some((header, table)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(ContainerError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        };

        let [m0, m1, m2, m3, version, count] = *header;
        if [m0, m1, m2, m3] != MAGIC {
            return Err(ContainerError::InvalidMagic([m0, m1, m2, m3]));
        }
        if version != VERSION {
            return Err(ContainerError::UnsupportedVersion(version));
        }

        let count = usize::from(count);
        let table_end = HEADER_SIZE + count * OFFSET_SIZE;
        if bytes.len() < table_end {
            return Err(ContainerError::Truncated {
                expected: table_end,
                actual: bytes.len(),
            });
        }

        let mut offsets = Vec::with_capacity(count);
        let mut previous = table_end;
        for (index, entry) in table.chunks_exact(OFFSET_SIZE).take(count).enumerate() {
            let mut raw = [0; OFFSET_SIZE];
            raw.copy_from_slice(entry);
            let offset = u32::from_le_bytes(raw);

            let start = usize::try_from(offset)
                .ok()
                .filter(|&start| start >= previous && start <= bytes.len())
                .ok_or(ContainerError::InvalidOffset { index, offset })?;
            offsets.push(start);
            previous = start;
        }

        Ok(Self { bytes, offsets })
    }

    /// Returns the number of fonts in the container.
    pub fn font_count(&self) -> usize {
        self.offsets.len()
    }

    /// Returns the dumped [`EncodedFont`] at `index` or `None` if out of bounds.
    ///
    /// Each font extends up to the start of the next font, or the end of the container.
    pub fn font(&self, index: usize) -> Option<&'buffer [u8]> {
        let start = *self.offsets.get(index)?;
        let end = self
            .offsets
            .get(index + 1)
            .copied()
            .unwrap_or(self.bytes.len());
        self.bytes.get(start..end)
    }

    /// Returns an [`Iterator`] over every dumped [`EncodedFont`] in the container.
    pub fn fonts(&self) -> impl Iterator<Item = &'buffer [u8]> + '_ {
        (0..self.font_count()).filter_map(|index| self.font(index))
    }
}

/// Various errors that can occur when building or reading a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerError {
    /// The container does not start with [`MAGIC`].
    InvalidMagic([u8; 4]),
    /// The container's version is not [`VERSION`].
    UnsupportedVersion(u8),
    /// The container is shorter than its header and offset table.
    Truncated {
        /// The required number of bytes.
        expected: usize,
        /// The actual number of bytes.
        actual: usize,
    },
    /// A font offset points outside of the container or before the preceding font.
    InvalidOffset {
        /// The index of the font.
        index: usize,
        /// The offset of the font.
        offset: u32,
    },
    /// More fonts were provided than the font count byte can describe.
    TooManyFonts(usize),
    /// A font offset does not fit in a `u32`.
    TooLarge(usize),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMagic(magic) => write!(f, "invalid magic: {magic:02X?}"),
            Self::UnsupportedVersion(version) => write!(f, "unsupported version: {version}"),
            Self::Truncated { expected, actual } => write!(
                f,
                "container is truncated: expected {expected} bytes but got {actual} bytes"
            ),
            Self::InvalidOffset { index, offset } => {
                write!(f, "font {index} has invalid offset {offset:#x}")
            }
            Self::TooManyFonts(count) => {
                write!(f, "{count} fonts do not fit in a container of at most 255 fonts")
            }
            Self::TooLarge(offset) => write!(f, "offset {offset:#x} does not fit in 32 bits"),
        }
    }
}

impl error::Error for ContainerError {}
