//! Locates the font resources stored inside a 16-bit "NE" executable, the container used by
//! `.fon` files.

use core::{error, fmt};

/// The magic bytes at the start of the DOS stub header.
pub const MZ_MAGIC: [u8; 2] = *b"MZ";

/// The magic bytes at the start of the NE header.
pub const NE_MAGIC: [u8; 2] = *b"NE";

/// The resource type of a font resource.
pub const RT_FONT: u16 = 0x8008;

/// The offset of the NE header pointer in the DOS stub header.
const NE_POINTER_OFFSET: usize = 0x3C;

/// The offset, relative to the NE header, of the resource table offset.
const RESOURCE_TABLE_OFFSET: usize = 0x24;

/// The size of a resource type block header.
const TYPE_BLOCK_SIZE: usize = 8;

/// The size of a resource entry.
const RESOURCE_ENTRY_SIZE: usize = 12;

/// The largest supported resource alignment shift.
const MAX_ALIGNMENT_SHIFT: u16 = 24;

/// A resource located in the resource table.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Resource<'buffer> {
    /// The type of the resource.
    pub type_id: u16,
    /// The identifier of the resource.
    pub resource_id: u16,
    /// The bytes of the resource.
    pub data: &'buffer [u8],
}

/// Returns every resource of type [`RT_FONT`] in `file`.
///
/// # Errors
///
/// - [`NeError::InvalidMzMagic`] and [`NeError::InvalidNeMagic`]: `file` is not an NE executable.
/// - [`NeError::InvalidAlignmentShift`]: The resource table's alignment shift is unreasonable.
/// - [`NeError::TruncatedData`]: A header, the resource table, or a resource extends past the end
///   of `file`.
pub fn font_resources(file: &[u8]) -> Result<Vec<&[u8]>, NeError> {
    let fonts = resources(file)?
        .into_iter()
        .filter(|resource| resource.type_id == RT_FONT)
        .map(|resource| resource.data)
        .collect();
    Ok(fonts)
}

/// Returns every resource in `file`.
///
/// Resource lengths are rounded up to the alignment of the resource table, so a resource's bytes
/// are cut off at the end of `file` if the file itself is not padded.
///
/// # Errors
///
/// See [`font_resources()`].
pub fn resources(file: &[u8]) -> Result<Vec<Resource<'_>>, NeError> {
    let mz_magic = read_array(file, 0)?;
    if mz_magic != MZ_MAGIC {
        return Err(NeError::InvalidMzMagic(mz_magic));
    }

    let ne_offset = usize::try_from(read_u32(file, NE_POINTER_OFFSET)?)
        .map_err(|_| truncated(file, usize::MAX, 2))?;
    let ne_magic = read_array(file, ne_offset)?;
    if ne_magic != NE_MAGIC {
        return Err(NeError::InvalidNeMagic(ne_magic));
    }

    let table_offset = ne_offset + usize::from(read_u16(file, ne_offset + RESOURCE_TABLE_OFFSET)?);
    let shift = read_u16(file, table_offset)?;
    if shift > MAX_ALIGNMENT_SHIFT {
        return Err(NeError::InvalidAlignmentShift(shift));
    }

    let mut resources = Vec::new();
    let mut cursor = table_offset + 2;
    loop {
        let type_id = read_u16(file, cursor)?;
        if type_id == 0 {
            break;
        }

        let count = usize::from(read_u16(file, cursor + 2)?);
        cursor += TYPE_BLOCK_SIZE;

        for _ in 0..count {
            let start = usize::from(read_u16(file, cursor)?) << shift;
            let length = usize::from(read_u16(file, cursor + 2)?) << shift;
            let resource_id = read_u16(file, cursor + 6)?;
            cursor += RESOURCE_ENTRY_SIZE;

            if start > file.len() {
                return Err(truncated(file, start, length));
            }
            let end = start.saturating_add(length).min(file.len());

            resources.push(Resource {
                type_id,
                resource_id,
                data: &file[start..end],
            });
        }
    }

    Ok(resources)
}

/// Returns a [`NeError::TruncatedData`] for `length` bytes at `offset` in `file`.
fn truncated(file: &[u8], offset: usize, length: usize) -> NeError {
    NeError::TruncatedData {
        offset,
        length,
        size: file.len(),
    }
}

/// Reads a little-endian `u16` at `offset`.
fn read_u16(file: &[u8], offset: usize) -> Result<u16, NeError> {
    read_array(file, offset).map(u16::from_le_bytes)
}

/// Reads a little-endian `u32` at `offset`.
fn read_u32(file: &[u8], offset: usize) -> Result<u32, NeError> {
    read_array(file, offset).map(u32::from_le_bytes)
}

/// Reads `N` bytes at `offset`.
fn read_array<const N: usize>(file: &[u8], offset: usize) -> Result<[u8; N], NeError> {
    file.get(offset..)
        .and_then(|tail| tail.first_chunk::<N>())
        .copied()
        .ok_or_else(|| truncated(file, offset, N))
}

/// Various errors that can occur while walking an NE executable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeError {
    /// The file does not start with [`MZ_MAGIC`].
    InvalidMzMagic([u8; 2]),
    /// The NE header does not start with [`NE_MAGIC`].
    InvalidNeMagic([u8; 2]),
    /// The resource table's alignment shift is larger than supported.
    InvalidAlignmentShift(u16),
    /// A computed read range extends past the end of the file.
    TruncatedData {
        /// The offset, in bytes, of the start of the requested range.
        offset: usize,
        /// The size, in bytes, of the requested range.
        length: usize,
        /// The actual size of the file.
        size: usize,
    },
}

impl fmt::Display for NeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMzMagic(magic) => write!(f, "invalid MZ magic: {magic:02X?}"),
            Self::InvalidNeMagic(magic) => write!(f, "invalid NE magic: {magic:02X?}"),
            Self::InvalidAlignmentShift(shift) => {
                write!(f, "invalid resource alignment shift: {shift}")
            }
            Self::TruncatedData {
                offset,
                length,
                size,
            } => write!(
                f,
                "data is truncated: {length} bytes at offset {offset} do not fit inside file of \
                {size} bytes"
            ),
        }
    }
}

impl error::Error for NeError {}

#[cfg(test)]
pub(crate) mod test {
    use super::{NeError, RT_FONT, font_resources, resources};

    /// Builds an NE executable holding a font directory resource and one font resource per entry
    /// of `fonts`, with resources aligned to 16 bytes.
    pub(crate) fn build_executable(fonts: &[&[u8]]) -> Vec<u8> {
        let mut file = vec![0u8; 0x40];
        file[0..2].copy_from_slice(b"MZ");
        file[0x3C..0x40].copy_from_slice(&0x40u32.to_le_bytes());

        let mut ne = vec![0u8; 0x40];
        ne[0..2].copy_from_slice(b"NE");
        ne[0x24..0x26].copy_from_slice(&0x40u16.to_le_bytes());
        file.extend_from_slice(&ne);

        // Resource table: alignment shift, a font directory block, a font block, terminator.
        let table_size = 2 + (8 + 12) + (8 + 12 * fonts.len()) + 2;
        let mut data_offset = (0x80 + table_size).next_multiple_of(16);
        let mut data = Vec::new();

        file.extend_from_slice(&4u16.to_le_bytes());
        file.extend_from_slice(&0x8007u16.to_le_bytes());
        file.extend_from_slice(&1u16.to_le_bytes());
        file.extend_from_slice(&[0; 4]);
        push_entry(&mut file, data_offset, 16, 0x0050);
        data.extend_from_slice(&[0xDD; 16]);
        data_offset += 16;

        file.extend_from_slice(&RT_FONT.to_le_bytes());
        file.extend_from_slice(&u16::try_from(fonts.len()).unwrap().to_le_bytes());
        file.extend_from_slice(&[0; 4]);
        for (index, font) in fonts.iter().enumerate() {
            let length = font.len().next_multiple_of(16);
            push_entry(&mut file, data_offset, length, 0x8001 + u16::try_from(index).unwrap());
            data.extend_from_slice(font);
            data.resize(data.len() + length - font.len(), 0);
            data_offset += length;
        }
        file.extend_from_slice(&0u16.to_le_bytes());

        file.resize(file.len().next_multiple_of(16), 0);
        file.extend_from_slice(&data);
        file
    }

    /// Appends a resource entry for `length` bytes at `offset`.
    fn push_entry(file: &mut Vec<u8>, offset: usize, length: usize, resource_id: u16) {
        file.extend_from_slice(&u16::try_from(offset >> 4).unwrap().to_le_bytes());
        file.extend_from_slice(&u16::try_from(length >> 4).unwrap().to_le_bytes());
        file.extend_from_slice(&0x1030u16.to_le_bytes());
        file.extend_from_slice(&resource_id.to_le_bytes());
        file.extend_from_slice(&[0; 4]);
    }

    #[test]
    fn finds_font_resources() {
        let first = [0x11; 20];
        let second = [0x22; 32];
        let file = build_executable(&[&first, &second]);

        let all = resources(&file).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].type_id, 0x8007);
        assert_eq!(all[2].resource_id, 0x8002);

        let fonts = font_resources(&file).unwrap();
        assert_eq!(fonts.len(), 2);
        assert_eq!(&fonts[0][..20], &first);
        assert_eq!(fonts[0].len(), 32);
        assert_eq!(fonts[1], &second);
    }

    #[test]
    fn rejects_other_files() {
        assert_eq!(
            font_resources(b"PK\x03\x04"),
            Err(NeError::InvalidMzMagic(*b"PK"))
        );

        let mut file = build_executable(&[]);
        file[0x40] = b'P';
        assert_eq!(font_resources(&file), Err(NeError::InvalidNeMagic(*b"PE")));
    }

    #[test]
    fn truncated_resource_table() {
        let file = build_executable(&[&[0x33; 16]]);
        assert!(matches!(
            font_resources(&file[..0x90]),
            Err(NeError::TruncatedData { .. })
        ));
    }
}
