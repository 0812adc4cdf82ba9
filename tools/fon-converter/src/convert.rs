//! Conversion of `.fon` executables and raw `.fnt` records into [`EncodedFont`]s.

use core::{error, fmt};

use anyhow::{Context, Result, bail};
use font::{
    codec::{CorruptStream, EncodeError, EncodedFont, encode},
    fnt::{FontRecord, RecordError, SUPPORTED_VERSION},
    glyph::GlyphAtlas,
};
use tracing::{debug, info, warn};

use crate::ne;

/// Options controlling [`convert_file()`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Decode every encoded font again and compare it against the reconstructed glyphs.
    pub verify: bool,
    /// Fail the whole conversion if any font fails instead of skipping it.
    pub strict: bool,
}

/// A single successfully converted font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedFont {
    /// The index of the font resource in the input file.
    pub index: usize,
    /// The face name stored in the font record.
    pub face_name: Option<String>,
    /// The first character code with a glyph.
    pub first_char: u8,
    /// The last character code with a glyph.
    pub last_char: u8,
    /// The reconstructed glyphs.
    pub atlas: GlyphAtlas,
    /// The encoded glyphs.
    pub encoded: EncodedFont,
}

/// Returns every font record in `file`.
///
/// `file` is either a raw font record, recognized by its leading version, or an NE executable
/// holding font resources.
///
/// # Errors
///
/// Returns an error if `file` is not a valid NE executable.
pub fn font_records(file: &[u8]) -> Result<Vec<&[u8]>> {
    if file.starts_with(&SUPPORTED_VERSION.to_le_bytes()) {
        debug!("input is a raw font record");
        return Ok(vec![file]);
    }

    let records = ne::font_resources(file).context("failed to locate font resources")?;
    debug!(count = records.len(), "located font resources");
    Ok(records)
}

/// Reconstructs and encodes the font record `record`, found at `index` in its file.
///
/// # Errors
///
/// - [`ConvertError::Record`]: The record is malformed or truncated.
/// - [`ConvertError::Encode`]: The reconstructed glyphs could not be encoded.
/// - [`ConvertError::Decode`] and [`ConvertError::RoundTripMismatch`]: `verify` was requested
///   and decoding did not reproduce the reconstructed glyphs.
pub fn convert_record(
    index: usize,
    record: &[u8],
    verify: bool,
) -> Result<ConvertedFont, ConvertError> {
    let record = FontRecord::parse(record)?;
    let header = record.header();
    let face_name = record.face_name().map(str::to_owned);
    debug!(
        index,
        face = face_name.as_deref().unwrap_or_default(),
        points = header.points,
        height = header.pix_height,
        max_width = header.max_width,
        first_char = header.first_char,
        last_char = header.last_char,
        "parsed font record"
    );

    let (atlas, widths) = record.reconstruct()?;
    let encoded = encode(&atlas, &widths)?;

    if verify {
        let decoded = encoded.decode(widths.glyph_count())?;
        if decoded != atlas {
            return Err(ConvertError::RoundTripMismatch);
        }
        debug!(index, "round trip verified");
    }

    Ok(ConvertedFont {
        index,
        face_name,
        first_char: header.first_char,
        last_char: header.last_char,
        atlas,
        encoded,
    })
}

/// Converts every font record in `file`.
///
/// Fonts that fail to convert are logged and skipped unless [`ConvertOptions::strict`] is set.
///
/// # Errors
///
/// Returns an error if `file` holds no font records, if no font could be converted, or if a font
/// failed while [`ConvertOptions::strict`] is set.
pub fn convert_file(file: &[u8], options: ConvertOptions) -> Result<Vec<ConvertedFont>> {
    let records = font_records(file)?;
    if records.is_empty() {
        bail!("input contains no font resources");
    }

    let total = records.len();
    let mut fonts = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        match convert_record(index, record, options.verify) {
            Ok(font) => {
                info!(
                    index,
                    face = font.face_name.as_deref().unwrap_or_default(),
                    glyphs = font.atlas.glyph_count(),
                    variable_width = font.encoded.is_variable_width(),
                    encoded_bytes = font.encoded.encoded_len(),
                    "converted font"
                );
                fonts.push(font);
            }
            Err(error) if options.strict => {
                return Err(error).with_context(|| format!("failed to convert font {index}"));
            }
            Err(error) => warn!(index, %error, "skipping font"),
        }
    }

    if fonts.is_empty() {
        bail!("none of the {total} font resources could be converted");
    }

    Ok(fonts)
}

/// Various errors that can occur while converting a single font record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertError {
    /// The font record could not be read.
    Record(RecordError),
    /// The reconstructed glyphs could not be encoded.
    Encode(EncodeError),
    /// The encoded glyphs could not be decoded.
    Decode(CorruptStream),
    /// The decoded glyphs differ from the reconstructed glyphs.
    RoundTripMismatch,
}

impl From<RecordError> for ConvertError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

impl From<EncodeError> for ConvertError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<CorruptStream> for ConvertError {
    fn from(value: CorruptStream) -> Self {
        Self::Decode(value)
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(error) => write!(f, "{error}"),
            Self::Encode(error) => write!(f, "failed to encode glyphs: {error}"),
            Self::Decode(error) => write!(f, "failed to decode encoded glyphs: {error}"),
            Self::RoundTripMismatch => write!(f, "decoded glyphs differ from the original glyphs"),
        }
    }
}

impl error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Record(error) => Some(error),
            Self::Encode(error) => Some(error),
            Self::Decode(error) => Some(error),
            Self::RoundTripMismatch => None,
        }
    }
}
