//! Interface for interacting with glyph bitmaps.
//!
//! Glyphs are stored in a [`GlyphAtlas`], a single monochrome grid holding every glyph of a font
//! in cells of [`GLYPHS_PER_ROW`] columns. Each cell is as wide as the widest glyph, so the cells
//! of narrower glyphs are filled out with [`Pixel::Padding`].

use alloc::{vec, vec::Vec};

/// The number of glyph cells in each row of a [`GlyphAtlas`].
pub const GLYPHS_PER_ROW: usize = 16;

/// The value of a single position in a [`GlyphAtlas`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pixel {
    /// The pixel is not drawn.
    #[default]
    Background,
    /// The pixel is drawn.
    Foreground,
    /// The position lies outside of the glyph's declared width and does not carry a pixel.
    Padding,
}

impl Pixel {
    /// Returns [`Pixel::Foreground`] if `bit` is set and [`Pixel::Background`] otherwise.
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Self::Foreground
        } else {
            Self::Background
        }
    }

    /// Returns `true` if this [`Pixel`] is [`Pixel::Padding`].
    pub const fn is_padding(self) -> bool {
        matches!(self, Self::Padding)
    }

    /// Returns the opposite binary value. [`Pixel::Padding`] stays [`Pixel::Padding`].
    pub const fn toggle(self) -> Self {
        match self {
            Self::Background => Self::Foreground,
            Self::Foreground => Self::Background,
            Self::Padding => Self::Padding,
        }
    }

    /// Returns the exclusive-or of two binary pixels, treating [`Pixel::Foreground`] as the set
    /// bit. If either side is [`Pixel::Padding`], the result is [`Pixel::Padding`].
    pub const fn xor(self, other: Self) -> Self {
        match (self, other) {
            (Self::Padding, _) | (_, Self::Padding) => Self::Padding,
            (Self::Background, Self::Background) | (Self::Foreground, Self::Foreground) => {
                Self::Background
            }
            _ => Self::Foreground,
        }
    }
}

/// The true pixel width of every glyph in a font.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum WidthTable {
    /// Every glyph is exactly `width` pixels wide.
    Fixed {
        /// The width shared by every glyph.
        width: u8,
        /// The number of glyphs in the font.
        glyph_count: usize,
    },
    /// Each glyph carries its own width, ordered by character code.
    Variable(Vec<u8>),
}

impl WidthTable {
    /// Builds a [`WidthTable`] from the per-glyph `widths`.
    ///
    /// A [`WidthTable::Fixed`] is only produced when `fixed` is requested and every glyph is
    /// exactly `max_width` pixels wide. Otherwise the widths are kept as a
    /// [`WidthTable::Variable`].
    pub fn from_widths(widths: Vec<u8>, max_width: u8, fixed: bool) -> Self {
        if fixed && widths.iter().all(|&width| width == max_width) {
            Self::Fixed {
                width: max_width,
                glyph_count: widths.len(),
            }
        } else {
            Self::Variable(widths)
        }
    }

    /// Returns the width of the glyph at `index` or `None` if out of bounds.
    pub fn width(&self, index: usize) -> Option<u8> {
        match self {
            Self::Fixed { width, glyph_count } => (index < *glyph_count).then_some(*width),
            Self::Variable(widths) => widths.get(index).copied(),
        }
    }

    /// Returns the number of glyphs described by this [`WidthTable`].
    pub fn glyph_count(&self) -> usize {
        match self {
            Self::Fixed { glyph_count, .. } => *glyph_count,
            Self::Variable(widths) => widths.len(),
        }
    }

    /// Returns `true` if the widths must be stored alongside the encoded glyphs.
    pub const fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Returns an [`Iterator`] over the width of every glyph in character code order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.glyph_count()).filter_map(|index| self.width(index))
    }

    /// Returns the widest glyph width, or zero if there are no glyphs.
    pub fn max_width(&self) -> u8 {
        self.iter().max().unwrap_or(0)
    }

    /// Returns the number of real pixels in every glyph combined when each glyph is `height`
    /// pixels tall.
    pub fn pixel_count(&self, height: u8) -> usize {
        self.iter()
            .map(|width| usize::from(width) * usize::from(height))
            .sum()
    }
}

/// A rectangular grid containing every glyph of a font.
///
/// Glyph `i` occupies the cell at column `i % 16` and row `i / 16`. Every cell is
/// [`GlyphAtlas::glyph_width()`] by [`GlyphAtlas::glyph_height()`] pixels.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct GlyphAtlas {
    /// The pixels of the atlas in row-major order.
    pixels: Vec<Pixel>,
    /// The width of each glyph cell.
    glyph_width: u8,
    /// The height of each glyph cell.
    glyph_height: u8,
    /// The number of glyphs stored in the atlas.
    glyph_count: usize,
}

impl GlyphAtlas {
    /// Creates a new [`GlyphAtlas`] large enough for `glyph_count` cells of `glyph_width` by
    /// `glyph_height` pixels, with every position set to [`Pixel::Padding`].
    pub fn new(glyph_width: u8, glyph_height: u8, glyph_count: usize) -> Self {
        let width = GLYPHS_PER_ROW * usize::from(glyph_width);
        let height = glyph_count.div_ceil(GLYPHS_PER_ROW) * usize::from(glyph_height);

        Self {
            pixels: vec![Pixel::Padding; width * height],
            glyph_width,
            glyph_height,
            glyph_count,
        }
    }

    /// Returns the width of the atlas in pixels.
    pub fn width(&self) -> usize {
        GLYPHS_PER_ROW * usize::from(self.glyph_width)
    }

    /// Returns the height of the atlas in pixels.
    pub fn height(&self) -> usize {
        self.glyph_count.div_ceil(GLYPHS_PER_ROW) * usize::from(self.glyph_height)
    }

    /// Returns the width of a glyph cell in pixels.
    pub const fn glyph_width(&self) -> u8 {
        self.glyph_width
    }

    /// Returns the height of a glyph cell in pixels.
    pub const fn glyph_height(&self) -> u8 {
        self.glyph_height
    }

    /// Returns the number of glyphs in this [`GlyphAtlas`].
    pub const fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Returns the [`Pixel`] at (`x`, `y`) or `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width() {
            return None;
        }

        self.pixels.get(y * self.width() + x).copied()
    }

    /// Returns the top-left corner of the cell holding the glyph at `index`.
    pub fn cell_origin(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.glyph_count {
            return None;
        }

        let x = (index % GLYPHS_PER_ROW) * usize::from(self.glyph_width);
        let y = (index / GLYPHS_PER_ROW) * usize::from(self.glyph_height);
        Some((x, y))
    }

    /// Returns the [`Pixel`] at (`x`, `y`) relative to the cell of the glyph at `index`.
    pub fn glyph_pixel(&self, index: usize, x: usize, y: usize) -> Option<Pixel> {
        let offset = self.cell_offset(index, x, y)?;
        self.pixels.get(offset).copied()
    }

    /// Sets the [`Pixel`] at (`x`, `y`) relative to the cell of the glyph at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a glyph of this atlas or (`x`, `y`) lies outside of its cell.
    pub fn set_glyph_pixel(&mut self, index: usize, x: usize, y: usize, pixel: Pixel) {
        let offset = self
            .cell_offset(index, x, y)
            .unwrap_or_else(|| panic!("({x}, {y}) is outside of the cell of glyph {index}"));
        self.pixels[offset] = pixel;
    }

    /// Returns an [`Iterator`] over the rows of the atlas, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> + '_ {
        self.pixels.chunks(self.width().max(1))
    }

    /// Returns the index into `pixels` of (`x`, `y`) in the cell of the glyph at `index`.
    fn cell_offset(&self, index: usize, x: usize, y: usize) -> Option<usize> {
        if x >= usize::from(self.glyph_width) || y >= usize::from(self.glyph_height) {
            return None;
        }

        let (cell_x, cell_y) = self.cell_origin(index)?;
        Some((cell_y + y) * self.width() + cell_x + x)
    }
}
