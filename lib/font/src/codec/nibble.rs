//! Nibble-granularity reading and writing of byte streams.
//!
//! The high nibble of each byte is written and read before its low nibble.

use alloc::vec::Vec;

/// The state of the byte currently being assembled by a [`NibbleWriter`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
enum PendingByte {
    /// No nibble of the next byte has been written.
    #[default]
    Empty,
    /// The high nibble of the next byte has been written.
    HalfFull(u8),
}

/// Writes nibbles into a growing byte buffer.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct NibbleWriter {
    /// The bytes that have been completed.
    bytes: Vec<u8>,
    /// The byte being assembled.
    pending: PendingByte,
}

impl NibbleWriter {
    /// Creates a new, empty [`NibbleWriter`].
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            pending: PendingByte::Empty,
        }
    }

    /// Writes the low four bits of `nibble`.
    pub fn push(&mut self, nibble: u8) {
        let nibble = nibble & 0xF;
        self.pending = match self.pending {
            PendingByte::Empty => PendingByte::HalfFull(nibble),
            PendingByte::HalfFull(high) => {
                self.bytes.push((high << 4) | nibble);
                PendingByte::Empty
            }
        };
    }

    /// Returns the number of nibbles written so far.
    pub fn nibble_count(&self) -> usize {
        let pending = match self.pending {
            PendingByte::Empty => 0,
            PendingByte::HalfFull(_) => 1,
        };
        self.bytes.len() * 2 + pending
    }

    /// Completes a half-written byte with a zero nibble and returns the written bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if let PendingByte::HalfFull(_) = self.pending {
            self.push(0);
        }

        self.bytes
    }
}

/// Reads nibbles out of a byte slice in the order a [`NibbleWriter`] wrote them.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct NibbleReader<'buffer> {
    /// The bytes being read.
    bytes: &'buffer [u8],
    /// The index of the nibble that will be returned next.
    index: usize,
}

impl<'buffer> NibbleReader<'buffer> {
    /// Creates a new [`NibbleReader`] positioned at the first nibble of `bytes`.
    pub const fn new(bytes: &'buffer [u8]) -> Self {
        Self { bytes, index: 0 }
    }

    /// Returns the index of the nibble that will be returned next.
    pub const fn position(&self) -> usize {
        self.index
    }

    /// Returns the number of nibbles that have not been read.
    pub const fn remaining(&self) -> usize {
        self.bytes.len() * 2 - self.index
    }
}

impl Iterator for NibbleReader<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = *self.bytes.get(self.index / 2)?;
        let nibble = if self.index % 2 == 0 {
            byte >> 4
        } else {
            byte & 0xF
        };

        self.index += 1;
        Some(nibble)
    }
}
