//! Defines the glyph atlas, the raster FNT record reader, and the delta run-length codec used to
//! embed bitmap fonts in programs as static blobs.
//!
//! Includes both the encoding and the decoding interfaces.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
#[macro_use]
extern crate std;

pub mod codec;
pub mod fnt;
pub mod glyph;
