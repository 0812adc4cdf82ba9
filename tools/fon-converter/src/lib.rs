//! Tool for converting the raster fonts stored in `.fon` executables into the delta run-length
//! encoded [`EncodedFont`][ef] format and packaging them into a single `dfbf` container.
//!
//! [ef]: font::codec::EncodedFont

pub mod container;
pub mod convert;
pub mod dump;
pub mod ne;
pub mod preview;
