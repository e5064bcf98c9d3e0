//! The on-disk profile cube: a chunked HDF5 file.
//!
//! Layout (fixed, existing readers depend on these five names):
//! - scalar `i64` datasets `width`, `height`, `nSlices`, `bpc`;
//! - one chunked 3-D dataset `data` of shape `[height, width, nSlices]` and
//!   element type `uint8` (`bpc ≤ 8`) or `uint16`.
//!
//! The cube is write-once: [`CubeWriter`] fills it during ingest, afterwards
//! it is only ever opened through [`CubeReader`].

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;
