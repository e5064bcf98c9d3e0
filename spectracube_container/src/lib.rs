//! The profile cube container and the pipelines around it.
//!
//! This crate holds the four moving parts of the system:
//! - [`cube`]: the chunked HDF5 container storing the `[H, W, S]` pixel cube,
//! - [`source`]: the client fetching tile crops from upstream image servers,
//! - [`ingest`]: the bounded producer/consumer pipeline materializing a cube,
//! - [`profile`]: the query engine answering spectral-profile requests.

pub mod cube;
pub mod ingest;
pub mod profile;
pub mod source;

pub use cube::*;
pub use ingest::*;
pub use profile::*;
pub use source::*;
