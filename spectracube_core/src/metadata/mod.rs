//! Clients for the metadata store holding image, slice and conversion records.
//!
//! The `MetadataStoreTrait` seam lets the pipeline run against the real HTTP
//! store in production and against `MemoryMetadataStore` in tests.

mod http;
#[cfg(any(test, feature = "test"))]
mod memory;
mod retry;
mod traits;

pub use http::*;
#[cfg(any(test, feature = "test"))]
pub use memory::*;
pub use retry::*;
pub use traits::*;
