//! Clients fetching tile crops from upstream image servers.

mod decode;
mod http;
#[cfg(any(test, feature = "test"))]
mod mock;

pub use http::*;
#[cfg(any(test, feature = "test"))]
pub use mock::*;

use anyhow::Result;
use spectracube_core::{TileData, TileGrid, TileSpec};

/// A source of decoded tile crops.
///
/// One call fetches the crop for exactly one `(x, y, slice)` spec. A failed
/// fetch is permanent; the ingest pipeline does not retry individual tiles.
pub trait TileSourceTrait: Send + Sync {
	fn fetch(&self, spec: &TileSpec, grid: &TileGrid, bpc: u8) -> Result<TileData>;
}
