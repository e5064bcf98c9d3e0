//! Synthetic tile source used by the test suites.

use crate::source::TileSourceTrait;
use anyhow::{bail, Result};
use spectracube_core::{TileData, TileGrid, TileSpec};
use std::sync::atomic::{AtomicU64, Ordering};

type TileGenerator = dyn Fn(&TileSpec, &TileGrid) -> TileData + Send + Sync;

/// Generates tiles from a closure; can be armed to fail from the Nth fetch on.
pub struct MockTileSource {
	generate: Box<TileGenerator>,
	fail_from: Option<u64>,
	fetches: AtomicU64,
}

impl MockTileSource {
	pub fn new(generate: impl Fn(&TileSpec, &TileGrid) -> TileData + Send + Sync + 'static) -> MockTileSource {
		MockTileSource {
			generate: Box::new(generate),
			fail_from: None,
			fetches: AtomicU64::new(0),
		}
	}

	/// Make every fetch starting with the `n`-th (0-based) fail.
	pub fn failing_from(mut self, n: u64) -> MockTileSource {
		self.fail_from = Some(n);
		self
	}

	pub fn fetch_count(&self) -> u64 {
		self.fetches.load(Ordering::SeqCst)
	}
}

impl TileSourceTrait for MockTileSource {
	fn fetch(&self, spec: &TileSpec, grid: &TileGrid, _bpc: u8) -> Result<TileData> {
		let n = self.fetches.fetch_add(1, Ordering::SeqCst);
		if let Some(fail_from) = self.fail_from {
			if n >= fail_from {
				bail!("mock tile source failed at tile {spec}");
			}
		}
		Ok((self.generate)(spec, grid))
	}
}
