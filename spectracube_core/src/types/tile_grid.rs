//! The tile grid of an image and the specs naming single tiles of it.

use crate::types::SliceDescriptor;
use anyhow::{ensure, Result};
use std::fmt;
use std::sync::Arc;

/// Partition of a `width × height` image into square tiles of `tile_size`.
///
/// Tiles in the rightmost column and the bottom row may be smaller than
/// `tile_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
	pub width: u32,
	pub height: u32,
	pub tile_size: u32,
}

impl TileGrid {
	pub fn new(width: u32, height: u32, tile_size: u32) -> Result<TileGrid> {
		ensure!(width > 0, "image width must be > 0");
		ensure!(height > 0, "image height must be > 0");
		ensure!(tile_size > 0, "tile size must be > 0");
		Ok(TileGrid {
			width,
			height,
			tile_size,
		})
	}

	pub fn x_tiles(&self) -> u32 {
		self.width.div_ceil(self.tile_size)
	}

	pub fn y_tiles(&self) -> u32 {
		self.height.div_ceil(self.tile_size)
	}

	/// Left edge of tile column `x`, in pixels.
	pub fn left(&self, x: u32) -> u32 {
		x * self.tile_size
	}

	/// Top edge of tile row `y`, in pixels.
	pub fn top(&self, y: u32) -> u32 {
		y * self.tile_size
	}

	/// Actual width of tile column `x`, clipped at the image border.
	pub fn tile_width(&self, x: u32) -> u32 {
		self.tile_size.min(self.width - self.left(x))
	}

	/// Actual height of tile row `y`, clipped at the image border.
	pub fn tile_height(&self, y: u32) -> u32 {
		self.tile_size.min(self.height - self.top(y))
	}

	/// Number of tiles per slice.
	pub fn tiles_per_slice(&self) -> u64 {
		u64::from(self.x_tiles()) * u64::from(self.y_tiles())
	}
}

/// Names exactly one tile to fetch and place: a grid position plus the slice
/// it belongs to.
#[derive(Debug, Clone)]
pub struct TileSpec {
	pub x: u32,
	pub y: u32,
	pub slice: Arc<SliceDescriptor>,
}

impl fmt::Display for TileSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "x={} y={} rank={}", self.x, self.y, self.slice.rank)
	}
}
