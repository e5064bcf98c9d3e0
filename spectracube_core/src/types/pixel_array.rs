//! Pixel containers: decoded 2-D tiles and 3-D slabs read back from the cube.
//!
//! Both come in an 8-bit and a 16-bit flavour, matching the cube's element
//! type. Reductions are computed in `f64` regardless of the element type.

use crate::types::{Reduction, SampleType};
use ndarray::{s, Array2, Array3, ArrayView3};

/// A decoded 2-D tile, ready to be placed into the cube.
#[derive(Debug, Clone, PartialEq)]
pub enum TileData {
	U8(Array2<u8>),
	U16(Array2<u16>),
}

impl TileData {
	pub fn sample_type(&self) -> SampleType {
		match self {
			TileData::U8(_) => SampleType::U8,
			TileData::U16(_) => SampleType::U16,
		}
	}

	/// `(rows, cols)` of the tile.
	pub fn dim(&self) -> (usize, usize) {
		match self {
			TileData::U8(a) => a.dim(),
			TileData::U16(a) => a.dim(),
		}
	}
}

/// A 3-D window of the cube: `[rows, cols, slices]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Slab {
	U8(Array3<u8>),
	U16(Array3<u16>),
}

impl Slab {
	pub fn sample_type(&self) -> SampleType {
		match self {
			Slab::U8(_) => SampleType::U8,
			Slab::U16(_) => SampleType::U16,
		}
	}

	/// `(rows, cols, slices)` of the slab.
	pub fn dim(&self) -> (usize, usize, usize) {
		match self {
			Slab::U8(a) => a.dim(),
			Slab::U16(a) => a.dim(),
		}
	}

	/// The spectral vector under cell `(row, col)`, widened to `u16`.
	pub fn profile_at(&self, row: usize, col: usize) -> Vec<u16> {
		match self {
			Slab::U8(a) => a.slice(s![row, col, ..]).iter().map(|&v| u16::from(v)).collect(),
			Slab::U16(a) => a.slice(s![row, col, ..]).to_vec(),
		}
	}

	/// Reduce the spectral axis, yielding a 2-D `[rows, cols]` projection.
	pub fn project(&self, reduction: Reduction) -> Array2<f64> {
		match self {
			Slab::U8(a) => project_view(a.view(), reduction),
			Slab::U16(a) => project_view(a.view(), reduction),
		}
	}
}

fn project_view<T>(view: ArrayView3<'_, T>, reduction: Reduction) -> Array2<f64>
where
	T: Copy + Into<f64>,
{
	let (rows, cols, depth) = view.dim();
	if depth == 0 {
		return Array2::zeros((rows, cols));
	}
	Array2::from_shape_fn((rows, cols), |(row, col)| {
		let lane = view.slice(s![row, col, ..]);
		let values = lane.iter().map(|&v| v.into());
		match reduction {
			Reduction::Min => values.fold(f64::INFINITY, f64::min),
			Reduction::Max => values.fold(f64::NEG_INFINITY, f64::max),
			Reduction::Mean => values.sum::<f64>() / depth as f64,
		}
	})
}
