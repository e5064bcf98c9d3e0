use anyhow::{ensure, Context, Result};
use ndarray::{s, Array3, Ix3};
use spectracube_core::{SampleType, SliceRange, Slab};
use spectracube_geometry::MaskBounds;
use std::path::Path;

/// Read-only handle of a materialized cube.
///
/// Queries open one handle each; handles are not shared across requests.
pub struct CubeReader {
	_file: hdf5::File,
	data: hdf5::Dataset,
	height: u32,
	width: u32,
	n_slices: u32,
	bpc: u8,
	sample_type: SampleType,
}

impl CubeReader {
	pub fn open(path: &Path) -> Result<CubeReader> {
		let file = hdf5::File::open(path).with_context(|| format!("failed to open cube file {path:?}"))?;

		let read_scalar = |name: &str| -> Result<i64> {
			Ok(
				file
					.dataset(name)
					.with_context(|| format!("cube file {path:?} has no '{name}' dataset"))?
					.read_scalar::<i64>()?,
			)
		};
		let height = read_scalar("height")? as u32;
		let width = read_scalar("width")? as u32;
		let n_slices = read_scalar("nSlices")? as u32;
		let bpc = read_scalar("bpc")? as u8;
		ensure!(
			height > 0 && width > 0 && n_slices > 0,
			"cube file {path:?} has degenerate dimensions"
		);
		let sample_type = SampleType::from_bpc(bpc)?;

		let data = file
			.dataset("data")
			.with_context(|| format!("cube file {path:?} has no 'data' dataset"))?;

		Ok(CubeReader {
			_file: file,
			data,
			height,
			width,
			n_slices,
			bpc,
			sample_type,
		})
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn n_slices(&self) -> u32 {
		self.n_slices
	}

	pub fn bpc(&self) -> u8 {
		self.bpc
	}

	pub fn sample_type(&self) -> SampleType {
		self.sample_type
	}

	/// Read the `[bounds.rows(), bounds.cols(), range.len()]` window of the cube.
	pub fn read_slab(&self, bounds: &MaskBounds, range: &SliceRange) -> Result<Slab> {
		ensure!(
			bounds.row_hi <= self.height as usize && bounds.col_hi <= self.width as usize,
			"slab bounds exceed the cube extent"
		);
		ensure!(range.hi <= self.n_slices, "slice range exceeds the cube extent");

		if range.is_empty() {
			// zero-extent hyperslabs are not selectable, synthesize the window
			let empty = (bounds.rows(), bounds.cols(), 0);
			return Ok(match self.sample_type {
				SampleType::U8 => Slab::U8(Array3::zeros(empty)),
				SampleType::U16 => Slab::U16(Array3::zeros(empty)),
			});
		}

		let selection = s![
			bounds.row_lo..bounds.row_hi,
			bounds.col_lo..bounds.col_hi,
			range.lo as usize..range.hi as usize
		];
		Ok(match self.sample_type {
			SampleType::U8 => Slab::U8(self.data.read_slice::<u8, _, Ix3>(selection)?),
			SampleType::U16 => Slab::U16(self.data.read_slice::<u16, _, Ix3>(selection)?),
		})
	}
}
