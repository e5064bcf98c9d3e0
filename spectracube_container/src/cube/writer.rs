use anyhow::{bail, ensure, Context, Result};
use ndarray::{s, Axis};
use spectracube_core::{SampleType, TileData};
use std::fs;
use std::path::{Path, PathBuf};

/// Write handle of a cube being materialized.
///
/// Not thread-safe: during ingest it is owned exclusively by the single
/// writer worker.
pub struct CubeWriter {
	_file: hdf5::File,
	data: hdf5::Dataset,
	path: PathBuf,
	sample_type: SampleType,
	height: u32,
	width: u32,
	n_slices: u32,
}

impl CubeWriter {
	/// Create the cube file, its parent directories, the four scalar datasets
	/// and the chunked `data` dataset.
	///
	/// Chunks are `[min(T, H), min(T, W), 1]` so that one `T×T×1` tile write
	/// touches a single chunk.
	pub fn create(
		path: &Path,
		height: u32,
		width: u32,
		n_slices: u32,
		bpc: u8,
		tile_size: u32,
	) -> Result<CubeWriter> {
		ensure!(height > 0 && width > 0, "cube dimensions must be > 0");
		ensure!(n_slices > 0, "cube must have at least one slice");
		let sample_type = SampleType::from_bpc(bpc)?;

		if let Some(parent) = path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)
					.with_context(|| format!("failed to create cube directory {parent:?}"))?;
			}
		}
		let file =
			hdf5::File::create(path).with_context(|| format!("failed to create cube file {path:?}"))?;

		file.new_dataset::<i64>().create("width")?.write_scalar(&i64::from(width))?;
		file.new_dataset::<i64>().create("height")?.write_scalar(&i64::from(height))?;
		file
			.new_dataset::<i64>()
			.create("nSlices")?
			.write_scalar(&i64::from(n_slices))?;
		file.new_dataset::<i64>().create("bpc")?.write_scalar(&i64::from(bpc))?;

		let shape = (height as usize, width as usize, n_slices as usize);
		let chunk = (
			tile_size.min(height) as usize,
			tile_size.min(width) as usize,
			1,
		);
		let data = match sample_type {
			SampleType::U8 => file.new_dataset::<u8>().chunk(chunk).shape(shape).create("data")?,
			SampleType::U16 => file.new_dataset::<u16>().chunk(chunk).shape(shape).create("data")?,
		};

		Ok(CubeWriter {
			_file: file,
			data,
			path: path.to_path_buf(),
			sample_type,
			height,
			width,
			n_slices,
		})
	}

	/// Place a tile at `[row_lo.., col_lo.., slice_rank]`.
	///
	/// The tile is written at the `h×w` shape it was delivered with; tiles at
	/// the right/bottom image edges are smaller than the nominal tile size.
	pub fn write_tile(&mut self, row_lo: u32, col_lo: u32, slice_rank: u32, tile: &TileData) -> Result<()> {
		let (rows, cols) = tile.dim();
		let (row_lo, col_lo) = (row_lo as usize, col_lo as usize);
		ensure!(
			row_lo + rows <= self.height as usize && col_lo + cols <= self.width as usize,
			"tile [{rows}x{cols}] at ({row_lo},{col_lo}) exceeds the cube extent"
		);
		ensure!(
			slice_rank < self.n_slices,
			"slice rank {slice_rank} out of range (cube has {} slices)",
			self.n_slices
		);

		let rank = slice_rank as usize;
		let selection = s![row_lo..row_lo + rows, col_lo..col_lo + cols, rank..rank + 1];
		match (self.sample_type, tile) {
			(SampleType::U8, TileData::U8(a)) => {
				self.data.write_slice(a.view().insert_axis(Axis(2)), selection)?;
			}
			(SampleType::U16, TileData::U16(a)) => {
				self.data.write_slice(a.view().insert_axis(Axis(2)), selection)?;
			}
			_ => bail!(
				"tile sample type {} does not match the cube's {}",
				tile.sample_type(),
				self.sample_type
			),
		}
		Ok(())
	}

	/// Size of the cube file on disk, in bytes.
	pub fn file_len(&self) -> Result<u64> {
		Ok(fs::metadata(&self.path)?.len())
	}

	/// Release the file.
	pub fn close(self) -> Result<()> {
		Ok(())
	}
}
