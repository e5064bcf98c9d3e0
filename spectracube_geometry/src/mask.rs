//! Mask bounding boxes and Cartesian indexes of masked pixels.

use anyhow::{bail, Result};
use ndarray::{s, Array2};

/// Smallest half-open rectangle `[row_lo, row_hi) × [col_lo, col_hi)`
/// containing every true cell of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskBounds {
	pub row_lo: usize,
	pub row_hi: usize,
	pub col_lo: usize,
	pub col_hi: usize,
}

impl MaskBounds {
	pub fn rows(&self) -> usize {
		self.row_hi - self.row_lo
	}

	pub fn cols(&self) -> usize {
		self.col_hi - self.col_lo
	}
}

/// Bounding box of the true cells; fails when the mask has none.
pub fn mask_bounds(mask: &Array2<bool>) -> Result<MaskBounds> {
	let mut bounds: Option<MaskBounds> = None;
	for ((row, col), &set) in mask.indexed_iter() {
		if !set {
			continue;
		}
		bounds = Some(match bounds {
			None => MaskBounds {
				row_lo: row,
				row_hi: row + 1,
				col_lo: col,
				col_hi: col + 1,
			},
			Some(b) => MaskBounds {
				row_lo: b.row_lo.min(row),
				row_hi: b.row_hi.max(row + 1),
				col_lo: b.col_lo.min(col),
				col_hi: b.col_hi.max(col + 1),
			},
		});
	}
	match bounds {
		Some(b) => Ok(b),
		None => bail!("mask has no true cell"),
	}
}

/// The `[row_lo:row_hi, col_lo:col_hi]` window of a mask.
pub fn clip_mask(mask: &Array2<bool>, bounds: &MaskBounds) -> Array2<bool> {
	mask
		.slice(s![bounds.row_lo..bounds.row_hi, bounds.col_lo..bounds.col_hi])
		.to_owned()
}

/// The true cells of a mask in row-major order, reported as Cartesian
/// `(x = col, y = H - 1 - row)` pairs.
///
/// This is the order in which per-point query results are emitted.
pub fn cartesian_indexes(height: u32, mask: &Array2<bool>) -> Vec<(u32, u32)> {
	mask
		.indexed_iter()
		.filter(|&(_, &set)| set)
		.map(|((row, col), _)| (col as u32, height - 1 - row as u32))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mask_with(cells: &[(usize, usize)], rows: usize, cols: usize) -> Array2<bool> {
		let mut mask = Array2::from_elem((rows, cols), false);
		for &cell in cells {
			mask[cell] = true;
		}
		mask
	}

	#[test]
	fn bounds_cover_every_true_cell() {
		let mask = mask_with(&[(1, 2), (3, 0), (2, 4)], 5, 5);
		let bounds = mask_bounds(&mask).unwrap();
		assert_eq!(
			bounds,
			MaskBounds {
				row_lo: 1,
				row_hi: 4,
				col_lo: 0,
				col_hi: 5
			}
		);
		assert_eq!(bounds.rows(), 3);
		assert_eq!(bounds.cols(), 5);
	}

	#[test]
	fn empty_mask_has_no_bounds() {
		let mask = Array2::from_elem((3, 3), false);
		assert!(mask_bounds(&mask).is_err());
	}

	#[test]
	fn clipping_keeps_the_window() {
		let mask = mask_with(&[(1, 1), (2, 2)], 4, 4);
		let bounds = mask_bounds(&mask).unwrap();
		let clipped = clip_mask(&mask, &bounds);
		assert_eq!(clipped.dim(), (2, 2));
		assert!(clipped[[0, 0]]);
		assert!(clipped[[1, 1]]);
		assert!(!clipped[[0, 1]]);
	}

	#[test]
	fn cartesian_indexes_flip_rows_and_keep_row_major_order() {
		let mask = mask_with(&[(0, 1), (0, 2), (2, 0)], 3, 3);
		assert_eq!(cartesian_indexes(3, &mask), vec![(1, 2), (2, 2), (0, 0)]);
	}
}
