//! The profile-query engine.
//!
//! A query starts from an opened cube, a geometry in Cartesian image
//! coordinates and a normalized slice range. [`extract`] prepares the
//! geometry, rasterizes it, reads the bounding-box slab from the cube and
//! clips the mask to it; the other functions reduce the extraction into the
//! four query shapes (raw profiles, per-point stats, projections and
//! projection images).
//!
//! Per-point results are emitted in row-major order over the mask bounding
//! box; this ordering is a public contract.

use crate::cube::CubeReader;
use anyhow::{Context, Result};
use geo_types::Geometry;
use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma};
use ndarray::Array2;
use serde::Serialize;
use spectracube_core::{Reduction, SampleType, Slab, SliceRange};
use spectracube_geometry::{
	cartesian_indexes, clip_mask, mask_bounds, prepare_geometry, rasterize, MaskBounds,
};
use std::io::Cursor;

/// Everything read from the cube for one query.
pub struct Extraction {
	pub slab: Slab,
	/// Mask clipped to the bounding box, same rows/cols as the slab.
	pub mask: Array2<bool>,
	pub bounds: MaskBounds,
	/// Cartesian `(x, y)` of every masked cell, in row-major order.
	pub points: Vec<(u32, u32)>,
	/// True when the prepared query geometry was a single point.
	pub single_point: bool,
}

/// Rasterize the geometry against the cube and read the masked slab.
///
/// Returns `None` when the geometry covers no pixel (empty or entirely
/// outside the image); callers answer such queries with an empty result.
pub fn extract(reader: &CubeReader, geometry: &Geometry<f64>, range: &SliceRange) -> Result<Option<Extraction>> {
	let (height, width) = (reader.height(), reader.width());
	let prepared = prepare_geometry(height, width, geometry)?;
	let mask = rasterize(&prepared, height, width);
	if !mask.iter().any(|&set| set) {
		return Ok(None);
	}
	let bounds = mask_bounds(&mask)?;
	let slab = reader.read_slab(&bounds, range)?;
	let points = cartesian_indexes(height, &mask);
	let mask = clip_mask(&mask, &bounds);
	Ok(Some(Extraction {
		slab,
		mask,
		bounds,
		points,
		single_point: matches!(prepared, Geometry::Point(_)),
	}))
}

/// One masked pixel and its spectral vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointProfile {
	pub point: [u32; 2],
	pub profile: Vec<u16>,
}

/// One masked pixel and the reductions of its spectral vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointStats {
	pub point: [u32; 2],
	pub min: u16,
	pub max: u16,
	pub average: f64,
}

/// The spectral vector under every masked cell.
pub fn raw_profiles(extraction: &Extraction) -> Vec<PointProfile> {
	collect_masked(extraction, |slab, row, col| slab.profile_at(row, col))
		.into_iter()
		.map(|(point, profile)| PointProfile { point, profile })
		.collect()
}

/// Min/max/mean of the spectral vector under every masked cell.
pub fn point_stats(extraction: &Extraction) -> Vec<PointStats> {
	collect_masked(extraction, |slab, row, col| {
		let profile = slab.profile_at(row, col);
		let min = profile.iter().copied().min().unwrap_or(0);
		let max = profile.iter().copied().max().unwrap_or(0);
		let average = if profile.is_empty() {
			0.0
		} else {
			profile.iter().map(|&v| f64::from(v)).sum::<f64>() / profile.len() as f64
		};
		(min, max, average)
	})
	.into_iter()
	.map(|(point, (min, max, average))| PointStats {
		point,
		min,
		max,
		average,
	})
	.collect()
}

/// The 2-D projection of the slab's spectral axis.
pub fn projection_values(extraction: &Extraction, reduction: Reduction) -> Array2<f64> {
	extraction.slab.project(reduction)
}

/// Encode the masked projection as an image.
///
/// The projection is cast to the cube's element type by truncation and
/// pixels outside the mask are zeroed. The result is encoded in the requested
/// format, falling back to PNG for 16-bit cubes or unknown formats. Returns
/// the encoded bytes and their mime type.
pub fn projection_image(
	extraction: &Extraction,
	reduction: Reduction,
	requested_format: &str,
	bpc: u8,
) -> Result<(Vec<u8>, &'static str)> {
	let projection = extraction.slab.project(reduction);
	let (rows, cols, _) = extraction.slab.dim();

	let format = if bpc > 8 || !matches!(requested_format, "jpg" | "png") {
		"png"
	} else {
		requested_format
	};
	let encoder_format = if format == "jpg" {
		ImageFormat::Jpeg
	} else {
		ImageFormat::Png
	};

	let mut buffer = Cursor::new(Vec::new());
	match extraction.slab.sample_type() {
		SampleType::U8 => {
			let image = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
				let (row, col) = (y as usize, x as usize);
				let value = if extraction.mask[[row, col]] {
					projection[[row, col]] as u8
				} else {
					0
				};
				Luma([value])
			});
			DynamicImage::ImageLuma8(image)
				.write_to(&mut buffer, encoder_format)
				.context("failed to encode the projection image")?;
		}
		SampleType::U16 => {
			let image = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(cols as u32, rows as u32, |x, y| {
				let (row, col) = (y as usize, x as usize);
				let value = if extraction.mask[[row, col]] {
					projection[[row, col]] as u16
				} else {
					0
				};
				Luma([value])
			});
			DynamicImage::ImageLuma16(image)
				.write_to(&mut buffer, encoder_format)
				.context("failed to encode the projection image")?;
		}
	}

	let mime = if format == "jpg" { "image/jpeg" } else { "image/png" };
	Ok((buffer.into_inner(), mime))
}

fn collect_masked<T>(
	extraction: &Extraction,
	mut value: impl FnMut(&Slab, usize, usize) -> T,
) -> Vec<([u32; 2], T)> {
	let mut points = extraction.points.iter();
	let mut result = Vec::with_capacity(extraction.points.len());
	for ((row, col), &set) in extraction.mask.indexed_iter() {
		if !set {
			continue;
		}
		let &(x, y) = points.next().expect("one Cartesian point per masked cell");
		result.push(([x, y], value(&extraction.slab, row, col)));
	}
	result
}

#[cfg(test)]
mod tests;
