use super::*;
use crate::cube::CubeWriter;
use ndarray::Array2;
use rstest::rstest;
use spectracube_core::TileData;
use spectracube_geometry::parse_wkt;
use std::path::{Path, PathBuf};

/// 3x3 cube with 2 slices, pixel value = 10*rank + row + col.
fn gradient_cube(dir: &Path) -> PathBuf {
	let path = dir.join("gradient.hdf5");
	let mut cube = CubeWriter::create(&path, 3, 3, 2, 8, 512).unwrap();
	for rank in 0..2u32 {
		let tile = TileData::U8(Array2::from_shape_fn((3, 3), |(r, c)| (10 * rank as usize + r + c) as u8));
		cube.write_tile(0, 0, rank, &tile).unwrap();
	}
	cube.close().unwrap();
	path
}

/// 2x2 cube with 3 slices, pixel value = rank + 1.
fn layered_cube(dir: &Path, bpc: u8) -> PathBuf {
	let path = dir.join(format!("layered-{bpc}.hdf5"));
	let mut cube = CubeWriter::create(&path, 2, 2, 3, bpc, 512).unwrap();
	for rank in 0..3u32 {
		let tile = match bpc {
			0..=8 => TileData::U8(Array2::from_elem((2, 2), (rank + 1) as u8)),
			_ => TileData::U16(Array2::from_elem((2, 2), (rank + 1) as u16)),
		};
		cube.write_tile(0, 0, rank, &tile).unwrap();
	}
	cube.close().unwrap();
	path
}

fn full_range(reader: &CubeReader) -> SliceRange {
	SliceRange::full(reader.n_slices())
}

#[test]
fn point_query_returns_a_single_profile() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&gradient_cube(dir.path())).unwrap();
	let geometry = parse_wkt("POINT(0 2)").unwrap();

	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();
	assert!(extraction.single_point);

	let profiles = raw_profiles(&extraction);
	assert_eq!(
		profiles,
		vec![PointProfile {
			point: [0, 2],
			profile: vec![0, 10],
		}]
	);
}

#[test]
fn full_image_query_emits_row_major_profiles() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&gradient_cube(dir.path())).unwrap();
	let geometry = parse_wkt("POLYGON((0 0, 3 0, 3 3, 0 3, 0 0))").unwrap();

	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();
	assert!(!extraction.single_point);
	assert_eq!(extraction.bounds.rows(), 3);
	assert_eq!(extraction.bounds.cols(), 3);

	let profiles = raw_profiles(&extraction);
	assert_eq!(profiles.len(), 9);
	// row-major over matrix rows: first result is the top-left pixel (y = 2)
	assert_eq!(profiles[0].point, [0, 2]);
	assert_eq!(profiles[8].point, [2, 0]);
	for profile in &profiles {
		let [x, y] = profile.point;
		let row = 2 - y as usize;
		let col = x as usize;
		assert_eq!(profile.profile, vec![(row + col) as u16, (10 + row + col) as u16]);
	}
}

#[test]
fn stats_reduce_each_profile() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&gradient_cube(dir.path())).unwrap();
	let geometry = parse_wkt("POINT(2 0)").unwrap();

	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();
	let stats = point_stats(&extraction);
	// matrix cell (2,2): profile [4, 14]
	assert_eq!(
		stats,
		vec![PointStats {
			point: [2, 0],
			min: 4,
			max: 14,
			average: 9.0,
		}]
	);
}

#[test]
fn slice_subrange_limits_the_profile() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&layered_cube(dir.path(), 8)).unwrap();
	let geometry = parse_wkt("POINT(1 0)").unwrap();
	let range = SliceRange::normalize(Some(1), Some(2), reader.n_slices());

	let extraction = extract(&reader, &geometry, &range).unwrap().unwrap();
	let profiles = raw_profiles(&extraction);
	assert_eq!(
		profiles,
		vec![PointProfile {
			point: [1, 0],
			profile: vec![2],
		}]
	);
}

#[test]
fn geometry_outside_the_image_extracts_nothing() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&gradient_cube(dir.path())).unwrap();
	let geometry = parse_wkt("POINT(10 10)").unwrap();
	assert!(extract(&reader, &geometry, &full_range(&reader)).unwrap().is_none());

	let geometry = parse_wkt("POLYGON((5 5, 9 5, 9 9, 5 9, 5 5))").unwrap();
	assert!(extract(&reader, &geometry, &full_range(&reader)).unwrap().is_none());
}

#[test]
fn max_projection_image_is_uniform() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&layered_cube(dir.path(), 8)).unwrap();
	let geometry = parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();

	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();
	let (bytes, mime) = projection_image(&extraction, Reduction::Max, "png", reader.bpc()).unwrap();
	assert_eq!(mime, "image/png");

	let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
		.unwrap()
		.to_luma8();
	assert_eq!(decoded.dimensions(), (2, 2));
	assert!(decoded.pixels().all(|p| p.0 == [3]));
}

#[rstest]
#[case::min(Reduction::Min, 1.0)]
#[case::max(Reduction::Max, 3.0)]
#[case::mean(Reduction::Mean, 2.0)]
fn projection_values_dispatch_all_reductions(#[case] reduction: Reduction, #[case] expected: f64) {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&layered_cube(dir.path(), 8)).unwrap();
	let geometry = parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();

	let projection = projection_values(&extraction, reduction);
	assert!(projection.iter().all(|&v| v == expected));
}

#[test]
fn mean_projection_truncates_to_the_element_type() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("two.hdf5");
	let mut cube = CubeWriter::create(&path, 1, 1, 2, 8, 512).unwrap();
	cube.write_tile(0, 0, 0, &TileData::U8(Array2::from_elem((1, 1), 1))).unwrap();
	cube.write_tile(0, 0, 1, &TileData::U8(Array2::from_elem((1, 1), 2))).unwrap();
	cube.close().unwrap();

	let reader = CubeReader::open(&path).unwrap();
	let geometry = parse_wkt("POINT(0 0)").unwrap();
	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();

	// mean 1.5 is stored as 1 in the 8-bit image
	let (bytes, _) = projection_image(&extraction, Reduction::Mean, "png", reader.bpc()).unwrap();
	let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
		.unwrap()
		.to_luma8();
	assert_eq!(decoded.get_pixel(0, 0).0, [1]);
}

#[test]
fn sixteen_bit_cubes_always_encode_png() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&layered_cube(dir.path(), 16)).unwrap();
	let geometry = parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();

	// jpg was requested but 16-bit data forces PNG
	let (bytes, mime) = projection_image(&extraction, Reduction::Max, "jpg", reader.bpc()).unwrap();
	assert_eq!(mime, "image/png");
	let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
		.unwrap()
		.to_luma16();
	assert!(decoded.pixels().all(|p| p.0 == [3]));
}

#[test]
fn masked_pixels_outside_the_geometry_are_zero() {
	let dir = tempfile::tempdir().unwrap();
	let reader = CubeReader::open(&gradient_cube(dir.path())).unwrap();
	// L-shaped geometry: the top-right corner of its bounding box is unmasked
	let geometry = parse_wkt("POLYGON((0 0, 3 0, 3 1, 1 1, 1 3, 0 3, 0 0))").unwrap();

	let extraction = extract(&reader, &geometry, &full_range(&reader)).unwrap().unwrap();
	let (bytes, _) = projection_image(&extraction, Reduction::Max, "png", reader.bpc()).unwrap();
	let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
		.unwrap()
		.to_luma8();
	assert_eq!(decoded.dimensions(), (3, 3));
	// matrix (0,1) is inside the bounding box but outside the mask
	assert_eq!(decoded.get_pixel(1, 0).0, [0]);
	// matrix (2,2) is masked: max(4, 14) = 14
	assert_eq!(decoded.get_pixel(2, 2).0, [14]);
}
