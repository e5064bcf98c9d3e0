use anyhow::{Context, Result};
use image::ImageFormat;
use ndarray::Array2;
use spectracube_core::{SampleType, TileData};

/// Decode a grayscale PNG into a 2-D pixel array of the given sample type.
pub(crate) fn decode_gray_png(bytes: &[u8], sample_type: SampleType) -> Result<TileData> {
	let decoded =
		image::load_from_memory_with_format(bytes, ImageFormat::Png).context("failed to decode tile PNG")?;
	let (rows, cols) = (decoded.height() as usize, decoded.width() as usize);
	Ok(match sample_type {
		SampleType::U8 => TileData::U8(Array2::from_shape_vec((rows, cols), decoded.to_luma8().into_raw())?),
		SampleType::U16 => {
			TileData::U16(Array2::from_shape_vec((rows, cols), decoded.to_luma16().into_raw())?)
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
	use std::io::Cursor;

	fn png_bytes(image: DynamicImage) -> Vec<u8> {
		let mut buffer = Cursor::new(Vec::new());
		image.write_to(&mut buffer, ImageFormat::Png).unwrap();
		buffer.into_inner()
	}

	#[test]
	fn decodes_8_bit_gray() {
		let image = GrayImage::from_fn(3, 2, |x, y| Luma([(10 * y + x) as u8]));
		let TileData::U8(tile) = decode_gray_png(&png_bytes(DynamicImage::ImageLuma8(image)), SampleType::U8)
			.unwrap()
		else {
			panic!("expected a u8 tile");
		};
		assert_eq!(tile.dim(), (2, 3));
		assert_eq!(tile[[1, 2]], 12);
	}

	#[test]
	fn decodes_16_bit_gray() {
		let image = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(2, 2, |x, y| Luma([300 * y as u16 + x as u16]));
		let tile =
			decode_gray_png(&png_bytes(DynamicImage::ImageLuma16(image)), SampleType::U16).unwrap();
		let TileData::U16(tile) = tile else {
			panic!("expected a u16 tile");
		};
		assert_eq!(tile[[1, 0]], 300);
	}

	#[test]
	fn garbage_is_rejected() {
		assert!(decode_gray_png(b"not a png", SampleType::U8).is_err());
	}
}
