//! Metadata of an upstream multi-slice microscopy image.
//!
//! The spectral dimension of an image is the first of channel, z-stack and
//! time that has more than one value. Images where all three equal 1 are
//! plain 2-D images and cannot be converted into a profile cube.

use serde::{Deserialize, Serialize};

/// Axis of a multi-slice image along which spectral profiles are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralDimension {
	Channel,
	ZStack,
	Time,
}

/// Descriptor of an upstream image, as served by the metadata store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
	pub id: u64,
	pub width: u32,
	pub height: u32,
	pub channels: u32,
	pub depth: u32,
	pub duration: u32,
	#[serde(rename = "bitPerSample")]
	pub bit_per_sample: Option<u8>,
	#[serde(rename = "originalFilename")]
	pub original_filename: String,
}

impl ImageMeta {
	/// The first dimension with more than one value, or `None` for 2-D images.
	pub fn spectral_dimension(&self) -> Option<SpectralDimension> {
		if self.channels > 1 {
			Some(SpectralDimension::Channel)
		} else if self.depth > 1 {
			Some(SpectralDimension::ZStack)
		} else if self.duration > 1 {
			Some(SpectralDimension::Time)
		} else {
			None
		}
	}

	/// Bits per channel, defaulting to 8 when the upstream image does not say.
	pub fn bpc(&self) -> u8 {
		self.bit_per_sample.unwrap_or(8)
	}
}
