use anyhow::{ensure, Result};
use std::fmt;

/// Element type of the cube, derived from the image's bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
	U8,
	U16,
}

impl SampleType {
	/// `U16` iff more than 8 bits per channel; `bpc` must be in `1..=16`.
	pub fn from_bpc(bpc: u8) -> Result<SampleType> {
		ensure!((1..=16).contains(&bpc), "bits per channel must be in 1..=16, got {bpc}");
		Ok(if bpc > 8 { SampleType::U16 } else { SampleType::U8 })
	}

	pub fn bytes_per_sample(&self) -> usize {
		match self {
			SampleType::U8 => 1,
			SampleType::U16 => 2,
		}
	}
}

impl fmt::Display for SampleType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SampleType::U8 => write!(f, "uint8"),
			SampleType::U16 => write!(f, "uint16"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn derived_from_bpc() {
		assert_eq!(SampleType::from_bpc(1).unwrap(), SampleType::U8);
		assert_eq!(SampleType::from_bpc(8).unwrap(), SampleType::U8);
		assert_eq!(SampleType::from_bpc(9).unwrap(), SampleType::U16);
		assert_eq!(SampleType::from_bpc(16).unwrap(), SampleType::U16);
		assert!(SampleType::from_bpc(0).is_err());
		assert!(SampleType::from_bpc(17).is_err());
	}
}
