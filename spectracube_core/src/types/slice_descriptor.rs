use serde::{Deserialize, Serialize};

/// One 2-D layer of the cube at a fixed position along the spectral axis.
///
/// `rank` is authoritative for placement along the cube's third axis; it is
/// not assumed to equal the descriptor's position in the slice sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceDescriptor {
	pub rank: u32,
	pub channel: u32,
	#[serde(rename = "zStack")]
	pub z_stack: u32,
	pub time: u32,
	#[serde(rename = "imageServerUrl")]
	pub tile_source_url: String,
	pub path: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_upstream_field_names() {
		let slice: SliceDescriptor = serde_json::from_str(
			r#"{"rank":2,"channel":2,"zStack":0,"time":0,
			"imageServerUrl":"http://ims.example.org","path":"ab/cd/scan.ome.tif"}"#,
		)
		.unwrap();
		assert_eq!(slice.rank, 2);
		assert_eq!(slice.z_stack, 0);
		assert_eq!(slice.tile_source_url, "http://ims.example.org");
	}
}
