//! Records of the metadata store that the conversion pipeline mutates.

use serde::{Deserialize, Serialize};

/// Conversion state of an uploaded file.
///
/// The pipeline drives `UPLOADED → CONVERTING → {CONVERTED, ERROR_CONVERSION}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadedFileStatus {
	#[serde(rename = "UPLOADED")]
	Uploaded,
	#[serde(rename = "CONVERTING")]
	Converting,
	#[serde(rename = "CONVERTED")]
	Converted,
	#[serde(rename = "ERROR_CONVERSION")]
	ErrorConversion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
	pub id: u64,
	pub path: String,
	pub status: UploadedFileStatus,
	#[serde(default)]
	pub size: u64,
}

/// Companion record of a conversion; carries the progress percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionFile {
	pub id: u64,
	#[serde(rename = "uploadedFile")]
	pub uploaded_file: u64,
	pub image: u64,
	#[serde(default)]
	pub progress: u8,
}
