use crate::types::{CompanionFile, ImageMeta, SliceDescriptor, UploadedFile};
use anyhow::Result;

/// Access to the metadata store.
///
/// Updates return `Ok(None)` when the store refuses the update transiently
/// (the caller may retry); hard failures are returned as errors and abort any
/// retry loop.
pub trait MetadataStoreTrait: Send + Sync {
	fn fetch_uploaded_file(&self, id: u64) -> Result<UploadedFile>;
	fn update_uploaded_file(&self, file: &UploadedFile) -> Result<Option<UploadedFile>>;

	fn fetch_companion_file(&self, id: u64) -> Result<CompanionFile>;
	fn update_companion_file(&self, file: &CompanionFile) -> Result<Option<CompanionFile>>;

	fn fetch_image(&self, id: u64) -> Result<ImageMeta>;

	/// All slice descriptors of an image, one per value of its spectral axis.
	fn fetch_slices(&self, image_id: u64) -> Result<Vec<SliceDescriptor>>;
}
