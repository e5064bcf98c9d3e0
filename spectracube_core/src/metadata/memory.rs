//! In-memory metadata store used by the test suites.

use crate::metadata::MetadataStoreTrait;
use crate::types::{CompanionFile, ImageMeta, SliceDescriptor, UploadedFile, UploadedFileStatus};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// A metadata store backed by hash maps.
///
/// Beyond the trait it records every status transition and progress value it
/// sees, and can be armed to refuse the next N updates transiently.
#[derive(Default)]
pub struct MemoryMetadataStore {
	inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
	uploaded_files: HashMap<u64, UploadedFile>,
	companion_files: HashMap<u64, CompanionFile>,
	images: HashMap<u64, ImageMeta>,
	slices: HashMap<u64, Vec<SliceDescriptor>>,
	transient_update_failures: u32,
	status_history: Vec<UploadedFileStatus>,
	progress_history: Vec<u8>,
}

impl MemoryMetadataStore {
	pub fn new() -> MemoryMetadataStore {
		MemoryMetadataStore::default()
	}

	pub fn insert_uploaded_file(&self, file: UploadedFile) {
		self.inner.lock().unwrap().uploaded_files.insert(file.id, file);
	}

	pub fn insert_companion_file(&self, file: CompanionFile) {
		self.inner.lock().unwrap().companion_files.insert(file.id, file);
	}

	pub fn insert_image(&self, image: ImageMeta) {
		self.inner.lock().unwrap().images.insert(image.id, image);
	}

	pub fn insert_slices(&self, image_id: u64, slices: Vec<SliceDescriptor>) {
		self.inner.lock().unwrap().slices.insert(image_id, slices);
	}

	/// Arm the store to answer the next `n` updates with a transient refusal.
	pub fn fail_next_updates(&self, n: u32) {
		self.inner.lock().unwrap().transient_update_failures = n;
	}

	pub fn uploaded_file(&self, id: u64) -> Option<UploadedFile> {
		self.inner.lock().unwrap().uploaded_files.get(&id).cloned()
	}

	pub fn companion_file(&self, id: u64) -> Option<CompanionFile> {
		self.inner.lock().unwrap().companion_files.get(&id).cloned()
	}

	/// Every status value written through `update_uploaded_file`, in order.
	pub fn status_history(&self) -> Vec<UploadedFileStatus> {
		self.inner.lock().unwrap().status_history.clone()
	}

	/// Every progress value written through `update_companion_file`, in order.
	pub fn progress_history(&self) -> Vec<u8> {
		self.inner.lock().unwrap().progress_history.clone()
	}
}

impl MetadataStoreTrait for MemoryMetadataStore {
	fn fetch_uploaded_file(&self, id: u64) -> Result<UploadedFile> {
		self
			.uploaded_file(id)
			.ok_or_else(|| anyhow!("no uploaded file with id {id}"))
	}

	fn update_uploaded_file(&self, file: &UploadedFile) -> Result<Option<UploadedFile>> {
		let mut inner = self.inner.lock().unwrap();
		if inner.transient_update_failures > 0 {
			inner.transient_update_failures -= 1;
			return Ok(None);
		}
		inner.status_history.push(file.status);
		inner.uploaded_files.insert(file.id, file.clone());
		Ok(Some(file.clone()))
	}

	fn fetch_companion_file(&self, id: u64) -> Result<CompanionFile> {
		self
			.companion_file(id)
			.ok_or_else(|| anyhow!("no companion file with id {id}"))
	}

	fn update_companion_file(&self, file: &CompanionFile) -> Result<Option<CompanionFile>> {
		let mut inner = self.inner.lock().unwrap();
		if inner.transient_update_failures > 0 {
			inner.transient_update_failures -= 1;
			return Ok(None);
		}
		inner.progress_history.push(file.progress);
		inner.companion_files.insert(file.id, file.clone());
		Ok(Some(file.clone()))
	}

	fn fetch_image(&self, id: u64) -> Result<ImageMeta> {
		let inner = self.inner.lock().unwrap();
		inner
			.images
			.get(&id)
			.cloned()
			.ok_or_else(|| anyhow!("no image with id {id}"))
	}

	fn fetch_slices(&self, image_id: u64) -> Result<Vec<SliceDescriptor>> {
		let inner = self.inner.lock().unwrap();
		inner
			.slices
			.get(&image_id)
			.cloned()
			.ok_or_else(|| anyhow!("no slices for image {image_id}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn uploaded_file() -> UploadedFile {
		UploadedFile {
			id: 1,
			path: "a/b.hdf5".to_string(),
			status: UploadedFileStatus::Uploaded,
			size: 0,
		}
	}

	#[test]
	fn updates_are_recorded() {
		let store = MemoryMetadataStore::new();
		let mut file = uploaded_file();
		store.insert_uploaded_file(file.clone());

		file.status = UploadedFileStatus::Converting;
		assert!(store.update_uploaded_file(&file).unwrap().is_some());
		assert_eq!(
			store.fetch_uploaded_file(1).unwrap().status,
			UploadedFileStatus::Converting
		);
		assert_eq!(store.status_history(), vec![UploadedFileStatus::Converting]);
	}

	#[test]
	fn armed_failures_are_transient() {
		let store = MemoryMetadataStore::new();
		let file = uploaded_file();
		store.insert_uploaded_file(file.clone());
		store.fail_next_updates(2);

		assert!(store.update_uploaded_file(&file).unwrap().is_none());
		assert!(store.update_uploaded_file(&file).unwrap().is_none());
		assert!(store.update_uploaded_file(&file).unwrap().is_some());
	}

	#[test]
	fn missing_records_are_errors() {
		let store = MemoryMetadataStore::new();
		assert!(store.fetch_uploaded_file(99).is_err());
		assert!(store.fetch_image(99).is_err());
		assert!(store.fetch_slices(99).is_err());
	}
}
