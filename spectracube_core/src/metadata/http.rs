//! Blocking REST client for the metadata store.

use crate::metadata::MetadataStoreTrait;
use crate::types::{CompanionFile, ImageMeta, SliceDescriptor, UploadedFile};
use anyhow::{ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Metadata store reached over HTTP.
///
/// Fetch failures are hard errors. Update responses with a non-success status
/// are reported as transient refusals (`Ok(None)`) so callers can retry.
pub struct HttpMetadataStore {
	base_url: String,
	client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct CollectionPage<T> {
	collection: Vec<T>,
}

impl HttpMetadataStore {
	pub fn new(base_url: &str) -> Result<HttpMetadataStore> {
		Ok(HttpMetadataStore {
			base_url: base_url.trim_end_matches('/').to_string(),
			client: reqwest::blocking::Client::builder()
				.build()
				.context("failed to build metadata HTTP client")?,
		})
	}

	fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
		let url = format!("{}{}", self.base_url, path);
		let response = self.client.get(&url).send().with_context(|| format!("GET {url}"))?;
		ensure!(
			response.status().is_success(),
			"metadata store answered {} for GET {url}",
			response.status()
		);
		response.json().with_context(|| format!("decoding response of GET {url}"))
	}

	fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<Option<T>> {
		let url = format!("{}{}", self.base_url, path);
		let response = self
			.client
			.put(&url)
			.json(body)
			.send()
			.with_context(|| format!("PUT {url}"))?;
		if !response.status().is_success() {
			log::debug!("metadata store refused PUT {url} with {}", response.status());
			return Ok(None);
		}
		let updated = response.json().with_context(|| format!("decoding response of PUT {url}"))?;
		Ok(Some(updated))
	}
}

impl MetadataStoreTrait for HttpMetadataStore {
	fn fetch_uploaded_file(&self, id: u64) -> Result<UploadedFile> {
		self.get(&format!("/api/uploadedfile/{id}.json"))
	}

	fn update_uploaded_file(&self, file: &UploadedFile) -> Result<Option<UploadedFile>> {
		self.put(&format!("/api/uploadedfile/{}.json", file.id), file)
	}

	fn fetch_companion_file(&self, id: u64) -> Result<CompanionFile> {
		self.get(&format!("/api/companionfile/{id}.json"))
	}

	fn update_companion_file(&self, file: &CompanionFile) -> Result<Option<CompanionFile>> {
		self.put(&format!("/api/companionfile/{}.json", file.id), file)
	}

	fn fetch_image(&self, id: u64) -> Result<ImageMeta> {
		self.get(&format!("/api/abstractimage/{id}.json"))
	}

	fn fetch_slices(&self, image_id: u64) -> Result<Vec<SliceDescriptor>> {
		let page: CollectionPage<SliceDescriptor> =
			self.get(&format!("/api/abstractimage/{image_id}/abstractslice.json"))?;
		Ok(page.collection)
	}
}
