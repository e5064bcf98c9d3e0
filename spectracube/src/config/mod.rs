//! YAML configuration of the spectracube service.
//!
//! All sections are optional and default to sensible values. Example:
//!
//! ```yaml
//! server:
//!   ip: 0.0.0.0
//!   port: 8080
//!
//! metadata:
//!   host: http://core.example.org
//!
//! ingest:
//!   n_workers: 0            # 0 = cpu_count - 1
//!   tile_size: 512
//!   progress_update_period: 50
//!   write_queue_capacity: 512
//!   root: /data/cubes
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use spectracube_container::IngestParameters;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
	pub server: ServerConfig,
	pub metadata: MetadataConfig,
	pub ingest: IngestConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
	pub ip: String,
	pub port: u16,
}

impl Default for ServerConfig {
	fn default() -> Self {
		ServerConfig {
			ip: "0.0.0.0".to_string(),
			port: 8080,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MetadataConfig {
	/// Base URL of the metadata store.
	pub host: String,
}

impl Default for MetadataConfig {
	fn default() -> Self {
		MetadataConfig {
			host: "http://localhost:8090".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IngestConfig {
	pub n_workers: usize,
	pub tile_size: u32,
	pub progress_update_period: u64,
	pub write_queue_capacity: usize,
	pub root: PathBuf,
}

impl Default for IngestConfig {
	fn default() -> Self {
		let defaults = IngestParameters::default();
		IngestConfig {
			n_workers: defaults.n_workers,
			tile_size: defaults.tile_size,
			progress_update_period: defaults.progress_update_period,
			write_queue_capacity: defaults.write_queue_capacity,
			root: defaults.root,
		}
	}
}

impl IngestConfig {
	pub fn parameters(&self) -> IngestParameters {
		IngestParameters {
			n_workers: self.n_workers,
			tile_size: self.tile_size,
			progress_update_period: self.progress_update_period,
			write_queue_capacity: self.write_queue_capacity,
			root: self.root.clone(),
		}
	}
}

impl Config {
	pub fn from_string(yaml: &str) -> Result<Config> {
		serde_yaml_ng::from_str(yaml).context("failed to parse configuration")
	}

	pub fn from_path(path: &Path) -> Result<Config> {
		let yaml =
			fs::read_to_string(path).with_context(|| format!("failed to read configuration {path:?}"))?;
		Config::from_string(&yaml).with_context(|| format!("in configuration {path:?}"))
	}
}
