use anyhow::Result;
use spectracube::config::Config;
use spectracube_container::{ingest, HttpTileSource};
use spectracube_core::metadata::{HttpMetadataStore, MetadataStoreTrait};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Subcommand {
	/// Id of the uploaded file to convert.
	pub uploaded_file: u64,

	/// Id of the image the uploaded file belongs to.
	pub image: u64,

	/// Id of the companion file receiving progress updates.
	pub companion_file: u64,

	/// Path to a YAML configuration file.
	#[arg(short = 'c', long, value_name = "FILE")]
	pub config: Option<PathBuf>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let config = match &arguments.config {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};

	let store = HttpMetadataStore::new(&config.metadata.host)?;
	let source = HttpTileSource::new()?;

	let uploaded_file = store.fetch_uploaded_file(arguments.uploaded_file)?;
	let image = store.fetch_image(arguments.image)?;
	let slices = store.fetch_slices(arguments.image)?;
	let companion_file = store.fetch_companion_file(arguments.companion_file)?;

	ingest(
		&store,
		&source,
		uploaded_file,
		&image,
		slices,
		companion_file,
		&config.ingest.parameters(),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn an_unreachable_metadata_store_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let config = dir.path().join("config.yml");
		// port 1 is never served; the first fetch fails fast
		fs::write(&config, "metadata:\n  host: http://127.0.0.1:1\n").unwrap();

		let arguments = Subcommand {
			uploaded_file: 1,
			image: 2,
			companion_file: 3,
			config: Some(config),
		};
		assert!(run(&arguments).is_err());
	}

	#[test]
	fn a_missing_config_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let arguments = Subcommand {
			uploaded_file: 1,
			image: 2,
			companion_file: 3,
			config: Some(dir.path().join("nope.yml")),
		};
		assert!(run(&arguments).is_err());
	}
}
