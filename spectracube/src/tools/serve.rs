use anyhow::Result;
use spectracube::{config::Config, server};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Subcommand {
	/// Path to a YAML configuration file.
	#[arg(short = 'c', long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Serve via socket ip. Default: 0.0.0.0
	#[arg(short = 'i', long)]
	pub ip: Option<String>,

	/// Serve via port. Default: 8080
	#[arg(short, long)]
	pub port: Option<u16>,
}

/// Configuration file values, overridden by command-line flags.
fn load_config(arguments: &Subcommand) -> Result<Config> {
	let mut config = match &arguments.config {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};

	if let Some(ip) = &arguments.ip {
		config.server.ip = ip.clone();
	}
	if let Some(port) = arguments.port {
		config.server.port = port;
	}
	Ok(config)
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let config = load_config(arguments)?;
	server::run(&config).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn cli_flags_override_the_config_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.yml");
		fs::write(&path, "server:\n  port: 9000\n  ip: 10.0.0.1\n").unwrap();

		let arguments = Subcommand {
			config: Some(path),
			ip: Some("127.0.0.1".to_string()),
			port: None,
		};
		let config = load_config(&arguments).unwrap();
		assert_eq!(config.server.ip, "127.0.0.1");
		assert_eq!(config.server.port, 9000);
	}

	#[test]
	fn no_arguments_yield_the_defaults() {
		let arguments = Subcommand {
			config: None,
			ip: None,
			port: None,
		};
		let config = load_config(&arguments).unwrap();
		assert_eq!(config, Config::default());
	}

	#[test]
	fn a_broken_config_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.yml");
		fs::write(&path, "server:\n  bort: 9000\n").unwrap();

		let arguments = Subcommand {
			config: Some(path),
			ip: None,
			port: None,
		};
		assert!(load_config(&arguments).is_err());
	}
}
