use anyhow::Result;
use spectracube_container::CubeReader;
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Subcommand {
	/// Profile cube file to inspect.
	pub cube: PathBuf,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let reader = CubeReader::open(&arguments.cube)?;
	println!("width:   {}", reader.width());
	println!("height:  {}", reader.height());
	println!("nSlices: {}", reader.n_slices());
	println!("bpc:     {}", reader.bpc());
	println!("type:    {}", reader.sample_type());
	Ok(())
}
