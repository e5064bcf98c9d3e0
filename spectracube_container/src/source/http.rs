//! Tile source reached over HTTP.
//!
//! One crop request per spec: `POST {tile_source_url}/image/{path}/window.png`
//! with a JSON body selecting the region, bit depth and the slice's channel,
//! z-stack and timepoint. The response body is a grayscale PNG.

use crate::source::{decode::decode_gray_png, TileSourceTrait};
use anyhow::{ensure, Context, Result};
use serde::Serialize;
use spectracube_core::{SampleType, TileData, TileGrid, TileSpec};

#[derive(Debug, Serialize)]
struct Region {
	left: u32,
	top: u32,
	width: u32,
	height: u32,
}

#[derive(Debug, Serialize)]
struct WindowRequest<'a> {
	region: Region,
	level: u32,
	bits: u8,
	colorspace: &'a str,
	channels: u32,
	z_slices: u32,
	timepoints: u32,
}

pub struct HttpTileSource {
	client: reqwest::blocking::Client,
}

impl HttpTileSource {
	pub fn new() -> Result<HttpTileSource> {
		Ok(HttpTileSource {
			client: reqwest::blocking::Client::builder()
				.build()
				.context("failed to build tile source HTTP client")?,
		})
	}
}

fn window_request(spec: &TileSpec, grid: &TileGrid, bpc: u8) -> WindowRequest<'static> {
	WindowRequest {
		region: Region {
			left: grid.left(spec.x),
			top: grid.top(spec.y),
			width: grid.tile_width(spec.x),
			height: grid.tile_height(spec.y),
		},
		level: 0,
		bits: bpc,
		colorspace: "GRAY",
		channels: spec.slice.channel,
		z_slices: spec.slice.z_stack,
		timepoints: spec.slice.time,
	}
}

impl TileSourceTrait for HttpTileSource {
	fn fetch(&self, spec: &TileSpec, grid: &TileGrid, bpc: u8) -> Result<TileData> {
		let url = format!("{}/image/{}/window.png", spec.slice.tile_source_url, spec.slice.path);
		let response = self
			.client
			.post(&url)
			.json(&window_request(spec, grid, bpc))
			.send()
			.with_context(|| format!("failed to fetch tile {spec} from {url}"))?;
		ensure!(
			response.status().is_success(),
			"tile source answered {} for tile {spec} ({url})",
			response.status()
		);
		let bytes = response
			.bytes()
			.with_context(|| format!("failed to read tile {spec} from {url}"))?;
		decode_gray_png(&bytes, SampleType::from_bpc(bpc)?).with_context(|| format!("tile {spec} ({url})"))
	}
}
