//! The HTTP query surface.
//!
//! Routes:
//! - `GET /`: service name and version
//! - `GET|POST /hdf5.json`: start a conversion in the background
//! - `GET|POST /profile.json`: raw spectral profiles under a geometry
//! - `GET|POST /profile/projections.json`: per-point min/max/mean
//! - `GET|POST /profile/{min,max,average}-projection.{format}`: 2-D
//!   projection image of the masked bounding box
//!
//! Query parameters may arrive in the query string (GET) or as form values
//! (POST), like the service this replaces accepted both. Missing or
//! malformed required parameters answer 400.

mod handlers;

use crate::config::Config;
use anyhow::{Context, Result};
use axum::{middleware, routing::get, Router};
use spectracube_container::{HttpTileSource, IngestParameters, TileSourceTrait};
use spectracube_core::metadata::{HttpMetadataStore, MetadataStoreTrait};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
	pub store: Arc<dyn MetadataStoreTrait>,
	pub source: Arc<dyn TileSourceTrait>,
	pub ingest: IngestParameters,
}

pub fn build_router(state: AppState) -> Router {
	Router::new()
		.route("/", get(handlers::root))
		.route(
			"/hdf5.json",
			get(handlers::start_ingest_query).post(handlers::start_ingest_form),
		)
		.route(
			"/profile.json",
			get(handlers::profile_raw_query).post(handlers::profile_raw_form),
		)
		.route(
			"/profile/projections.json",
			get(handlers::profile_stats_query).post(handlers::profile_stats_form),
		)
		.route(
			"/profile/{projection}",
			get(handlers::projection_query).post(handlers::projection_form),
		)
		.layer(middleware::from_fn(handlers::log_request))
		.with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(config: &Config) -> Result<()> {
	let state = AppState {
		store: Arc::new(HttpMetadataStore::new(&config.metadata.host)?),
		source: Arc::new(HttpTileSource::new()?),
		ingest: config.ingest.parameters(),
	};
	let router = build_router(state);

	let address = format!("{}:{}", config.server.ip, config.server.port);
	let listener = tokio::net::TcpListener::bind(&address)
		.await
		.with_context(|| format!("failed to bind {address}"))?;
	log::info!("listening on {address}");
	axum::serve(listener, router).await.context("server terminated")
}
