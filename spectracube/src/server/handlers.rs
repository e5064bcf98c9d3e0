//! HTTP handlers and small response helpers.

use super::AppState;
use anyhow::Result;
use axum::{
	body::Body,
	extract::{Form, Path, Query, Request, State},
	http::header,
	middleware::Next,
	response::Response,
};
use geo_types::Geometry;
use serde::Deserialize;
use spectracube_container::{
	extract, ingest, point_stats, projection_image, raw_profiles, CubeReader,
};
use spectracube_core::{Reduction, SliceRange};
use spectracube_geometry::parse_wkt;
use std::path::PathBuf;
use std::time::Instant;

/// Log one line per request: method, path, status and duration.
pub async fn log_request(request: Request, next: Next) -> Response {
	let method = request.method().clone();
	let path = request.uri().path().to_string();
	let start = Instant::now();
	let response = next.run(request).await;
	log::info!(
		"{method} {path} -> {} in {:.1?}",
		response.status().as_u16(),
		start.elapsed()
	);
	response
}

pub async fn root() -> Response {
	ok_json(&format!(
		r#"{{"service":"{}","version":"{}"}}"#,
		env!("CARGO_PKG_NAME"),
		env!("CARGO_PKG_VERSION")
	))
}

// --- profile queries ---------------------------------------------------------

/// Common parameters of the profile endpoints, from query string or form.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileParams {
	fif: Option<String>,
	location: Option<String>,
	#[serde(rename = "minSlice")]
	min_slice: Option<i64>,
	#[serde(rename = "maxSlice")]
	max_slice: Option<i64>,
}

struct ProfileQuery {
	path: PathBuf,
	geometry: Geometry<f64>,
	min_slice: Option<i64>,
	max_slice: Option<i64>,
}

impl ProfileQuery {
	fn parse(params: &ProfileParams) -> Option<ProfileQuery> {
		let path = PathBuf::from(params.fif.as_deref()?);
		let geometry = parse_wkt(params.location.as_deref()?).ok()?;
		Some(ProfileQuery {
			path,
			geometry,
			min_slice: params.min_slice,
			max_slice: params.max_slice,
		})
	}
}

pub async fn profile_raw_query(Query(params): Query<ProfileParams>) -> Response {
	profile_raw(params).await
}

pub async fn profile_raw_form(Form(params): Form<ProfileParams>) -> Response {
	profile_raw(params).await
}

async fn profile_raw(params: ProfileParams) -> Response {
	let Some(query) = ProfileQuery::parse(&params) else {
		return error_400("missing or malformed 'fif' or 'location'");
	};
	let result = tokio::task::spawn_blocking(move || -> Result<String> {
		let reader = CubeReader::open(&query.path)?;
		let range = SliceRange::normalize(query.min_slice, query.max_slice, reader.n_slices());
		let Some(extraction) = extract(&reader, &query.geometry, &range)? else {
			return Ok("[]".to_string());
		};
		let profiles = raw_profiles(&extraction);
		// a single point answers with the object itself, not a one-element list
		if extraction.single_point && profiles.len() == 1 {
			Ok(serde_json::to_string(&profiles[0])?)
		} else {
			Ok(serde_json::to_string(&profiles)?)
		}
	})
	.await;
	respond_json(result)
}

pub async fn profile_stats_query(Query(params): Query<ProfileParams>) -> Response {
	profile_stats(params).await
}

pub async fn profile_stats_form(Form(params): Form<ProfileParams>) -> Response {
	profile_stats(params).await
}

async fn profile_stats(params: ProfileParams) -> Response {
	let Some(query) = ProfileQuery::parse(&params) else {
		return error_400("missing or malformed 'fif' or 'location'");
	};
	let result = tokio::task::spawn_blocking(move || -> Result<String> {
		let reader = CubeReader::open(&query.path)?;
		let range = SliceRange::normalize(query.min_slice, query.max_slice, reader.n_slices());
		let Some(extraction) = extract(&reader, &query.geometry, &range)? else {
			return Ok("[]".to_string());
		};
		Ok(serde_json::to_string(&point_stats(&extraction))?)
	})
	.await;
	respond_json(result)
}

pub async fn projection_query(Path(projection): Path<String>, Query(params): Query<ProfileParams>) -> Response {
	projection_endpoint(projection, params).await
}

pub async fn projection_form(Path(projection): Path<String>, Form(params): Form<ProfileParams>) -> Response {
	projection_endpoint(projection, params).await
}

async fn projection_endpoint(projection: String, params: ProfileParams) -> Response {
	let Some((reduction, format)) = parse_projection(&projection) else {
		return error_404();
	};
	let Some(query) = ProfileQuery::parse(&params) else {
		return error_400("missing or malformed 'fif' or 'location'");
	};
	let result = tokio::task::spawn_blocking(move || -> Result<Option<(Vec<u8>, &'static str)>> {
		let reader = CubeReader::open(&query.path)?;
		let range = SliceRange::normalize(query.min_slice, query.max_slice, reader.n_slices());
		let Some(extraction) = extract(&reader, &query.geometry, &range)? else {
			return Ok(None);
		};
		Ok(Some(projection_image(&extraction, reduction, &format, reader.bpc())?))
	})
	.await;
	match result {
		Ok(Ok(Some((bytes, mime)))) => ok_bytes(bytes, mime),
		Ok(Ok(None)) => error_404(),
		Ok(Err(error)) => {
			log::warn!("projection query failed: {error:#}");
			error_500()
		}
		Err(error) => {
			log::warn!("projection query panicked: {error}");
			error_500()
		}
	}
}

/// `"max-projection.png"` → `(Reduction::Max, "png")`.
fn parse_projection(name: &str) -> Option<(Reduction, String)> {
	let (stem, format) = name.rsplit_once('.')?;
	let reduction = match stem {
		"min-projection" => Reduction::Min,
		"max-projection" => Reduction::Max,
		"average-projection" => Reduction::Mean,
		_ => return None,
	};
	Some((reduction, format.to_string()))
}

// --- ingest ------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct IngestParams {
	#[serde(rename = "uploadedFile")]
	uploaded_file: Option<u64>,
	image: Option<u64>,
	#[serde(rename = "companionFile")]
	companion_file: Option<u64>,
}

pub async fn start_ingest_query(State(state): State<AppState>, Query(params): Query<IngestParams>) -> Response {
	start_ingest(state, params).await
}

pub async fn start_ingest_form(State(state): State<AppState>, Form(params): Form<IngestParams>) -> Response {
	start_ingest(state, params).await
}

async fn start_ingest(state: AppState, params: IngestParams) -> Response {
	let (Some(uploaded_file_id), Some(image_id), Some(companion_file_id)) =
		(params.uploaded_file, params.image, params.companion_file)
	else {
		return error_400("missing 'uploadedFile', 'image' or 'companionFile'");
	};

	let store = state.store.clone();
	let fetched = tokio::task::spawn_blocking(move || {
		let uploaded_file = store.fetch_uploaded_file(uploaded_file_id)?;
		let image = store.fetch_image(image_id)?;
		let slices = store.fetch_slices(image_id)?;
		let companion_file = store.fetch_companion_file(companion_file_id)?;
		anyhow::Ok((uploaded_file, image, slices, companion_file))
	})
	.await;

	let (uploaded_file, image, slices, companion_file) = match fetched {
		Ok(Ok(records)) => records,
		Ok(Err(error)) => {
			log::warn!("cannot start conversion: {error:#}");
			return error_500();
		}
		Err(error) => {
			log::warn!("cannot start conversion: {error}");
			return error_500();
		}
	};

	// the conversion outlives the request, like the daemon thread it replaces
	let store = state.store.clone();
	let source = state.source.clone();
	let parameters = state.ingest.clone();
	std::thread::spawn(move || {
		if let Err(error) = ingest(
			store.as_ref(),
			source.as_ref(),
			uploaded_file,
			&image,
			slices,
			companion_file,
			&parameters,
		) {
			log::error!("{error:#}");
		}
	});

	ok_json(r#"{"started":true}"#)
}

// --- small helpers -----------------------------------------------------------

fn respond_json(result: std::result::Result<Result<String>, tokio::task::JoinError>) -> Response {
	match result {
		Ok(Ok(json)) => ok_json(&json),
		Ok(Err(error)) => {
			log::warn!("profile query failed: {error:#}");
			error_500()
		}
		Err(error) => {
			log::warn!("profile query panicked: {error}");
			error_500()
		}
	}
}

fn ok_json(json: &str) -> Response {
	Response::builder()
		.status(200)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(json.to_string()))
		.expect("failed to build OK response")
}

fn ok_bytes(bytes: Vec<u8>, mime: &str) -> Response {
	Response::builder()
		.status(200)
		.header(header::CONTENT_TYPE, mime)
		.body(Body::from(bytes))
		.expect("failed to build OK response")
}

fn error_with(status: u16, message: &str) -> Response {
	Response::builder()
		.status(status)
		.header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
		.body(Body::from(message.as_bytes().to_vec()))
		.expect("failed to build error response")
}

fn error_400(message: &str) -> Response {
	error_with(400, message)
}

fn error_404() -> Response {
	error_with(404, "Not Found")
}

fn error_500() -> Response {
	error_with(500, "Internal Server Error")
}
