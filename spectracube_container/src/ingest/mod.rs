//! The tile-ingest pipeline: N reader threads feeding one cube writer.
//!
//! Readers pull `(x, y, slice)` specs from an unbounded queue, fetch and
//! decode the crop, and push `(spec, tile)` pairs onto a bounded queue whose
//! blocking `send` provides backpressure when decoding outpaces the disk.
//! The single writer drains that queue and places tiles into the cube; every
//! spec targets a disjoint cube rectangle, so write order is irrelevant.
//!
//! Errors are first-error-wins: whoever fails pushes the error onto the error
//! channel and raises the shared cancellation flag; every other worker
//! observes the flag between blocking operations and exits voluntarily. The
//! spec queue is closed by dropping its sender, the tile queue by the last
//! reader exiting; no worker can block after that, so the pipeline always
//! terminates.

use crate::cube::CubeWriter;
use crate::source::TileSourceTrait;
use anyhow::{bail, Error, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use spectracube_core::metadata::{retry_update, MetadataStoreTrait};
use spectracube_core::{
	CompanionFile, ImageMeta, SliceDescriptor, TileData, TileGrid, TileSpec, UploadedFile,
	UploadedFileStatus,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const UPDATE_RETRIES: u32 = 5;

/// Tuning knobs of the ingest pipeline.
#[derive(Debug, Clone)]
pub struct IngestParameters {
	/// Number of reader threads; 0 means `max(1, cpu_count - 1)`.
	pub n_workers: usize,
	pub tile_size: u32,
	/// Report progress every this many written tiles.
	pub progress_update_period: u64,
	/// Capacity of the bounded tile queue between readers and the writer.
	pub write_queue_capacity: usize,
	/// Directory that uploaded-file paths are resolved against.
	pub root: PathBuf,
}

impl Default for IngestParameters {
	fn default() -> Self {
		IngestParameters {
			n_workers: 0,
			tile_size: 512,
			progress_update_period: 50,
			write_queue_capacity: 512,
			root: PathBuf::new(),
		}
	}
}

/// Everything the workers share, passed explicitly instead of captured ad hoc.
struct IngestContext<'a> {
	store: &'a dyn MetadataStoreTrait,
	source: &'a dyn TileSourceTrait,
	grid: TileGrid,
	bpc: u8,
	image_name: &'a str,
	total: u64,
	progress_update_period: u64,
	errors: Sender<Error>,
	cancelled: AtomicBool,
}

impl IngestContext<'_> {
	fn cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Relaxed)
	}

	/// Record the first error and ask every worker to wind down.
	fn fail(&self, error: Error) {
		log::error!("{} | {error:#}", self.image_name);
		let _ = self.errors.send(error);
		self.cancelled.store(true, Ordering::Relaxed);
	}
}

/// Materialize the cube of an uploaded image and drive its status machine
/// `UPLOADED → CONVERTING → {CONVERTED, ERROR_CONVERSION}`.
///
/// Returns the first pipeline error after all workers have wound down; the
/// terminal status has been reported to the metadata store either way.
pub fn ingest(
	store: &dyn MetadataStoreTrait,
	source: &dyn TileSourceTrait,
	mut uploaded_file: UploadedFile,
	image: &ImageMeta,
	slices: Vec<SliceDescriptor>,
	mut companion_file: CompanionFile,
	parameters: &IngestParameters,
) -> Result<()> {
	let image_name = image.original_filename.as_str();

	if image.spectral_dimension().is_none() {
		mark_failed(store, &mut uploaded_file, image_name);
		bail!("cannot build a profile cube for {image_name}: the image is 2-D");
	}
	if slices.is_empty() {
		mark_failed(store, &mut uploaded_file, image_name);
		bail!("cannot build a profile cube for {image_name}: the image has no slices");
	}

	let bpc = image.bpc();
	let grid = TileGrid::new(image.width, image.height, parameters.tile_size)?;
	let path = parameters.root.join(&uploaded_file.path);

	if uploaded_file.status == UploadedFileStatus::Uploaded {
		uploaded_file.status = UploadedFileStatus::Converting;
	}
	let updated =
		retry_update(|| store.update_uploaded_file(&uploaded_file), "uploaded file", UPDATE_RETRIES)?;
	if let Some(updated) = updated {
		uploaded_file = updated;
	}
	let updated = retry_update(
		|| store.update_companion_file(&companion_file),
		"companion file",
		UPDATE_RETRIES,
	)?;
	if let Some(updated) = updated {
		companion_file = updated;
	}

	let mut cube = match CubeWriter::create(
		&path,
		image.height,
		image.width,
		slices.len() as u32,
		bpc,
		parameters.tile_size,
	) {
		Ok(cube) => cube,
		Err(error) => {
			mark_failed(store, &mut uploaded_file, image_name);
			return Err(error);
		}
	};

	let slices: Vec<Arc<SliceDescriptor>> = slices.into_iter().map(Arc::new).collect();
	let total = grid.tiles_per_slice() * slices.len() as u64;
	let n_workers = if parameters.n_workers == 0 {
		num_cpus::get().saturating_sub(1).max(1)
	} else {
		parameters.n_workers
	};
	log::info!("{image_name} | ingesting {total} tiles with {n_workers} readers into {path:?}");

	let (spec_tx, spec_rx) = unbounded::<TileSpec>();
	let (tile_tx, tile_rx) = bounded::<(TileSpec, TileData)>(parameters.write_queue_capacity.max(1));
	let (err_tx, err_rx) = unbounded::<Error>();

	let context = IngestContext {
		store,
		source,
		grid,
		bpc,
		image_name,
		total,
		progress_update_period: parameters.progress_update_period.max(1),
		errors: err_tx,
		cancelled: AtomicBool::new(false),
	};

	for slice in &slices {
		for x in 0..grid.x_tiles() {
			for y in 0..grid.y_tiles() {
				let spec = TileSpec {
					x,
					y,
					slice: Arc::clone(slice),
				};
				spec_tx.send(spec).expect("spec queue receiver is alive");
			}
		}
	}
	drop(spec_tx);

	thread::scope(|scope| {
		let context = &context;
		for _ in 0..n_workers {
			let specs = spec_rx.clone();
			let tiles = tile_tx.clone();
			scope.spawn(move || read_worker(context, &specs, &tiles));
		}
		// the readers hold the only remaining senders; the tile queue closes
		// when the last of them exits
		drop(tile_tx);

		// the writer owns the receiver: dropping it on an early exit unblocks
		// readers parked on the bounded send
		scope.spawn(|| write_worker(context, tile_rx, &mut cube, &mut companion_file));
	});

	let first_error = err_rx.try_iter().next();

	// Re-read both records; their state may have changed externally.
	uploaded_file = store.fetch_uploaded_file(uploaded_file.id)?;
	companion_file = store.fetch_companion_file(companion_file.id)?;

	if first_error.is_some() {
		uploaded_file.status = UploadedFileStatus::ErrorConversion;
	} else if uploaded_file.status == UploadedFileStatus::Converting {
		uploaded_file.status = UploadedFileStatus::Converted;
	}
	uploaded_file.size = cube.file_len()?;

	retry_update(|| store.update_uploaded_file(&uploaded_file), "uploaded file", UPDATE_RETRIES)?;
	retry_update(
		|| store.update_companion_file(&companion_file),
		"companion file",
		UPDATE_RETRIES,
	)?;
	cube.close()?;

	match first_error {
		Some(error) => Err(error.context(format!("conversion of {image_name} failed"))),
		None => {
			log::info!("{image_name} | conversion finished");
			Ok(())
		}
	}
}

fn read_worker(context: &IngestContext, specs: &Receiver<TileSpec>, tiles: &Sender<(TileSpec, TileData)>) {
	while let Ok(spec) = specs.recv() {
		if context.cancelled() {
			return;
		}
		match context.source.fetch(&spec, &context.grid, context.bpc) {
			Ok(tile) => {
				log::debug!("{} | read tile {spec}", context.image_name);
				// fails only when the writer is gone
				if tiles.send((spec, tile)).is_err() {
					return;
				}
			}
			Err(error) => {
				context.fail(error);
				return;
			}
		}
	}
}

fn write_worker(
	context: &IngestContext,
	tiles: Receiver<(TileSpec, TileData)>,
	cube: &mut CubeWriter,
	companion_file: &mut CompanionFile,
) {
	let mut counter: u64 = 0;
	for (spec, tile) in tiles.iter() {
		if context.cancelled() {
			return;
		}
		let row_lo = context.grid.top(spec.y);
		let col_lo = context.grid.left(spec.x);
		if let Err(error) = cube.write_tile(row_lo, col_lo, spec.slice.rank, &tile) {
			context.fail(error.context(format!("failed to write tile {spec}")));
			return;
		}
		counter += 1;
		if counter % context.progress_update_period == 0 || counter == context.total {
			let percent = (counter as f64 * 100.0 / context.total as f64).round() as u8;
			companion_file.progress = percent;
			match context.store.update_companion_file(companion_file) {
				Ok(_) => log::info!(
					"{} | written {percent}% ({counter}/{})",
					context.image_name,
					context.total
				),
				Err(error) => {
					log::warn!("{} | failed to report progress: {error:#}", context.image_name);
				}
			}
		}
	}
}

fn mark_failed(store: &dyn MetadataStoreTrait, uploaded_file: &mut UploadedFile, image_name: &str) {
	uploaded_file.status = UploadedFileStatus::ErrorConversion;
	let result = retry_update(
		|| store.update_uploaded_file(uploaded_file),
		"uploaded file",
		UPDATE_RETRIES,
	);
	if let Err(error) = result {
		log::warn!("{image_name} | failed to record the conversion error: {error:#}");
	}
}
