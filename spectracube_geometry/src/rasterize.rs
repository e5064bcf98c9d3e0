//! Rasterization of matrix-space geometries to Boolean pixel masks.
//!
//! Semantics:
//! - areal geometries: scanline fill, a pixel is set iff its centre lies
//!   inside the geometry (even-odd rule across all rings);
//! - line strings: every cell the segment passes through is set (grid
//!   traversal);
//! - points: exactly the cell `(floor(y), floor(x))` is set.
//!
//! Cells outside the mask are dropped silently.

use geo_types::{Coord, Geometry, LineString, Polygon};
use ndarray::Array2;

/// Rasterize a matrix-space geometry into a `[height, width]` Boolean mask.
pub fn rasterize(geometry: &Geometry<f64>, height: u32, width: u32) -> Array2<bool> {
	let mut mask = Array2::from_elem((height as usize, width as usize), false);
	burn(geometry, &mut mask);
	mask
}

fn burn(geometry: &Geometry<f64>, mask: &mut Array2<bool>) {
	match geometry {
		Geometry::Point(p) => burn_point(p.x(), p.y(), mask),
		Geometry::MultiPoint(mp) => mp.iter().for_each(|p| burn_point(p.x(), p.y(), mask)),
		Geometry::Line(l) => burn_segment(l.start, l.end, mask),
		Geometry::LineString(ls) => burn_line_string(ls, mask),
		Geometry::MultiLineString(mls) => mls.iter().for_each(|ls| burn_line_string(ls, mask)),
		Geometry::Polygon(p) => burn_polygon(p, mask),
		Geometry::MultiPolygon(mp) => mp.iter().for_each(|p| burn_polygon(p, mask)),
		Geometry::Rect(r) => burn_polygon(&r.to_polygon(), mask),
		Geometry::Triangle(t) => burn_polygon(&t.to_polygon(), mask),
		Geometry::GeometryCollection(gc) => gc.iter().for_each(|g| burn(g, mask)),
	}
}

fn burn_cell(row: i64, col: i64, mask: &mut Array2<bool>) {
	let (rows, cols) = mask.dim();
	if row >= 0 && col >= 0 && (row as usize) < rows && (col as usize) < cols {
		mask[[row as usize, col as usize]] = true;
	}
}

fn burn_point(x: f64, y: f64, mask: &mut Array2<bool>) {
	burn_cell(y.floor() as i64, x.floor() as i64, mask);
}

fn burn_line_string(line: &LineString<f64>, mask: &mut Array2<bool>) {
	if line.0.len() == 1 {
		burn_point(line.0[0].x, line.0[0].y, mask);
		return;
	}
	for segment in line.0.windows(2) {
		burn_segment(segment[0], segment[1], mask);
	}
}

/// Grid traversal from `a` to `b`, marking every cell the segment enters.
fn burn_segment(a: Coord<f64>, b: Coord<f64>, mask: &mut Array2<bool>) {
	let mut col = a.x.floor() as i64;
	let mut row = a.y.floor() as i64;
	let col_end = b.x.floor() as i64;
	let row_end = b.y.floor() as i64;

	let dx = (b.x - a.x).abs();
	let dy = (b.y - a.y).abs();
	let step_col: i64 = if b.x >= a.x { 1 } else { -1 };
	let step_row: i64 = if b.y >= a.y { 1 } else { -1 };

	// parameter t in [0,1] at which the segment crosses the next cell edge
	let mut t_next_col = if dx == 0.0 {
		f64::INFINITY
	} else if step_col > 0 {
		(col as f64 + 1.0 - a.x) / dx
	} else {
		(a.x - col as f64) / dx
	};
	let mut t_next_row = if dy == 0.0 {
		f64::INFINITY
	} else if step_row > 0 {
		(row as f64 + 1.0 - a.y) / dy
	} else {
		(a.y - row as f64) / dy
	};
	let t_step_col = if dx == 0.0 { f64::INFINITY } else { 1.0 / dx };
	let t_step_row = if dy == 0.0 { f64::INFINITY } else { 1.0 / dy };

	loop {
		burn_cell(row, col, mask);
		if (col == col_end && row == row_end) || (t_next_col > 1.0 && t_next_row > 1.0) {
			return;
		}
		if t_next_col < t_next_row {
			col += step_col;
			t_next_col += t_step_col;
		} else {
			row += step_row;
			t_next_row += t_step_row;
		}
	}
}

/// Scanline fill: even-odd rule over all rings, pixel centres decide.
fn burn_polygon(polygon: &Polygon<f64>, mask: &mut Array2<bool>) {
	let (rows, cols) = mask.dim();
	let rings: Vec<&LineString<f64>> =
		std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()).collect();

	let mut crossings: Vec<f64> = Vec::new();
	for row in 0..rows {
		let y_centre = row as f64 + 0.5;
		crossings.clear();
		for ring in &rings {
			for edge in ring.0.windows(2) {
				let (p, q) = (edge[0], edge[1]);
				if (p.y <= y_centre && q.y > y_centre) || (q.y <= y_centre && p.y > y_centre) {
					crossings.push(p.x + (y_centre - p.y) / (q.y - p.y) * (q.x - p.x));
				}
			}
		}
		crossings.sort_by(|a, b| a.partial_cmp(b).expect("crossings are finite"));
		for span in crossings.chunks_exact(2) {
			let (x_enter, x_leave) = (span[0], span[1]);
			let mut col = (x_enter - 0.5).ceil().max(0.0) as usize;
			while col < cols && (col as f64) + 0.5 < x_leave {
				mask[[row, col]] = true;
				col += 1;
			}
		}
	}
}
