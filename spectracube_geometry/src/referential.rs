use geo::{AffineOps, AffineTransform};
use geo_types::Geometry;

/// Change a geometry from the Cartesian to the matrix coordinate system.
///
/// Areal geometries are mapped with `(x, y) ↦ (x, H - y)`; point-like and 1-D
/// geometries with `(x, y) ↦ (x, H - 1 - y)`. The offsets differ because area
/// rasterization works on half-open pixel cells while point rasterization
/// targets exact integer cell indexes; unifying them would shift point
/// results by one row.
pub fn change_referential(geometry: &Geometry<f64>, height: u32) -> Geometry<f64> {
	let offset = if is_point_like(geometry) {
		f64::from(height) - 1.0
	} else {
		f64::from(height)
	};
	let transform = AffineTransform::new(1.0, 0.0, 0.0, 0.0, -1.0, offset);
	geometry.affine_transform(&transform)
}

fn is_point_like(geometry: &Geometry<f64>) -> bool {
	matches!(
		geometry,
		Geometry::Point(_)
			| Geometry::MultiPoint(_)
			| Geometry::Line(_)
			| Geometry::LineString(_)
			| Geometry::MultiLineString(_)
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use geo_types::{polygon, Geometry, Point};

	#[test]
	fn points_use_the_off_by_one_translation() {
		let point = Geometry::Point(Point::new(0.0, 2.0));
		let Geometry::Point(moved) = change_referential(&point, 3) else {
			panic!("expected a point");
		};
		assert_eq!(moved, Point::new(0.0, 0.0));
	}

	#[test]
	fn areas_use_the_full_height_translation() {
		let area = Geometry::Polygon(polygon![
			(x: 0.0, y: 0.0),
			(x: 3.0, y: 0.0),
			(x: 3.0, y: 3.0),
			(x: 0.0, y: 3.0),
		]);
		let Geometry::Polygon(moved) = change_referential(&area, 3) else {
			panic!("expected a polygon");
		};
		let ys: Vec<f64> = moved.exterior().0.iter().map(|c| c.y).collect();
		assert_eq!(ys, vec![3.0, 3.0, 0.0, 0.0, 3.0]);
	}
}
