//! Parsing and preparation of query geometries.

use crate::referential::change_referential;
use anyhow::{anyhow, bail, Result};
use geo::{BooleanOps, Intersects};
use geo_types::{
	coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Rect,
};
use std::str::FromStr;

/// Parse a WKT string into a geometry.
pub fn parse_wkt(input: &str) -> Result<Geometry<f64>> {
	let parsed = wkt::Wkt::<f64>::from_str(input).map_err(|e| anyhow!("invalid WKT: {e}"))?;
	parsed
		.try_into()
		.map_err(|e| anyhow!("unsupported WKT geometry: {e:?}"))
}

/// Clip a Cartesian geometry to the image rectangle and change it into the
/// matrix coordinate system.
///
/// An empty intersection yields an empty geometry; rasterizing it produces an
/// all-false mask, which query handlers treat as "no points".
pub fn prepare_geometry(height: u32, width: u32, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
	let clipped = clip_to_image(height, width, geometry)?;
	Ok(change_referential(&clipped, height))
}

fn clip_to_image(height: u32, width: u32, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
	let image_box = Rect::new(
		coord! { x: 0.0, y: 0.0 },
		coord! { x: f64::from(width), y: f64::from(height) },
	);
	let box_polygon = image_box.to_polygon();

	Ok(match geometry {
		Geometry::Point(p) => {
			if image_box.intersects(p) {
				Geometry::Point(*p)
			} else {
				Geometry::MultiPoint(MultiPoint(vec![]))
			}
		}
		Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint(
			mp.iter().filter(|p| image_box.intersects(*p)).copied().collect(),
		)),
		Geometry::Line(l) => Geometry::MultiLineString(box_polygon.clip(
			&MultiLineString(vec![LineString(vec![l.start, l.end])]),
			false,
		)),
		Geometry::LineString(ls) => {
			Geometry::MultiLineString(box_polygon.clip(&MultiLineString(vec![ls.clone()]), false))
		}
		Geometry::MultiLineString(mls) => Geometry::MultiLineString(box_polygon.clip(mls, false)),
		Geometry::Polygon(p) => Geometry::MultiPolygon(box_polygon.intersection(p)),
		Geometry::MultiPolygon(mp) => {
			Geometry::MultiPolygon(MultiPolygon(vec![box_polygon]).intersection(mp))
		}
		Geometry::Rect(r) => Geometry::MultiPolygon(box_polygon.intersection(&r.to_polygon())),
		Geometry::Triangle(t) => Geometry::MultiPolygon(box_polygon.intersection(&t.to_polygon())),
		Geometry::GeometryCollection(_) => bail!("geometry collections are not supported"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use geo_types::{Geometry, Point};

	#[test]
	fn parses_wkt_points_and_polygons() {
		assert!(matches!(parse_wkt("POINT(1 2)").unwrap(), Geometry::Point(_)));
		assert!(matches!(
			parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap(),
			Geometry::Polygon(_)
		));
		assert!(parse_wkt("POINT(1,nope)").is_err());
	}

	#[test]
	fn point_inside_stays_a_point() {
		let prepared = prepare_geometry(3, 3, &parse_wkt("POINT(0 2)").unwrap()).unwrap();
		let Geometry::Point(p) = prepared else {
			panic!("expected a point");
		};
		assert_eq!(p, Point::new(0.0, 0.0));
	}

	#[test]
	fn point_outside_becomes_empty() {
		let prepared = prepare_geometry(3, 3, &parse_wkt("POINT(10 10)").unwrap()).unwrap();
		let Geometry::MultiPoint(mp) = prepared else {
			panic!("expected an empty multipoint");
		};
		assert!(mp.0.is_empty());
	}

	#[test]
	fn polygon_is_clipped_to_the_image() {
		let prepared =
			prepare_geometry(4, 4, &parse_wkt("POLYGON((2 2, 10 2, 10 10, 2 10, 2 2))").unwrap()).unwrap();
		let Geometry::MultiPolygon(mp) = prepared else {
			panic!("expected a multipolygon");
		};
		// clipped to [2,4]x[2,4] in Cartesian space, then flipped to rows [0,2]
		use geo::BoundingRect;
		let bbox = mp.bounding_rect().unwrap();
		assert_eq!(bbox.min().x, 2.0);
		assert_eq!(bbox.max().x, 4.0);
		assert_eq!(bbox.min().y, 0.0);
		assert_eq!(bbox.max().y, 2.0);
	}

	#[test]
	fn collections_are_rejected() {
		let collection = parse_wkt("GEOMETRYCOLLECTION(POINT(1 1))").unwrap();
		assert!(prepare_geometry(3, 3, &collection).is_err());
	}
}
