use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

// Widens every bounding box so float rounding never drops a point that is inside the circle.
const BOX_SCALE: f64 = 1.000_001;
const BOX_EPSILON_DEGREES: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lon: f64,
}
impl GeoPoint {
	pub fn new(lat: f64, lon: f64) -> Result<Self> {
		let point = Self { lat, lon };

		point.validate()?;

		Ok(point)
	}

	pub fn validate(&self) -> Result<()> {
		if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
			return Err(Error::InvalidLatitude(self.lat));
		}
		if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
			return Err(Error::InvalidLongitude(self.lon));
		}

		Ok(())
	}

	pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
		haversine_meters(self, other)
	}
}

/// Great-circle distance between two points.
///
/// Identical coordinates always yield exactly `0.0`, which is what lets a zero radius act as an
/// exact-match query.
pub fn haversine_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
	let d_lat = (b.lat - a.lat).to_radians();
	let d_lon = (b.lon - a.lon).to_radians();
	let lat_a = a.lat.to_radians();
	let lat_b = b.lat.to_radians();
	let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

	2.0 * EARTH_RADIUS_METERS * h.min(1.0).sqrt().asin()
}

/// Axis-aligned lat/lon rectangle, inclusive on every edge. Never crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
	pub min_lat: f64,
	pub max_lat: f64,
	pub min_lon: f64,
	pub max_lon: f64,
}
impl BoundingBox {
	pub fn contains(&self, point: &GeoPoint) -> bool {
		(self.min_lat..=self.max_lat).contains(&point.lat)
			&& (self.min_lon..=self.max_lon).contains(&point.lon)
	}
}

/// Boxes whose union contains every point within `radius_meters` of `center`.
///
/// Returns one box, or two when the circle crosses the antimeridian. When the circle reaches a
/// pole the box spans every longitude.
pub fn covering_boxes(center: &GeoPoint, radius_meters: f64) -> Vec<BoundingBox> {
	let angular = radius_meters.max(0.0) / EARTH_RADIUS_METERS * BOX_SCALE;
	let delta_lat = angular.to_degrees() + BOX_EPSILON_DEGREES;
	let min_lat = center.lat - delta_lat;
	let max_lat = center.lat + delta_lat;

	if min_lat <= -90.0 || max_lat >= 90.0 || angular >= FRAC_PI_2 {
		return vec![BoundingBox {
			min_lat: min_lat.max(-90.0),
			max_lat: max_lat.min(90.0),
			min_lon: -180.0,
			max_lon: 180.0,
		}];
	}

	let ratio = angular.sin() / center.lat.to_radians().cos();

	if ratio >= 1.0 {
		return vec![BoundingBox { min_lat, max_lat, min_lon: -180.0, max_lon: 180.0 }];
	}

	let delta_lon = ratio.asin().to_degrees() * BOX_SCALE + BOX_EPSILON_DEGREES;

	if delta_lon >= 180.0 {
		return vec![BoundingBox { min_lat, max_lat, min_lon: -180.0, max_lon: 180.0 }];
	}

	let min_lon = center.lon - delta_lon;
	let max_lon = center.lon + delta_lon;

	if min_lon < -180.0 {
		return vec![
			BoundingBox { min_lat, max_lat, min_lon: min_lon + 360.0, max_lon: 180.0 },
			BoundingBox { min_lat, max_lat, min_lon: -180.0, max_lon },
		];
	}
	if max_lon > 180.0 {
		return vec![
			BoundingBox { min_lat, max_lat, min_lon, max_lon: 180.0 },
			BoundingBox { min_lat, max_lat, min_lon: -180.0, max_lon: max_lon - 360.0 },
		];
	}

	vec![BoundingBox { min_lat, max_lat, min_lon, max_lon }]
}
