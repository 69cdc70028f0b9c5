//! Geodesic utilities: distance, bearing, compass directions, bounding boxes.
//!
//! Everything here is pure and referentially transparent; the discovery
//! engine composes these heavily and tests them in isolation.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::{GeoBoundary, GeoLocation};

/// Mean Earth radius in meters, used for meter/degree conversions.
const MEAN_EARTH_RADIUS: f64 = 6_371_000.0;

/// Calculate the haversine (great-circle) distance between two locations in meters.
///
/// Symmetric and deterministic; zero for identical coordinates.
pub fn haversine_distance(a: &GeoLocation, b: &GeoLocation) -> f64 {
    let p1 = Point::new(a.longitude, a.latitude);
    let p2 = Point::new(b.longitude, b.latitude);
    Haversine::distance(p1, p2)
}

/// Total distance in meters along a path of locations.
pub fn path_distance(points: &[GeoLocation]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Initial bearing from `a` to `b` in degrees, normalized to [0, 360).
pub fn bearing(a: &GeoLocation, b: &GeoLocation) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Convert a distance in meters to degrees of latitude.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / MEAN_EARTH_RADIUS * (180.0 / std::f64::consts::PI)
}

/// Normalize a longitude to (-180, 180].
pub fn normalize_longitude(longitude: f64) -> f64 {
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// One of the 8 compass points (45° buckets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassPoint {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassPoint {
    const ALL: [CompassPoint; 8] = [
        CompassPoint::North,
        CompassPoint::NorthEast,
        CompassPoint::East,
        CompassPoint::SouthEast,
        CompassPoint::South,
        CompassPoint::SouthWest,
        CompassPoint::West,
        CompassPoint::NorthWest,
    ];

    /// Nearest compass point for a bearing in degrees.
    ///
    /// Bucket boundaries (22.5°, 67.5°, ...) round toward the next point,
    /// so 22.5° is `NorthEast`, not `North`.
    pub fn from_bearing(bearing: f64) -> Self {
        let idx = ((bearing.rem_euclid(360.0) / 45.0).round() as usize) % 8;
        Self::ALL[idx]
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            CompassPoint::North => "N",
            CompassPoint::NorthEast => "NE",
            CompassPoint::East => "E",
            CompassPoint::SouthEast => "SE",
            CompassPoint::South => "S",
            CompassPoint::SouthWest => "SW",
            CompassPoint::West => "W",
            CompassPoint::NorthWest => "NW",
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            CompassPoint::North => "North",
            CompassPoint::NorthEast => "Northeast",
            CompassPoint::East => "East",
            CompassPoint::SouthEast => "Southeast",
            CompassPoint::South => "South",
            CompassPoint::SouthWest => "Southwest",
            CompassPoint::West => "West",
            CompassPoint::NorthWest => "Northwest",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Compute a padded lat/lon rectangle covering a point set.
///
/// Returns `None` for an empty point set. Longitudes are analyzed on the
/// circle: the rectangle spans the ordering that minimizes angular span, so a
/// point set straddling the antimeridian yields a wrapped box (west > east)
/// instead of one covering most of the globe. Output longitudes are
/// normalized to (-180, 180].
pub fn bounding_box(points: &[GeoLocation], padding_meters: f64) -> Option<GeoBoundary> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
    }

    // Longitude span via sorted-gap analysis: the box covers the complement
    // of the largest angular gap between neighboring points.
    let mut lons: Vec<f64> = points
        .iter()
        .map(|p| normalize_longitude(p.longitude))
        .collect();
    lons.sort_by(f64::total_cmp);

    let n = lons.len();
    let mut widest_gap = lons[0] + 360.0 - lons[n - 1];
    let mut gap_index = n - 1; // gap between last and first, i.e. no wrap
    for i in 0..n - 1 {
        let gap = lons[i + 1] - lons[i];
        if gap > widest_gap {
            widest_gap = gap;
            gap_index = i;
        }
    }
    let (west, east) = if gap_index == n - 1 {
        (lons[0], lons[n - 1])
    } else {
        (lons[gap_index + 1], lons[gap_index])
    };

    let lat_pad = meters_to_degrees(padding_meters);
    let ref_lat = (min_lat + max_lat) / 2.0;
    let lon_pad = lat_pad / ref_lat.to_radians().cos().abs().max(0.01);

    let lon_span = if west <= east {
        east - west
    } else {
        east + 360.0 - west
    };
    let (west, east) = if lon_span + 2.0 * lon_pad >= 360.0 {
        // Degenerate: padding wraps the box around the whole globe
        (-180.0, 180.0)
    } else {
        (
            normalize_longitude(west - lon_pad),
            normalize_longitude(east + lon_pad),
        )
    };

    Some(GeoBoundary {
        north_east: GeoLocation::new((max_lat + lat_pad).min(90.0), east),
        south_west: GeoLocation::new((min_lat - lat_pad).max(-90.0), west),
    })
}
