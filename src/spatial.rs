//! R-tree indexed spot catalog for radius queries.
//!
//! Scan evaluation pre-filters with an axis-aligned envelope in degree space,
//! then verifies candidates with exact haversine distances.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geo_utils::{haversine_distance, meters_to_degrees};
use crate::{GeoLocation, Spot};

/// A spot's location with its index into the source slice.
#[derive(Debug, Clone, Copy)]
pub struct IndexedSpot {
    pub idx: usize,
    pub lat: f64,
    pub lng: f64,
}

impl RTreeObject for IndexedSpot {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

impl PointDistance for IndexedSpot {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlng = self.lng - point[1];
        dlat * dlat + dlng * dlng
    }
}

/// Spatial index over a spot catalog snapshot.
#[derive(Debug)]
pub struct SpotIndex {
    tree: RTree<IndexedSpot>,
    /// Largest geofence radius in the catalog; envelope queries must reach at
    /// least this far so no spot's own geofence is missed.
    max_geofence_radius: f64,
    len: usize,
}

impl SpotIndex {
    /// Build an index over the spot slice. Queries return indices into it.
    pub fn build(spots: &[Spot]) -> Self {
        let indexed: Vec<IndexedSpot> = spots
            .iter()
            .enumerate()
            .map(|(i, s)| IndexedSpot {
                idx: i,
                lat: s.location.latitude,
                lng: s.location.longitude,
            })
            .collect();
        let max_geofence_radius = spots
            .iter()
            .map(|s| s.options.discovery_radius.max(s.options.clue_radius))
            .fold(0.0, f64::max);
        Self {
            tree: RTree::bulk_load(indexed),
            max_geofence_radius,
            len: spots.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Spot indices within `radius` meters of `center`, or within the
    /// catalog's largest geofence radius, whichever reaches further.
    ///
    /// Returns `(index, exact_distance_meters)` pairs sorted nearest-first.
    pub fn query_reachable(&self, center: &GeoLocation, radius: f64) -> Vec<(usize, f64)> {
        let reach = radius.max(self.max_geofence_radius);
        let lat_pad = meters_to_degrees(reach);
        let lon_pad = lat_pad / center.latitude.to_radians().cos().abs().max(0.01);
        let envelope = AABB::from_corners(
            [center.latitude - lat_pad, center.longitude - lon_pad],
            [center.latitude + lat_pad, center.longitude + lon_pad],
        );

        let mut hits: Vec<(usize, f64)> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|s| {
                let d = haversine_distance(center, &GeoLocation::new(s.lat, s.lng));
                (s.idx, d)
            })
            .filter(|&(_, d)| d <= reach)
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }
}
