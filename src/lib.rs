//! # Spot Discovery
//!
//! Geofenced spot discovery and trail progress engine for location-based
//! exploration games.
//!
//! This library provides:
//! - Scan and location-update evaluation against spot geofences
//! - Free and sequential trail discovery modes
//! - Per-account spot visibility (created / discovery / preview / public)
//! - Proximity "snap" feedback toward the nearest undiscovered spot
//! - Trail completion statistics and leaderboard ranking
//! - Star rating aggregation with deterministic record identity
//!
//! Every function is a pure transformation over caller-supplied snapshots:
//! the engine never reads a clock, never performs I/O, and never mutates its
//! inputs. Persistence, transport, and auth are the embedding application's
//! concern.
//!
//! ## Quick Start
//!
//! ```rust
//! use spot_discovery::{
//!     generate_scan_event, process_scan_event, DiscoveryOutcome, GeoLocation, Spot, Trail,
//!     TrailOptions,
//! };
//!
//! let spot = Spot::new("spot-1", "Old Lighthouse", GeoLocation::new(51.5074, -0.1278), "bob");
//! let trail = Trail::new("trail-1", "Harbour Walk", TrailOptions::default());
//! let order = vec!["spot-1".to_string()];
//!
//! let scan = generate_scan_event(
//!     "alice",
//!     GeoLocation::new(51.5074, -0.1278),
//!     &[spot],
//!     trail.options.scanner_radius,
//!     &[],
//!     Some("trail-1"),
//!     1_700_000_000,
//! )
//! .unwrap();
//! assert!(scan.successful);
//!
//! match process_scan_event(&scan, &trail, &[], &order) {
//!     DiscoveryOutcome::NewDiscoveries(found) => assert_eq!(found.len(), 1),
//!     DiscoveryOutcome::NoChange => unreachable!(),
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Unified error handling
pub mod error;
pub use error::{DiscoveryError, Result};

// Geodesic utilities (distance, bearing, compass, bounding boxes)
pub mod geo_utils;
pub use geo_utils::{bearing, bounding_box, haversine_distance, CompassPoint};

// R-tree spot index for radius queries
pub mod spatial;
pub use spatial::SpotIndex;

// Scan evaluation (sensor layer)
pub mod scan;
pub use scan::generate_scan_event;

// Discovery engine (source enrichment, geofence evaluation, snap)
pub mod discovery;
pub use discovery::{
    enrich_spot_with_source, filter_spot_by_source, get_discovered_spot_ids, get_discovery_snap,
    get_new_discoveries, preview_clue, process_scan_event,
};

// Trail statistics and leaderboard
pub mod trail;
pub use trail::{compute_leaderboard, get_trail_stats, is_trail_completed};

// Spot rating aggregation
pub mod rating;
pub use rating::{create_spot_rating, get_spot_rating_summary, spot_rating_id};

/// Namespace for all deterministic (UUIDv5) record ids minted by the engine.
const ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b1ae1e2_6d45_4f6c_9a3b_52d07f3f88d1);

/// Derive a deterministic id from a record kind and its identity parts.
///
/// Two calls with the same parts always yield the same id, which is what lets
/// callers use discovery and rating records as storage-level upsert keys.
pub(crate) fn deterministic_id(kind: &str, parts: &[&str]) -> String {
    let name = format!("{}:{}", kind, parts.join(":"));
    Uuid::new_v5(&ID_NAMESPACE, name.as_bytes()).to_string()
}

// ============================================================================
// Geographic Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use spot_discovery::GeoLocation;
/// let point = GeoLocation::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// Create a new location.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the location has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Round both coordinates to `decimals` decimal places.
    ///
    /// Used to blur preview spot locations (2 decimals ≈ 1.1 km).
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self {
            latitude: (self.latitude * factor).round() / factor,
            longitude: (self.longitude * factor).round() / factor,
        }
    }
}

/// A lat/lon rectangle, used for trail map viewports.
///
/// A boundary may cross the antimeridian, in which case the south-west
/// longitude is numerically greater than the north-east longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBoundary {
    pub north_east: GeoLocation,
    pub south_west: GeoLocation,
}

impl GeoBoundary {
    /// Check whether a location falls inside this boundary.
    pub fn contains(&self, location: &GeoLocation) -> bool {
        if location.latitude < self.south_west.latitude
            || location.latitude > self.north_east.latitude
        {
            return false;
        }
        let west = self.south_west.longitude;
        let east = self.north_east.longitude;
        if west <= east {
            location.longitude >= west && location.longitude <= east
        } else {
            // Antimeridian crossing: the box wraps through 180°
            location.longitude >= west || location.longitude <= east
        }
    }

    /// Get the center of the boundary (antimeridian-aware).
    pub fn center(&self) -> GeoLocation {
        let lat = (self.south_west.latitude + self.north_east.latitude) / 2.0;
        let west = self.south_west.longitude;
        let east = self.north_east.longitude;
        let span = if west <= east {
            east - west
        } else {
            east + 360.0 - west
        };
        GeoLocation::new(lat, geo_utils::normalize_longitude(west + span / 2.0))
    }
}

// ============================================================================
// Spot & Trail Catalog
// ============================================================================

/// An account's relationship to a spot, controlling field-level visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotSource {
    /// The account created this spot
    Created,
    /// The account has discovered this spot
    Discovery,
    /// The spot is only teased: redacted description, blurred location
    Preview,
    /// Un-gated spot, assignable by callers but never derived by the engine
    Public,
}

impl SpotSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotSource::Created => "created",
            SpotSource::Discovery => "discovery",
            SpotSource::Preview => "preview",
            SpotSource::Public => "public",
        }
    }
}

impl std::fmt::Display for SpotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geofence radii for a spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotOptions {
    /// Inside this radius (meters) a scan or location update discovers the spot
    pub discovery_radius: f64,
    /// Inside this radius (meters), outside the discovery radius, a clue is surfaced
    pub clue_radius: f64,
}

impl Default for SpotOptions {
    fn default() -> Self {
        Self {
            discovery_radius: 25.0,
            clue_radius: 200.0,
        }
    }
}

/// A discoverable point of interest.
///
/// The engine never mutates a spot; enrichment and redaction return copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: GeoLocation,
    /// Account id of the creator (creators cannot discover their own spots)
    pub created_by: String,
    pub image_url: Option<String>,
    pub options: SpotOptions,
    /// Relationship to the viewing account, derived by `enrich_spot_with_source`
    pub source: Option<SpotSource>,
}

impl Spot {
    /// Create a spot with default geofence radii and no source.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: GeoLocation,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            location,
            created_by: created_by.into(),
            image_url: None,
            options: SpotOptions::default(),
            source: None,
        }
    }
}

/// How spots on a trail unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Any undiscovered spot in range may be discovered
    Free,
    /// Only the next undiscovered spot in trail order may be discovered
    Sequence,
}

impl DiscoveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMode::Free => "free",
            DiscoveryMode::Sequence => "sequence",
        }
    }
}

impl std::fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiscoveryMode {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequence" => Ok(DiscoveryMode::Sequence),
            _ => Ok(DiscoveryMode::Free),
        }
    }
}

impl Default for DiscoveryMode {
    fn default() -> Self {
        DiscoveryMode::Free
    }
}

/// Discovery policy for a trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailOptions {
    pub discovery_mode: DiscoveryMode,
    /// Maximum reach (meters) of an explicit scan action
    pub scanner_radius: f64,
}

impl Default for TrailOptions {
    fn default() -> Self {
        Self {
            discovery_mode: DiscoveryMode::Free,
            scanner_radius: 500.0,
        }
    }
}

/// An ordered or unordered collection of spots forming a walkable route.
///
/// The canonical spot ordering is supplied by the caller as a separate
/// spot-id list; the trail itself only carries the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trail {
    pub id: String,
    pub name: String,
    pub options: TrailOptions,
}

impl Trail {
    pub fn new(id: impl Into<String>, name: impl Into<String>, options: TrailOptions) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            options,
        }
    }
}

// ============================================================================
// Discovery Records
// ============================================================================

/// The record of one account discovering one spot on one trail.
///
/// The id is the deterministic UUIDv5 of `(account_id, spot_id, trail_id)`,
/// so a storage layer can enforce the at-most-one-discovery invariant with a
/// plain idempotent upsert even when two concurrent evaluations race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    pub id: String,
    pub account_id: String,
    pub spot_id: String,
    pub trail_id: String,
    /// Unix timestamp (seconds since epoch)
    pub discovered_at: i64,
    pub scan_event_id: Option<String>,
}

impl Discovery {
    /// Create a discovery record with its deterministic id.
    pub fn new(
        account_id: impl Into<String>,
        spot_id: impl Into<String>,
        trail_id: impl Into<String>,
        discovered_at: i64,
        scan_event_id: Option<String>,
    ) -> Self {
        let account_id = account_id.into();
        let spot_id = spot_id.into();
        let trail_id = trail_id.into();
        let id = deterministic_id("discovery", &[&account_id, &spot_id, &trail_id]);
        Self {
            id,
            account_id,
            spot_id,
            trail_id,
            discovered_at,
            scan_event_id,
        }
    }
}

/// Where a clue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClueSource {
    /// Surfaced while browsing (redacted preview spot)
    Preview,
    /// Surfaced by an explicit scan
    ScanEvent,
}

/// A transient signal that a spot exists nearby, without full detail.
///
/// Clues are generated per scan (or per preview listing) and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    pub id: String,
    pub spot_id: String,
    pub trail_id: Option<String>,
    pub location: GeoLocation,
    pub source: ClueSource,
}

/// A spot inside its discovery radius at scan time.
///
/// Candidates are what `process_scan_event` turns into discoveries; clues are
/// visibility hints only. The two were a single overloaded concept in earlier
/// designs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryCandidate {
    pub spot_id: String,
    /// Exact distance (meters) from the scan location to the spot
    pub distance: f64,
}

/// The record of one discrete scan action: a point-in-time geofence
/// evaluation over the supplied spot snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    pub id: String,
    pub account_id: String,
    pub trail_id: Option<String>,
    pub location: GeoLocation,
    /// Scanner radius (meters) in effect for this scan
    pub radius_used: f64,
    /// Unix timestamp (seconds since epoch)
    pub scanned_at: i64,
    /// True iff at least one spot fell within its discovery radius
    pub successful: bool,
    /// Spots in discovery range, ready to become discoveries
    pub candidates: Vec<DiscoveryCandidate>,
    /// Spots in clue range only
    pub clues: Vec<Clue>,
}

/// Ephemeral proximity feedback toward the nearest undiscovered spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySnap {
    /// Meters to the nearest undiscovered spot
    pub distance: f64,
    /// 1.0 standing on the spot, decaying linearly to 0.0 at max range
    pub intensity: f64,
}

/// Outcome of a discovery evaluation.
///
/// A tagged result keeps "nothing happened" distinct from an empty success
/// and from an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscoveryOutcome {
    /// No spot qualified; nothing to persist
    NoChange,
    /// Newly discovered spots, in evaluation order
    NewDiscoveries(Vec<Discovery>),
}

impl DiscoveryOutcome {
    /// The discoveries to persist (empty for `NoChange`).
    pub fn discoveries(&self) -> &[Discovery] {
        match self {
            DiscoveryOutcome::NoChange => &[],
            DiscoveryOutcome::NewDiscoveries(found) => found,
        }
    }

    pub fn is_no_change(&self) -> bool {
        matches!(self, DiscoveryOutcome::NoChange)
    }
}

// ============================================================================
// Ratings & Trail Statistics
// ============================================================================

/// One account's star rating of one spot.
///
/// The id is a deterministic function of `(account_id, spot_id)` alone:
/// re-rating overwrites rather than creating a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRating {
    pub id: String,
    pub spot_id: String,
    pub account_id: String,
    /// Stars in [1, 5]
    pub rating: u8,
}

/// Aggregated ratings for a spot, derived per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean rating in [0, 5]; 0.0 when there are no ratings
    pub average: f64,
    pub count: u32,
    /// The querying account's own rating, if any
    pub user_rating: Option<u8>,
}

/// Where an account stands on a trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::NotStarted => "not_started",
            CompletionStatus::InProgress => "in_progress",
            CompletionStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-account aggregate over a trail's discovery history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailStats {
    pub discovered_spots: u32,
    pub total_spots: u32,
    /// Rounded percentage in [0, 100]
    pub progress_percentage: u32,
    pub completion_status: CompletionStatus,
    /// 1-based leaderboard position; 0 when the account has not started
    pub rank: u32,
    /// Distinct accounts with at least one discovery on the trail
    pub total_discoverers: u32,
    /// Mean seconds between the account's consecutive discoveries
    pub average_time_between_discoveries: Option<f64>,
}

/// One account's row in a trail leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub account_id: String,
    /// Distinct trail spots discovered
    pub discovered_spots: u32,
    /// Unix timestamp of the account's most recent discovery
    pub latest_discovery_at: i64,
}

// ============================================================================
// Configuration
// ============================================================================

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Range (meters) at which snap intensity reaches zero.
    /// Default: 500.0
    pub snap_max_range: f64,

    /// Decimal places kept when blurring preview spot locations.
    /// Default: 2 (~1.1 km precision)
    pub preview_precision: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            snap_max_range: 500.0,
            preview_precision: 2,
        }
    }
}

impl ScanConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.snap_max_range.is_finite() || self.snap_max_range <= 0.0 {
            return Err(DiscoveryError::InvalidConfig {
                message: format!(
                    "snap_max_range must be positive, got {}",
                    self.snap_max_range
                ),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
