//! Scan evaluation: turn a position and a spot catalog into a `ScanEvent`.
//!
//! A scan is a discrete, read-only geofence evaluation over the supplied
//! snapshot. It reports which spots are in discovery range (candidates) and
//! which are merely in clue range (clues); actual `Discovery` records are
//! created downstream by `process_scan_event`.

use std::collections::HashSet;

use log::debug;

use crate::error::{ensure_valid_location, DiscoveryError, Result};
use crate::spatial::SpotIndex;
use crate::{
    deterministic_id, Clue, ClueSource, Discovery, DiscoveryCandidate, GeoLocation, ScanEvent, Spot,
};

/// Evaluate a scan at `location` over the supplied spot snapshot.
///
/// Spots created by `account_id` are excluded (no self-discovery), as are
/// spots the account has already discovered. For each remaining spot at
/// distance `d`:
/// - `d <= discovery_radius` → a `DiscoveryCandidate` (marks the scan
///   successful)
/// - else `d <= clue_radius` and `d <= scanner_radius` → a `Clue`
/// - otherwise the spot is invisible to this scan
///
/// The scan-event id is deterministic over `(account, trail, time, place)`,
/// so replaying the same scan yields the same record.
pub fn generate_scan_event(
    account_id: &str,
    location: GeoLocation,
    spots: &[Spot],
    scanner_radius: f64,
    existing_discoveries: &[Discovery],
    trail_id: Option<&str>,
    scanned_at: i64,
) -> Result<ScanEvent> {
    ensure_valid_location(&location)?;
    if !scanner_radius.is_finite() || scanner_radius < 0.0 {
        return Err(DiscoveryError::InvalidConfig {
            message: format!("scanner_radius must be non-negative, got {}", scanner_radius),
        });
    }

    let discovered: HashSet<&str> = existing_discoveries
        .iter()
        .filter(|d| d.account_id == account_id)
        .map(|d| d.spot_id.as_str())
        .collect();

    let scan_id = deterministic_id(
        "scan",
        &[
            account_id,
            trail_id.unwrap_or(""),
            &scanned_at.to_string(),
            &format!("{:.6}", location.latitude),
            &format!("{:.6}", location.longitude),
        ],
    );

    let index = SpotIndex::build(spots);
    let mut candidates = Vec::new();
    let mut clues = Vec::new();

    for (idx, distance) in index.query_reachable(&location, scanner_radius) {
        let spot = &spots[idx];
        if spot.created_by == account_id || discovered.contains(spot.id.as_str()) {
            continue;
        }

        if distance <= spot.options.discovery_radius {
            candidates.push(DiscoveryCandidate {
                spot_id: spot.id.clone(),
                distance,
            });
        } else if distance <= spot.options.clue_radius && distance <= scanner_radius {
            clues.push(Clue {
                id: deterministic_id("clue", &[&scan_id, &spot.id]),
                spot_id: spot.id.clone(),
                trail_id: trail_id.map(str::to_string),
                location: spot.location,
                source: ClueSource::ScanEvent,
            });
        }
    }

    let successful = !candidates.is_empty();
    debug!(
        "[Scan] account={} spots={} candidates={} clues={} successful={}",
        account_id,
        spots.len(),
        candidates.len(),
        clues.len(),
        successful
    );

    Ok(ScanEvent {
        id: scan_id,
        account_id: account_id.to_string(),
        trail_id: trail_id.map(str::to_string),
        location,
        radius_used: scanner_radius,
        scanned_at,
        successful,
        candidates,
        clues,
    })
}
