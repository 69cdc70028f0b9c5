//! Discovery engine: spot visibility, geofence evaluation, and snap feedback.
//!
//! This is the core of the library. It enriches spots with their
//! relationship to a viewing account, redacts what that account may see,
//! turns scans and location updates into new `Discovery` records under the
//! trail's discovery-mode policy, and computes proximity snap feedback.
//!
//! All functions evaluate a caller-supplied snapshot. The at-most-one
//! discovery per `(account, spot, trail)` invariant is computed against that
//! snapshot; callers must serialize evaluation + persistence per account and
//! trail (or upsert on the deterministic discovery id) to keep it under
//! concurrent updates.

use std::collections::HashSet;

use log::{debug, info};

use crate::error::{ensure_valid_location, Result};
use crate::geo_utils::haversine_distance;
use crate::{
    deterministic_id, Clue, ClueSource, Discovery, DiscoveryMode, DiscoveryOutcome, DiscoverySnap,
    GeoLocation, ScanConfig, ScanEvent, Spot, SpotSource, Trail,
};

// ============================================================================
// Visibility
// ============================================================================

/// Derive a spot's relationship to the viewing account.
///
/// Priority: creator → `Created`; already discovered by the account →
/// `Discovery`; otherwise `Preview`. The `Public` source is assignable by
/// callers for un-gated spots but never derived here.
pub fn enrich_spot_with_source(spot: &Spot, account_id: &str, discoveries: &[Discovery]) -> Spot {
    let source = if spot.created_by == account_id {
        SpotSource::Created
    } else if discoveries
        .iter()
        .any(|d| d.account_id == account_id && d.spot_id == spot.id)
    {
        SpotSource::Discovery
    } else {
        SpotSource::Preview
    };

    let mut enriched = spot.clone();
    enriched.source = Some(source);
    enriched
}

/// Redact a spot according to its source.
///
/// - no source → `None` (the caller has no right to see the spot at all)
/// - `Created` / `Discovery` / `Public` → the spot unmodified
/// - `Preview` → a teaser copy: empty description, no image, location
///   rounded to `config.preview_precision` decimals
///
/// Idempotent: re-filtering an already-redacted preview changes nothing.
pub fn filter_spot_by_source(spot: &Spot, config: &ScanConfig) -> Option<Spot> {
    match spot.source? {
        SpotSource::Created | SpotSource::Discovery | SpotSource::Public => Some(spot.clone()),
        SpotSource::Preview => {
            let mut redacted = spot.clone();
            redacted.description = String::new();
            redacted.image_url = None;
            redacted.location = spot.location.rounded(config.preview_precision);
            Some(redacted)
        }
    }
}

/// Build a preview clue for a spot the account has not discovered.
///
/// The clue carries the blurred location, never the exact one.
pub fn preview_clue(spot: &Spot, trail_id: Option<&str>, config: &ScanConfig) -> Clue {
    Clue {
        id: deterministic_id("clue", &["preview", &spot.id, trail_id.unwrap_or("")]),
        spot_id: spot.id.clone(),
        trail_id: trail_id.map(str::to_string),
        location: spot.location.rounded(config.preview_precision),
        source: ClueSource::Preview,
    }
}

// ============================================================================
// Geofence Evaluation
// ============================================================================

/// Spot ids discovered by `account_id`, optionally narrowed to one trail.
///
/// Pure projection in input order; discoveries are unique per spot by
/// construction, so no dedup happens here.
pub fn get_discovered_spot_ids(
    account_id: &str,
    discoveries: &[Discovery],
    trail_id: Option<&str>,
) -> Vec<String> {
    discoveries
        .iter()
        .filter(|d| d.account_id == account_id)
        .filter(|d| trail_id.map_or(true, |t| d.trail_id == t))
        .map(|d| d.spot_id.clone())
        .collect()
}

/// Evaluate a continuous location update against the trail's spots.
///
/// Eligible spots are not created by the account, not already discovered by
/// it on this trail, and within their discovery radius of `location`. In
/// `Sequence` mode only the earliest undiscovered spot in `trail_spot_ids`
/// may discover, even when later spots are geometrically in range; in `Free`
/// mode every eligible spot discovers at once.
pub fn get_new_discoveries(
    account_id: &str,
    location: GeoLocation,
    spots: &[Spot],
    existing_discoveries: &[Discovery],
    trail: &Trail,
    trail_spot_ids: &[String],
    now: i64,
) -> Result<DiscoveryOutcome> {
    ensure_valid_location(&location)?;

    let discovered: HashSet<&str> = existing_discoveries
        .iter()
        .filter(|d| d.account_id == account_id && d.trail_id == trail.id)
        .map(|d| d.spot_id.as_str())
        .collect();

    // In sequence mode only this spot is unlockable right now
    let next_in_sequence: Option<&str> = match trail.options.discovery_mode {
        DiscoveryMode::Sequence => trail_spot_ids
            .iter()
            .map(String::as_str)
            .find(|id| !discovered.contains(id)),
        DiscoveryMode::Free => None,
    };

    let mut found = Vec::new();
    for spot in spots {
        if spot.created_by == account_id || discovered.contains(spot.id.as_str()) {
            continue;
        }
        if trail.options.discovery_mode == DiscoveryMode::Sequence
            && next_in_sequence != Some(spot.id.as_str())
        {
            continue;
        }

        let distance = haversine_distance(&location, &spot.location);
        if distance <= spot.options.discovery_radius {
            debug!(
                "[Discovery] account={} spot={} distance={:.1}m radius={:.1}m",
                account_id, spot.id, distance, spot.options.discovery_radius
            );
            found.push(Discovery::new(
                account_id,
                spot.id.clone(),
                trail.id.clone(),
                now,
                None,
            ));
        }
    }

    if found.is_empty() {
        return Ok(DiscoveryOutcome::NoChange);
    }
    info!(
        "[Discovery] account={} trail={} new_discoveries={}",
        account_id,
        trail.id,
        found.len()
    );
    Ok(DiscoveryOutcome::NewDiscoveries(found))
}

/// Turn a scan event's discovery candidates into new discoveries.
///
/// Returns `NoChange` for unsuccessful scans and when every candidate was
/// already discovered. In `Free` mode every remaining candidate discovers;
/// in `Sequence` mode only the candidate earliest in `trail_spot_ids`
/// discovers and the rest wait for a future scan.
pub fn process_scan_event(
    scan_event: &ScanEvent,
    trail: &Trail,
    existing_discoveries: &[Discovery],
    trail_spot_ids: &[String],
) -> DiscoveryOutcome {
    if !scan_event.successful || scan_event.candidates.is_empty() {
        return DiscoveryOutcome::NoChange;
    }

    let account_id = scan_event.account_id.as_str();
    let discovered: HashSet<&str> = existing_discoveries
        .iter()
        .filter(|d| d.account_id == account_id && d.trail_id == trail.id)
        .map(|d| d.spot_id.as_str())
        .collect();

    let mut remaining: Vec<&str> = scan_event
        .candidates
        .iter()
        .map(|c| c.spot_id.as_str())
        .filter(|id| !discovered.contains(id))
        .collect();
    if remaining.is_empty() {
        return DiscoveryOutcome::NoChange;
    }

    if trail.options.discovery_mode == DiscoveryMode::Sequence {
        // Keep only the candidate earliest in trail order; unlisted spots
        // sort last
        let trail_position = |spot_id: &str| {
            trail_spot_ids
                .iter()
                .position(|id| id == spot_id)
                .unwrap_or(usize::MAX)
        };
        let first = remaining.iter().copied().min_by_key(|id| trail_position(id));
        if let Some(first) = first {
            remaining = vec![first];
        }
    }

    let found: Vec<Discovery> = remaining
        .into_iter()
        .map(|spot_id| {
            Discovery::new(
                account_id,
                spot_id,
                trail.id.clone(),
                scan_event.scanned_at,
                Some(scan_event.id.clone()),
            )
        })
        .collect();

    info!(
        "[Discovery] account={} trail={} scan={} new_discoveries={}",
        account_id,
        trail.id,
        scan_event.id,
        found.len()
    );
    DiscoveryOutcome::NewDiscoveries(found)
}

// ============================================================================
// Snap Feedback
// ============================================================================

/// Proximity feedback toward the nearest undiscovered spot.
///
/// `None` when every spot is already discovered (nothing left to explore).
/// Intensity is 1.0 standing on the spot and decays linearly to 0.0 at
/// `config.snap_max_range`.
pub fn get_discovery_snap(
    location: &GeoLocation,
    spots: &[Spot],
    discovered_spot_ids: &[String],
    config: &ScanConfig,
) -> Option<DiscoverySnap> {
    let distance = spots
        .iter()
        .filter(|s| !discovered_spot_ids.iter().any(|id| id == &s.id))
        .map(|s| haversine_distance(location, &s.location))
        .min_by(f64::total_cmp)?;

    let intensity = (1.0 - distance / config.snap_max_range).clamp(0.0, 1.0);
    Some(DiscoverySnap {
        distance,
        intensity,
    })
}
