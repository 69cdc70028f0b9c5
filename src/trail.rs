//! Trail statistics: completion progress and leaderboard ranking.
//!
//! Pure aggregation over a trail's full discovery history. Only discoveries
//! whose spot appears in the caller-supplied canonical spot-id list count
//! toward progress and rank; discoveries for spots since removed from the
//! trail are ignored.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{CompletionStatus, Discovery, LeaderboardEntry, TrailStats};

/// Build the trail leaderboard: one entry per account with at least one
/// discovery on the trail, ordered best-first.
///
/// Ordering is a total order independent of input order: distinct discovered
/// trail-spots descending, then earlier `latest_discovery_at` (whoever
/// reached that count first ranks higher), then account id.
pub fn compute_leaderboard(
    trail_id: &str,
    all_discoveries: &[Discovery],
    trail_spot_ids: &[String],
) -> Vec<LeaderboardEntry> {
    let trail_spots: HashSet<&str> = trail_spot_ids.iter().map(String::as_str).collect();

    struct Tally<'a> {
        spots: HashSet<&'a str>,
        latest_counted: i64,
        latest_any: i64,
    }

    let mut per_account: HashMap<&str, Tally> = HashMap::new();
    for d in all_discoveries.iter().filter(|d| d.trail_id == trail_id) {
        let tally = per_account
            .entry(d.account_id.as_str())
            .or_insert_with(|| Tally {
                spots: HashSet::new(),
                latest_counted: i64::MIN,
                latest_any: i64::MIN,
            });
        tally.latest_any = tally.latest_any.max(d.discovered_at);
        if trail_spots.contains(d.spot_id.as_str()) {
            tally.spots.insert(d.spot_id.as_str());
            tally.latest_counted = tally.latest_counted.max(d.discovered_at);
        }
    }

    let mut entries: Vec<LeaderboardEntry> = per_account
        .into_iter()
        .map(|(account_id, tally)| LeaderboardEntry {
            account_id: account_id.to_string(),
            discovered_spots: tally.spots.len() as u32,
            latest_discovery_at: if tally.spots.is_empty() {
                tally.latest_any
            } else {
                tally.latest_counted
            },
        })
        .collect();

    entries.sort_by(|a, b| {
        b.discovered_spots
            .cmp(&a.discovered_spots)
            .then(a.latest_discovery_at.cmp(&b.latest_discovery_at))
            .then(a.account_id.cmp(&b.account_id))
    });
    entries
}

/// Aggregate one account's standing on a trail.
pub fn get_trail_stats(
    account_id: &str,
    trail_id: &str,
    all_discoveries: &[Discovery],
    trail_spot_ids: &[String],
) -> TrailStats {
    let leaderboard = compute_leaderboard(trail_id, all_discoveries, trail_spot_ids);
    let position = leaderboard
        .iter()
        .position(|e| e.account_id == account_id);
    let discovered_spots = position
        .map(|i| leaderboard[i].discovered_spots)
        .unwrap_or(0);
    let total_spots = trail_spot_ids.len() as u32;

    let progress_percentage = if total_spots == 0 {
        0
    } else {
        (100.0 * discovered_spots as f64 / total_spots as f64).round() as u32
    };

    let completion_status = if discovered_spots == 0 {
        CompletionStatus::NotStarted
    } else if discovered_spots == total_spots {
        CompletionStatus::Completed
    } else {
        CompletionStatus::InProgress
    };

    let rank = match position {
        Some(i) if discovered_spots > 0 => (i + 1) as u32,
        _ => 0,
    };

    let stats = TrailStats {
        discovered_spots,
        total_spots,
        progress_percentage,
        completion_status,
        rank,
        total_discoverers: leaderboard.len() as u32,
        average_time_between_discoveries: average_discovery_gap(
            account_id,
            trail_id,
            all_discoveries,
        ),
    };
    debug!(
        "[TrailStats] account={} trail={} {}/{} rank={}",
        account_id, trail_id, stats.discovered_spots, stats.total_spots, stats.rank
    );
    stats
}

/// Whether the account has discovered every spot on the trail.
pub fn is_trail_completed(
    account_id: &str,
    trail_id: &str,
    all_discoveries: &[Discovery],
    trail_spot_ids: &[String],
) -> bool {
    get_trail_stats(account_id, trail_id, all_discoveries, trail_spot_ids).completion_status
        == CompletionStatus::Completed
}

/// Mean seconds between the account's consecutive discoveries on the trail.
///
/// `None` with fewer than two discoveries.
fn average_discovery_gap(
    account_id: &str,
    trail_id: &str,
    all_discoveries: &[Discovery],
) -> Option<f64> {
    let mut times: Vec<i64> = all_discoveries
        .iter()
        .filter(|d| d.account_id == account_id && d.trail_id == trail_id)
        .map(|d| d.discovered_at)
        .collect();
    if times.len() < 2 {
        return None;
    }
    times.sort_unstable();

    let total_gap: i64 = times.windows(2).map(|w| w[1] - w[0]).sum();
    Some(total_gap as f64 / (times.len() - 1) as f64)
}
