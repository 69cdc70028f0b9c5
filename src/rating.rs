//! Spot rating aggregation with deterministic record identity.
//!
//! A rating's id is a function of `(account_id, spot_id)` alone, so a
//! storage layer treats re-rating as an upsert on the same record instead of
//! accumulating one row per rating action.

use log::debug;

use crate::{deterministic_id, RatingSummary, SpotRating};

/// The deterministic id shared by every rating the account gives this spot.
pub fn spot_rating_id(account_id: &str, spot_id: &str) -> String {
    deterministic_id("rating", &[account_id, spot_id])
}

/// Create a rating record, clamping the value into [1, 5].
///
/// Out-of-range values are coerced, not rejected; hard validation belongs to
/// the schema at the API boundary.
pub fn create_spot_rating(account_id: &str, spot_id: &str, rating: u8) -> SpotRating {
    let clamped = rating.clamp(1, 5);
    if clamped != rating {
        debug!(
            "[Rating] account={} spot={} clamped {} -> {}",
            account_id, spot_id, rating, clamped
        );
    }
    SpotRating {
        id: spot_rating_id(account_id, spot_id),
        spot_id: spot_id.to_string(),
        account_id: account_id.to_string(),
        rating: clamped,
    }
}

/// Aggregate the ratings for one spot.
///
/// Average is 0.0 with no ratings (never a division by zero); `user_rating`
/// is the querying account's own rating when present.
pub fn get_spot_rating_summary(
    spot_id: &str,
    ratings: &[SpotRating],
    account_id: &str,
) -> RatingSummary {
    let mut count = 0u32;
    let mut sum = 0u32;
    let mut user_rating = None;
    for r in ratings.iter().filter(|r| r.spot_id == spot_id) {
        count += 1;
        sum += r.rating as u32;
        if r.account_id == account_id {
            user_rating = Some(r.rating);
        }
    }

    let average = if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    };
    RatingSummary {
        average,
        count,
        user_rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_averages_and_finds_user_rating() {
        let ratings = vec![
            create_spot_rating("alice", "s1", 4),
            create_spot_rating("bob", "s1", 2),
        ];
        let summary = get_spot_rating_summary("s1", &ratings, "alice");
        assert_eq!(summary.average, 3.0);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.user_rating, Some(4));
    }

    #[test]
    fn test_summary_of_no_ratings() {
        let summary = get_spot_rating_summary("s1", &[], "alice");
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.user_rating, None);
    }

    #[test]
    fn test_summary_ignores_other_spots() {
        let ratings = vec![
            create_spot_rating("alice", "s1", 5),
            create_spot_rating("alice", "s2", 1),
        ];
        let summary = get_spot_rating_summary("s1", &ratings, "bob");
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average, 5.0);
        assert_eq!(summary.user_rating, None);
    }

    #[test]
    fn test_rating_is_clamped() {
        assert_eq!(create_spot_rating("alice", "s1", 0).rating, 1);
        assert_eq!(create_spot_rating("alice", "s1", 6).rating, 5);
        assert_eq!(create_spot_rating("alice", "s1", 3).rating, 3);
    }

    #[test]
    fn test_rating_id_ignores_the_value() {
        let first = create_spot_rating("alice", "s1", 2);
        let second = create_spot_rating("alice", "s1", 5);
        assert_eq!(first.id, second.id);

        // Different account or spot, different record
        assert_ne!(first.id, create_spot_rating("bob", "s1", 2).id);
        assert_ne!(first.id, create_spot_rating("alice", "s2", 2).id);
    }
}
