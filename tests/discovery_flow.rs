//! End-to-end walk of a sequential trail: scans, location updates, snap
//! guidance, trail statistics, and ratings, the way an embedding service
//! would drive the engine.

use spot_discovery::{
    compute_leaderboard, create_spot_rating, enrich_spot_with_source, filter_spot_by_source,
    generate_scan_event, get_discovered_spot_ids, get_discovery_snap, get_new_discoveries,
    get_spot_rating_summary, get_trail_stats, is_trail_completed, process_scan_event,
    CompletionStatus, Discovery, DiscoveryMode, DiscoveryOutcome, GeoLocation, ScanConfig, Spot,
    SpotSource, Trail, TrailOptions,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn spot(id: &str, name: &str, lat: f64, lng: f64, created_by: &str) -> Spot {
    let mut spot = Spot::new(id, name, GeoLocation::new(lat, lng), created_by);
    spot.description = format!("{name}, worth the detour");
    spot.image_url = Some(format!("https://img.example/{id}.jpg"));
    spot
}

/// Three trail spots heading north, a clue-only viewpoint off to the side,
/// and a spot created by the walking account itself.
fn catalog() -> Vec<Spot> {
    vec![
        spot("s1", "Old Lighthouse", 51.5000, -0.1000, "curator"),
        // ~17 m from s1, inside the default 25 m discovery radius
        spot("s2", "Fisherman's Arch", 51.50015, -0.1000, "curator"),
        // ~1.1 km north
        spot("s3", "Cliff Stairs", 51.5100, -0.1000, "curator"),
        // ~144 m from s1: clue ring only
        spot("viewpoint", "Harbour Viewpoint", 51.5013, -0.1000, "curator"),
        spot("mine", "Alice's Bench", 51.5000, -0.1000, "alice"),
    ]
}

fn sequence_trail() -> (Trail, Vec<String>) {
    let trail = Trail::new(
        "harbour-walk",
        "Harbour Walk",
        TrailOptions {
            discovery_mode: DiscoveryMode::Sequence,
            scanner_radius: 500.0,
        },
    );
    let order = vec!["s1".to_string(), "s2".to_string(), "s3".to_string()];
    (trail, order)
}

#[test]
fn walk_a_sequential_trail_to_completion() {
    init_logging();
    let spots = catalog();
    let (trail, order) = sequence_trail();
    let config = ScanConfig::default();
    let mut persisted: Vec<Discovery> = Vec::new();

    // --- First scan, standing on s1. s1 and s2 are both in discovery
    // range, but sequence mode unlocks only s1; the viewpoint surfaces as a
    // clue and alice's own bench stays invisible.
    let start = GeoLocation::new(51.5000, -0.1000);
    let scan1 = generate_scan_event(
        "alice",
        start,
        &spots,
        trail.options.scanner_radius,
        &persisted,
        Some(&trail.id),
        1_700_000_000,
    )
    .unwrap();

    assert!(scan1.successful);
    let candidate_ids: Vec<&str> = scan1.candidates.iter().map(|c| c.spot_id.as_str()).collect();
    assert_eq!(candidate_ids, vec!["s1", "s2"]);
    assert_eq!(scan1.clues.len(), 1);
    assert_eq!(scan1.clues[0].spot_id, "viewpoint");

    match process_scan_event(&scan1, &trail, &persisted, &order) {
        DiscoveryOutcome::NewDiscoveries(found) => {
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].spot_id, "s1");
            assert_eq!(found[0].scan_event_id.as_deref(), Some(scan1.id.as_str()));
            persisted.extend(found);
        }
        DiscoveryOutcome::NoChange => panic!("first scan must discover s1"),
    }

    // --- Second scan from the same place unlocks the deferred s2.
    let scan2 = generate_scan_event(
        "alice",
        start,
        &spots,
        trail.options.scanner_radius,
        &persisted,
        Some(&trail.id),
        1_700_000_600,
    )
    .unwrap();
    match process_scan_event(&scan2, &trail, &persisted, &order) {
        DiscoveryOutcome::NewDiscoveries(found) => {
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].spot_id, "s2");
            persisted.extend(found);
        }
        DiscoveryOutcome::NoChange => panic!("second scan must discover s2"),
    }

    // Re-processing the same scan against the updated history is a no-op:
    // the at-most-one-discovery invariant over the snapshot.
    assert!(process_scan_event(&scan2, &trail, &persisted, &order).is_no_change());

    // --- Snap guidance toward s3. From the start it is out of snap range;
    // halfway up the street the needle starts moving.
    let trail_spots: Vec<Spot> = spots
        .iter()
        .filter(|s| order.contains(&s.id))
        .cloned()
        .collect();
    let discovered = get_discovered_spot_ids("alice", &persisted, Some(&trail.id));
    assert_eq!(discovered, vec!["s1".to_string(), "s2".to_string()]);

    let far_snap = get_discovery_snap(&start, &trail_spots, &discovered, &config).unwrap();
    assert_eq!(far_snap.intensity, 0.0);
    assert!(far_snap.distance > 1_000.0);

    let halfway = GeoLocation::new(51.5080, -0.1000);
    let near_snap = get_discovery_snap(&halfway, &trail_spots, &discovered, &config).unwrap();
    assert!(near_snap.intensity > 0.0 && near_snap.intensity < 1.0);
    assert!(near_snap.distance < far_snap.distance);

    // --- Arriving at s3, the passive location update completes the trail.
    let outcome = get_new_discoveries(
        "alice",
        GeoLocation::new(51.5100, -0.1000),
        &spots,
        &persisted,
        &trail,
        &order,
        1_700_001_200,
    )
    .unwrap();
    match outcome {
        DiscoveryOutcome::NewDiscoveries(found) => {
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].spot_id, "s3");
            persisted.extend(found);
        }
        DiscoveryOutcome::NoChange => panic!("location update must discover s3"),
    }

    assert!(is_trail_completed("alice", &trail.id, &persisted, &order));
    assert!(get_discovery_snap(
        &GeoLocation::new(51.5100, -0.1000),
        &trail_spots,
        &get_discovered_spot_ids("alice", &persisted, Some(&trail.id)),
        &config,
    )
    .is_none());

    // --- Bob finds only the first spot; stats and leaderboard reflect it.
    persisted.push(Discovery::new(
        "bob",
        "s1",
        trail.id.clone(),
        1_700_002_000,
        None,
    ));

    let alice_stats = get_trail_stats("alice", &trail.id, &persisted, &order);
    assert_eq!(alice_stats.discovered_spots, 3);
    assert_eq!(alice_stats.progress_percentage, 100);
    assert_eq!(alice_stats.completion_status, CompletionStatus::Completed);
    assert_eq!(alice_stats.rank, 1);
    assert_eq!(alice_stats.total_discoverers, 2);
    // Discoveries at +0 s, +600 s, +1200 s
    assert_eq!(alice_stats.average_time_between_discoveries, Some(600.0));

    let bob_stats = get_trail_stats("bob", &trail.id, &persisted, &order);
    assert_eq!(bob_stats.rank, 2);
    assert_eq!(bob_stats.progress_percentage, 33);
    assert_eq!(bob_stats.completion_status, CompletionStatus::InProgress);

    let board = compute_leaderboard(&trail.id, &persisted, &order);
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].account_id, "alice");
    assert_eq!(board[0].discovered_spots, 3);

    // --- Bob's view of the undiscovered s3 is a redacted preview.
    let s3 = spots.iter().find(|s| s.id == "s3").unwrap();
    let enriched = enrich_spot_with_source(s3, "bob", &persisted);
    assert_eq!(enriched.source, Some(SpotSource::Preview));
    let visible = filter_spot_by_source(&enriched, &config).unwrap();
    assert_eq!(visible.description, "");
    assert_eq!(visible.image_url, None);
    assert_eq!(visible.location, GeoLocation::new(51.51, -0.10));

    // Alice discovered it, so she sees it whole.
    let alice_view = enrich_spot_with_source(s3, "alice", &persisted);
    assert_eq!(alice_view.source, Some(SpotSource::Discovery));
    assert_eq!(
        filter_spot_by_source(&alice_view, &config).unwrap(),
        alice_view
    );

    // --- Ratings: re-rating upserts on the same deterministic id.
    let first = create_spot_rating("alice", "s3", 4);
    let second = create_spot_rating("alice", "s3", 5);
    assert_eq!(first.id, second.id);

    let ratings = vec![second, create_spot_rating("bob", "s3", 3)];
    let summary = get_spot_rating_summary("s3", &ratings, "alice");
    assert_eq!(summary.average, 4.0);
    assert_eq!(summary.count, 2);
    assert_eq!(summary.user_rating, Some(5));
}

#[test]
fn scan_events_serialize_to_camel_case_json() {
    init_logging();
    let spots = catalog();
    let (trail, _) = sequence_trail();

    let scan = generate_scan_event(
        "alice",
        GeoLocation::new(51.5000, -0.1000),
        &spots,
        trail.options.scanner_radius,
        &[],
        Some(&trail.id),
        1_700_000_000,
    )
    .unwrap();

    let json = serde_json::to_value(&scan).unwrap();
    assert_eq!(json["accountId"], "alice");
    assert_eq!(json["trailId"], "harbour-walk");
    assert_eq!(json["radiusUsed"], 500.0);
    assert_eq!(json["scannedAt"], 1_700_000_000i64);
    assert_eq!(json["candidates"][0]["spotId"], "s1");
    assert_eq!(json["clues"][0]["source"], "scanEvent");
    assert_eq!(json["location"]["latitude"], 51.5);

    // The record round-trips losslessly
    let back: spot_discovery::ScanEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, scan);
}
