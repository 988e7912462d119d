//! Integration tests for the exploration service
//!
//! Tests cover:
//! - Pair cascade over a whole session until exhaustion
//! - Lazy genre population and insufficient candidates
//! - Skip policies
//! - Weights and recommendations over SQLite-backed stores

use mtr_common::db::init::{init_database, init_memory_database};
use mtr_common::db::{SqliteCatalogStore, SqlitePool, SqliteSessionStore};
use mtr_common::{
    Band, CatalogStore, MemoryCatalogStore, MemorySessionStore, PairKey, Session, SessionStore,
    SkipPolicy, Tier,
};
use mtr_te::catalog::CatalogSeeder;
use mtr_te::config::ExplorerConfig;
use mtr_te::engine::{ExploreError, PairOutcome, TasteExplorer};
use std::collections::HashSet;
use std::sync::Arc;

const SEED: &str = include_str!("../data/seed_bands.json");

fn seeded_config() -> ExplorerConfig {
    ExplorerConfig {
        rng_seed: Some(2024),
        ..Default::default()
    }
}

fn memory_explorer(bands: Vec<Band>, seeder: CatalogSeeder, config: ExplorerConfig) -> TasteExplorer {
    TasteExplorer::new(
        Arc::new(MemoryCatalogStore::with_bands(bands)),
        Arc::new(MemorySessionStore::new()),
        seeder,
        config,
    )
}

fn expect_pair(outcome: PairOutcome) -> (String, String) {
    match outcome {
        PairOutcome::Pair(pair) => (pair.band1.id, pair.band2.id),
        PairOutcome::Exhausted => panic!("expected a pair, got Exhausted"),
    }
}

#[tokio::test]
async fn test_three_well_known_bands_give_three_pairs_then_exhaust() {
    let bands = vec![
        Band::new("a", "Anthrax", &["thrash"], Tier::WellKnown),
        Band::new("b", "Metallica", &["thrash"], Tier::WellKnown),
        Band::new("c", "Slayer", &["thrash"], Tier::WellKnown),
    ];
    let explorer = memory_explorer(bands, CatalogSeeder::empty(), seeded_config());
    let session = explorer.start_session("thrash").await.unwrap();

    let mut seen = HashSet::new();
    for _ in 0..3 {
        let (first, second) = expect_pair(explorer.next_pair(&session.id).await.unwrap());
        assert_ne!(first, second);
        assert!(seen.insert(PairKey::new(&first, &second)), "pair offered twice");
        explorer
            .record_preference(&session.id, &first, &second, &first)
            .await
            .unwrap();
    }

    let expected: HashSet<PairKey> = [
        PairKey::new("a", "b"),
        PairKey::new("a", "c"),
        PairKey::new("b", "c"),
    ]
    .into_iter()
    .collect();
    assert_eq!(seen, expected);
    assert_eq!(
        explorer.next_pair(&session.id).await.unwrap(),
        PairOutcome::Exhausted
    );
}

#[tokio::test]
async fn test_next_pair_populates_an_empty_genre() {
    let catalog = Arc::new(MemoryCatalogStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let explorer = TasteExplorer::new(
        catalog.clone(),
        sessions.clone(),
        CatalogSeeder::from_json_str(SEED).unwrap(),
        seeded_config(),
    );

    // Session created behind the service's back, so nothing was populated yet
    let session = Session::new("doom");
    sessions.create_session(&session).await.unwrap();
    assert!(catalog.is_empty().await);

    let (first, second) = expect_pair(explorer.next_pair(&session.id).await.unwrap());
    assert_ne!(first, second);
    assert_eq!(catalog.bands_by_genre("doom").await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_single_band_genre_is_insufficient() {
    let bands = vec![Band::new("f1", "Skyclad", &["folk"], Tier::Popular)];
    let explorer = memory_explorer(bands, CatalogSeeder::empty(), seeded_config());
    let session = explorer.start_session("folk").await.unwrap();

    let err = explorer.next_pair(&session.id).await.unwrap_err();
    assert!(matches!(
        err,
        ExploreError::InsufficientCandidates { ref genre, available: 1 } if genre == "folk"
    ));
}

#[tokio::test]
async fn test_skip_policy_controls_reoffering() {
    let bands = || {
        vec![
            Band::new("d1", "Candlemass", &["doom"], Tier::WellKnown),
            Band::new("d2", "Trouble", &["doom"], Tier::Popular),
        ]
    };

    let retire = memory_explorer(bands(), CatalogSeeder::empty(), seeded_config());
    let session = retire.start_session("doom").await.unwrap();
    retire.record_skip(&session.id, "d1", "d2").await.unwrap();
    assert_eq!(retire.next_pair(&session.id).await.unwrap(), PairOutcome::Exhausted);

    let eligible_config = ExplorerConfig {
        skip_policy: SkipPolicy::Eligible,
        ..seeded_config()
    };
    let eligible = memory_explorer(bands(), CatalogSeeder::empty(), eligible_config);
    let session = eligible.start_session("doom").await.unwrap();
    eligible.record_skip(&session.id, "d1", "d2").await.unwrap();
    let (first, second) = expect_pair(eligible.next_pair(&session.id).await.unwrap());
    assert_eq!(PairKey::new(&first, &second), PairKey::new("d1", "d2"));

    // Skips never move weights
    let summary = eligible.session_summary(&session.id).await.unwrap();
    assert!(summary.preference_weights.is_empty());
    assert_eq!(summary.skip_count, 1);
}

#[tokio::test]
async fn test_seeded_thrash_session_starts_with_well_known_pairs() {
    let pool = init_memory_database().await.unwrap();
    let explorer = TasteExplorer::new(
        Arc::new(SqliteCatalogStore::new(pool.clone())),
        Arc::new(SqliteSessionStore::new(pool)),
        CatalogSeeder::from_json_str(SEED).unwrap(),
        seeded_config(),
    );
    let session = explorer.start_session("Thrash").await.unwrap();
    assert_eq!(session.genre, "thrash");

    let well_known: HashSet<&str> = ["band_metallica", "band_slayer", "band_megadeth", "band_anthrax"]
        .into_iter()
        .collect();

    let mut offered = HashSet::new();
    loop {
        match explorer.next_pair(&session.id).await.unwrap() {
            PairOutcome::Pair(pair) => {
                assert!(offered.insert(pair.key()), "pair offered twice: {:?}", pair.key());
                if offered.len() <= 6 {
                    assert!(well_known.contains(pair.band1.id.as_str()));
                    assert!(well_known.contains(pair.band2.id.as_str()));
                }
                explorer
                    .record_preference(&session.id, &pair.band1.id, &pair.band2.id, &pair.band2.id)
                    .await
                    .unwrap();
            }
            PairOutcome::Exhausted => break,
        }
        assert!(offered.len() <= 36, "more pairs than nine bands allow");
    }

    let summary = explorer.session_summary(&session.id).await.unwrap();
    assert_eq!(summary.comparison_count, offered.len());
    assert!(summary.preference_weights.get("thrash") > 0);
}

#[tokio::test]
async fn test_preferences_drive_recommendations() {
    let pool = init_memory_database().await.unwrap();
    let catalog = Arc::new(SqliteCatalogStore::new(pool.clone()));
    let explorer = TasteExplorer::new(
        catalog.clone(),
        Arc::new(SqliteSessionStore::new(pool)),
        CatalogSeeder::from_json_str(SEED).unwrap(),
        seeded_config(),
    );
    let session = explorer.start_session("thrash").await.unwrap();

    // Slayer (thrash, speed) beats Exodus; Kreator (thrash, teutonic) beats Dark Angel
    explorer
        .record_preference(&session.id, "band_slayer", "band_exodus", "band_slayer")
        .await
        .unwrap();
    explorer
        .record_preference(&session.id, "band_dark_angel", "band_kreator", "band_kreator")
        .await
        .unwrap();

    let summary = explorer.session_summary(&session.id).await.unwrap();
    assert_eq!(summary.preference_weights.get("thrash"), 2);
    assert_eq!(summary.preference_weights.get("speed"), 1);
    assert_eq!(summary.preference_weights.get("teutonic"), 1);

    // Same comparison again is rejected and changes nothing
    let err = explorer
        .record_preference(&session.id, "band_exodus", "band_slayer", "band_exodus")
        .await
        .unwrap_err();
    assert!(matches!(err, ExploreError::InvalidComparison(_)));
    assert_eq!(
        explorer.session_summary(&session.id).await.unwrap().comparison_count,
        2
    );

    let recs = explorer.recommendations(&session.id).await.unwrap();
    let ids: Vec<&str> = recs.iter().map(|r| r.band.id.as_str()).collect();
    for compared in ["band_slayer", "band_exodus", "band_kreator", "band_dark_angel"] {
        assert!(!ids.contains(&compared), "{} should be excluded", compared);
    }
    // Megadeth (thrash, speed) outscores the other well-known bands
    assert_eq!(ids[0], "band_megadeth");
    assert_eq!(recs[0].band.tier, Tier::WellKnown);
    assert_eq!(recs[1].band.tier, Tier::WellKnown);
    assert_eq!(recs[2].band.tier, Tier::Popular);
    assert!(recs.iter().all(|r| r.confidence <= 0.95));

    let suggestions = explorer.suggestions(&session.id, 2).await.unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].band.id, "band_megadeth");
    assert!(suggestions.iter().all(|r| r.confidence <= 0.9));
}

#[tokio::test]
async fn test_catalog_picks_for_seeded_genre() {
    let explorer = memory_explorer(
        Vec::new(),
        CatalogSeeder::from_json_str(SEED).unwrap(),
        seeded_config(),
    );
    explorer.populate_configured_genres().await.unwrap();

    let picks = explorer.catalog_picks("heavy").await.unwrap();
    assert_eq!(picks.len(), 8);
    assert_eq!(picks[0].id, "band_iron_maiden");

    assert!(explorer.catalog_picks("zydeco").await.unwrap().is_empty());
    assert!(matches!(
        explorer.catalog_picks(" ").await,
        Err(ExploreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_session_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("mtr.db");

    let open = |pool: SqlitePool| {
        TasteExplorer::new(
            Arc::new(SqliteCatalogStore::new(pool.clone())),
            Arc::new(SqliteSessionStore::new(pool)),
            CatalogSeeder::from_json_str(SEED).unwrap(),
            seeded_config(),
        )
    };

    let pool = init_database(&db_path).await.unwrap();
    let explorer = open(pool.clone());
    let session = explorer.start_session("black").await.unwrap();
    explorer
        .record_preference(&session.id, "band_mayhem", "band_emperor", "band_emperor")
        .await
        .unwrap();
    drop(explorer);
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let explorer = open(pool);
    let summary = explorer.session_summary(&session.id).await.unwrap();
    assert_eq!(summary.comparison_count, 1);
    assert_eq!(summary.preference_weights.get("symphonic"), 1);
    assert_eq!(summary.preference_weights.get("black"), 1);

    // Catalog was not duplicated by the second population pass
    explorer.populate_configured_genres().await.unwrap();
    let picks = explorer.catalog_picks("black").await.unwrap();
    assert_eq!(picks.len(), 6);
}
