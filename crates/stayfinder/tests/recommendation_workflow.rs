//! End-to-end ranking: a catalog loaded from CSV, a stored profile, and the scoring engine.

use std::io::Cursor;

use stayfinder::workflows::catalog::{synthetic, CatalogSnapshot, ListingId};
use stayfinder::workflows::profiles::{NewProfile, ProfileStore};
use stayfinder::workflows::recommendations::{
    RecommendationEngine, ScoringWeights, UserPreference,
};

const CATALOG: &str = "\
listing_id,name,location,property_type,accommodates,amenities,price,min_nights,max_nights,review_rating,tags
1,Shoreline Retreat,Grand Bend,Entire home,4,\"wifi,kayaks\",150,2,14,5.0,\"beach,lake\"
2,Maple Lane House,Stratford,Entire home,4,wifi,150,2,14,5.0,\"theatre,quiet\"
3,Penthouse,Toronto,Entire condo,2,\"gym,wifi\",420,1,30,4.9,\"city,nightlife\"
4,Bunkie,Tobermory,Cabin,1,,110,1,7,4.8,\"beach,hiking\"
5,Budget Beach Room,Wasaga Beach,Private room,2,,105,1,5,not rated,
";

fn catalog() -> CatalogSnapshot {
    CatalogSnapshot::from_reader(Cursor::new(CATALOG)).expect("catalog parses")
}

fn beach_couple() -> UserPreference {
    UserPreference {
        budget_min: 100.0,
        budget_max: 200.0,
        group_size: 2,
        preferred_environment: "beach".to_string(),
    }
}

#[test]
fn environment_match_ranks_first_among_equals() {
    let catalog = catalog();
    let engine = RecommendationEngine::default();

    let ranked = engine.recommend(&beach_couple(), catalog.listings(), 2);
    let ids: Vec<_> = ranked.iter().map(|listing| listing.id).collect();
    assert_eq!(ids, vec![ListingId(1), ListingId(2)]);

    let scores = engine.explain(&beach_couple(), catalog.listings(), 2);
    assert!((scores[0].total - 100.0).abs() < 1e-9);
    assert!((scores[1].total - 70.0).abs() < 1e-9);
}

#[test]
fn capacity_and_budget_are_hard_limits() {
    let catalog = catalog();
    let ranked = RecommendationEngine::default().recommend(&beach_couple(), catalog.listings(), 10);
    let ids: Vec<_> = ranked.iter().map(|listing| listing.id).collect();

    assert!(!ids.contains(&ListingId(3)), "over budget");
    assert!(!ids.contains(&ListingId(4)), "too small for the group");
    assert_eq!(ids.len(), 3);
}

#[test]
fn zero_width_budget_still_gives_full_price_credit() {
    let catalog = catalog();
    let preference = UserPreference {
        budget_min: 150.0,
        budget_max: 150.0,
        group_size: 2,
        preferred_environment: String::new(),
    };
    let scores = RecommendationEngine::default().explain(&preference, catalog.listings(), 5);

    assert_eq!(scores.len(), 2);
    assert!(scores.iter().all(|score| (score.price_proximity - 40.0).abs() < 1e-9));
    assert!(scores.iter().all(|score| score.environment == 0.0));
}

#[test]
fn stored_profile_drives_recommendations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ProfileStore::open(dir.path().join("users.json")).expect("open store");
    let profile = store
        .create(NewProfile {
            name: "Ada".to_string(),
            group_size: 2,
            preferred_environment: "BEACH".to_string(),
            budget_min: 100.0,
            budget_max: 200.0,
        })
        .expect("profile created");

    let catalog = catalog();
    let ranked =
        RecommendationEngine::default().recommend(&profile.preference(), catalog.listings(), 1);
    assert_eq!(ranked[0].id, ListingId(1));
}

#[test]
fn custom_weights_change_the_ranking() {
    let catalog = catalog();
    let price_only = RecommendationEngine::new(ScoringWeights {
        price: 100.0,
        environment: 0.0,
        rating: 0.0,
    });
    let preference = UserPreference {
        budget_min: 100.0,
        budget_max: 120.0,
        group_size: 2,
        preferred_environment: String::new(),
    };

    let ranked = price_only.recommend(&preference, catalog.listings(), 3);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].id, ListingId(5));
}

#[test]
fn generated_listings_join_a_fresh_snapshot() {
    let catalog = catalog();
    let generated = synthetic::extract_listings(
        "Sure! [{\"name\": \"Generated Dune Loft\", \"location\": \"Sauble Beach\", \"accommodates\": 2, \"price\": 150, \"review_rating\": 4.95, \"tags\": \"beach\"}]",
    )
    .expect("generated rows");

    let merged = catalog.merged_with(generated);
    assert_eq!(catalog.len(), 5);
    assert_eq!(merged.len(), 6);

    let ranked = RecommendationEngine::default().recommend(&beach_couple(), merged.listings(), 2);
    let ids: Vec<_> = ranked.iter().map(|listing| listing.id).collect();
    assert_eq!(ids, vec![ListingId(1), ListingId(6)]);
}
