use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, PoisonError, RwLock};
use stayfinder::config::{RecommendationConfig, StorageConfig};
use stayfinder::error::AppError;
use stayfinder::workflows::bookings::{JsonFileLedger, ReservationEngine};
use stayfinder::workflows::catalog::{CatalogSnapshot, Listing, ListingId};
use stayfinder::workflows::favorites::FavoritesStore;
use stayfinder::workflows::profiles::{ProfileStore, UserId, UserProfile};
use stayfinder::workflows::recommendations::RecommendationEngine;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything a request or command needs: the catalog snapshot plus the stores.
pub(crate) struct ApiContext {
    catalog: RwLock<Arc<CatalogSnapshot>>,
    pub(crate) bookings: ReservationEngine<JsonFileLedger>,
    pub(crate) profiles: ProfileStore,
    pub(crate) favorites: FavoritesStore,
    pub(crate) recommender: RecommendationEngine,
    pub(crate) default_top_n: usize,
}

impl ApiContext {
    pub(crate) fn open(
        storage: &StorageConfig,
        recommendations: &RecommendationConfig,
    ) -> Result<Self, AppError> {
        let catalog = if storage.listings_csv.exists() {
            CatalogSnapshot::from_path(&storage.listings_csv)?
        } else {
            warn!(
                path = %storage.listings_csv.display(),
                "listings CSV not found; starting with an empty catalog"
            );
            CatalogSnapshot::default()
        };

        Ok(Self {
            catalog: RwLock::new(Arc::new(catalog)),
            bookings: ReservationEngine::open(JsonFileLedger::new(&storage.bookings_file))?,
            profiles: ProfileStore::open(&storage.users_file)?,
            favorites: FavoritesStore::open(&storage.favorites_file)?,
            recommender: RecommendationEngine::default(),
            default_top_n: recommendations.default_top_n,
        })
    }

    pub(crate) fn catalog(&self) -> Arc<CatalogSnapshot> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new snapshot; readers holding the old one keep a consistent view.
    pub(crate) fn replace_catalog(&self, snapshot: CatalogSnapshot) {
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    pub(crate) fn require_user(&self, user_id: &UserId) -> Result<UserProfile, AppError> {
        self.profiles
            .find(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))
    }

    pub(crate) fn require_listing(&self, listing_id: ListingId) -> Result<Listing, AppError> {
        self.catalog()
            .find(listing_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))
    }
}

/// Run store mutations (lock + fsync) off the async workers.
pub(crate) async fn blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AppError::Server(axum::Error::new(err)))?
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::path::Path;

    pub(crate) const CATALOG_CSV: &str = "\
listing_id,name,location,property_type,accommodates,amenities,price,min_nights,max_nights,review_rating,tags
1,Shoreline Retreat,Grand Bend,Entire home,4,wifi,150,2,14,5.0,\"beach,lake\"
2,Maple Lane House,Stratford,Entire home,4,wifi,150,2,14,5.0,\"theatre,quiet\"
3,Penthouse,Toronto,Entire condo,2,gym,420,1,30,4.9,city
";

    pub(crate) fn context_in(dir: &Path) -> ApiContext {
        let storage = StorageConfig::in_dir(dir);
        std::fs::write(&storage.listings_csv, CATALOG_CSV).expect("seed catalog");
        ApiContext::open(&storage, &RecommendationConfig { default_top_n: 5 })
            .expect("context opens")
    }

    #[tokio::test]
    async fn blocking_returns_the_task_outcome() {
        let value = blocking(|| Ok::<_, AppError>(7)).await.expect("task succeeds");
        assert_eq!(value, 7);

        let err = blocking(|| Err::<(), _>(AppError::NotFound("user usr-000009".to_string())))
            .await
            .expect_err("task error propagates");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn blocking_maps_a_panicked_task_to_a_server_error() {
        let err = blocking(|| -> Result<(), AppError> { panic!("store task aborted") })
            .await
            .expect_err("panic surfaces as an error");
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date(" 2024-07-01 ").is_ok());
        assert!(parse_date("07/01/2024").is_err());
    }

    #[test]
    fn missing_catalog_file_yields_empty_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let context = ApiContext::open(
            &StorageConfig::in_dir(dir.path()),
            &RecommendationConfig { default_top_n: 5 },
        )
        .expect("opens without data");
        assert!(context.catalog().is_empty());
        assert!(matches!(
            context.require_listing(ListingId(1)),
            Err(AppError::NotFound(_))
        ));
    }
}
