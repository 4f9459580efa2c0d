use crate::infra::ApiContext;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stayfinder::error::AppError;
use stayfinder::workflows::catalog::{
    sort_listings, synthetic, Listing, ListingFilter, ListingId, SortKey,
};
use stayfinder::workflows::profiles::UserId;
use stayfinder::workflows::recommendations::ScoreBreakdown;
use tracing::info;

pub(super) fn router() -> Router<Arc<ApiContext>> {
    Router::new()
        .route("/api/v1/listings", get(list_listings))
        .route("/api/v1/listings/:listing_id", get(get_listing))
        .route("/api/v1/catalog/synthetic", post(merge_synthetic))
        .route(
            "/api/v1/users/:user_id/recommendations",
            get(recommendations_for_user),
        )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingQuery {
    #[serde(default)]
    environment: Option<String>,
    #[serde(default)]
    min_price: Option<f64>,
    #[serde(default)]
    max_price: Option<f64>,
    #[serde(default)]
    min_accommodates: Option<u32>,
    #[serde(default)]
    sort: Option<SortKey>,
    #[serde(default)]
    ascending: Option<bool>,
    #[serde(default)]
    limit: Option<usize>,
}

async fn list_listings(
    State(context): State<Arc<ApiContext>>,
    Query(query): Query<ListingQuery>,
) -> Json<Vec<Listing>> {
    let catalog = context.catalog();
    let filter = ListingFilter {
        environment: query.environment,
        min_price: query.min_price,
        max_price: query.max_price,
        min_accommodates: query.min_accommodates,
    };

    let mut matches = catalog.filter(&filter);
    if let Some(key) = query.sort {
        matches = sort_listings(matches, key, query.ascending.unwrap_or(true));
    }

    let limit = query.limit.unwrap_or(usize::MAX);
    Json(matches.into_iter().take(limit).cloned().collect())
}

async fn get_listing(
    State(context): State<Arc<ApiContext>>,
    Path(listing_id): Path<u64>,
) -> Result<Json<Listing>, AppError> {
    context.require_listing(ListingId(listing_id)).map(Json)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SyntheticRequest {
    raw_output: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SyntheticResponse {
    added: Vec<Listing>,
    total: usize,
}

async fn merge_synthetic(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<SyntheticRequest>,
) -> Result<(StatusCode, Json<SyntheticResponse>), AppError> {
    let rows = synthetic::extract_listings(&request.raw_output)?;
    let current = context.catalog();
    let merged = current.merged_with(rows);

    let added: Vec<Listing> = merged.listings()[current.len()..].to_vec();
    let total = merged.len();
    info!(added = added.len(), total, "merged generated listings into catalog");
    context.replace_catalog(merged);

    Ok((StatusCode::CREATED, Json(SyntheticResponse { added, total })))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecommendationQuery {
    #[serde(default)]
    top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendedListing {
    listing: Listing,
    score: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationResponse {
    user_id: UserId,
    results: Vec<RecommendedListing>,
}

async fn recommendations_for_user(
    State(context): State<Arc<ApiContext>>,
    Path(user_id): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let user_id = UserId(user_id);
    let profile = context.require_user(&user_id)?;
    let catalog = context.catalog();
    let top_n = query.top_n.unwrap_or(context.default_top_n);

    let results = context
        .recommender
        .explain(&profile.preference(), catalog.listings(), top_n)
        .into_iter()
        .filter_map(|score| {
            catalog.find(score.listing_id).map(|listing| RecommendedListing {
                listing: listing.clone(),
                score,
            })
        })
        .collect();

    Ok(Json(RecommendationResponse { user_id, results }))
}
