use crate::infra::{blocking, ApiContext};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use stayfinder::error::AppError;
use stayfinder::workflows::catalog::{Listing, ListingId};
use stayfinder::workflows::profiles::{NewProfile, ProfileUpdate, UserId, UserProfile};

pub(super) fn router() -> Router<Arc<ApiContext>> {
    Router::new()
        .route("/api/v1/users", get(list_users).post(create_user))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/api/v1/users/:user_id/favorites", get(list_favorites))
        .route(
            "/api/v1/users/:user_id/favorites/:listing_id",
            put(add_favorite).delete(remove_favorite),
        )
}

async fn list_users(State(context): State<Arc<ApiContext>>) -> Json<Vec<UserProfile>> {
    Json(context.profiles.list())
}

async fn create_user(
    State(context): State<Arc<ApiContext>>,
    Json(new): Json<NewProfile>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let profile = blocking(move || Ok(context.profiles.create(new)?)).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn get_user(
    State(context): State<Arc<ApiContext>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    context.require_user(&UserId(user_id)).map(Json)
}

async fn update_user(
    State(context): State<Arc<ApiContext>>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    let user_id = UserId(user_id);
    blocking(move || {
        context
            .profiles
            .update(&user_id, update)?
            .map(Json)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))
    })
    .await
}

async fn delete_user(
    State(context): State<Arc<ApiContext>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = UserId(user_id);
    blocking(move || {
        if context.profiles.delete(&user_id)? {
            Ok(StatusCode::NO_CONTENT)
        } else {
            Err(AppError::NotFound(format!("user {user_id}")))
        }
    })
    .await
}

/// Favorites whose listing has since left the catalog are omitted.
async fn list_favorites(
    State(context): State<Arc<ApiContext>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let user_id = UserId(user_id);
    context.require_user(&user_id)?;
    let catalog = context.catalog();

    let listings = context
        .favorites
        .for_user(&user_id)
        .into_iter()
        .filter_map(|listing_id| catalog.find(listing_id).cloned())
        .collect();
    Ok(Json(listings))
}

#[derive(Debug, Serialize)]
pub(crate) struct FavoriteChange {
    listing_id: ListingId,
    changed: bool,
}

async fn add_favorite(
    State(context): State<Arc<ApiContext>>,
    Path((user_id, listing_id)): Path<(String, u64)>,
) -> Result<Json<FavoriteChange>, AppError> {
    let user_id = UserId(user_id);
    let listing_id = ListingId(listing_id);
    let changed = blocking(move || {
        context.require_user(&user_id)?;
        context.require_listing(listing_id)?;
        Ok(context.favorites.add(&user_id, listing_id)?)
    })
    .await?;
    Ok(Json(FavoriteChange {
        listing_id,
        changed,
    }))
}

async fn remove_favorite(
    State(context): State<Arc<ApiContext>>,
    Path((user_id, listing_id)): Path<(String, u64)>,
) -> Result<Json<FavoriteChange>, AppError> {
    let user_id = UserId(user_id);
    let listing_id = ListingId(listing_id);
    let changed = blocking(move || {
        context.require_user(&user_id)?;
        Ok(context.favorites.remove(&user_id, listing_id)?)
    })
    .await?;
    Ok(Json(FavoriteChange {
        listing_id,
        changed,
    }))
}
