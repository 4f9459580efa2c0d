use crate::infra::{blocking, deserialize_date, ApiContext};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stayfinder::error::AppError;
use stayfinder::workflows::bookings::{BookingId, Reservation};
use stayfinder::workflows::catalog::ListingId;
use stayfinder::workflows::profiles::UserId;

pub(super) fn router() -> Router<Arc<ApiContext>> {
    Router::new()
        .route("/api/v1/bookings", post(create_booking))
        .route("/api/v1/bookings/:booking_id", delete(cancel_booking))
        .route(
            "/api/v1/listings/:listing_id/availability",
            get(check_availability),
        )
        .route("/api/v1/listings/:listing_id/bookings", get(listing_bookings))
        .route("/api/v1/users/:user_id/bookings", get(user_bookings))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StayQuery {
    #[serde(deserialize_with = "deserialize_date")]
    check_in: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    check_out: NaiveDate,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvailabilityResponse {
    listing_id: ListingId,
    check_in: NaiveDate,
    check_out: NaiveDate,
    available: bool,
}

async fn check_availability(
    State(context): State<Arc<ApiContext>>,
    Path(listing_id): Path<u64>,
    Query(stay): Query<StayQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let listing_id = ListingId(listing_id);
    context.require_listing(listing_id)?;
    let available = context
        .bookings
        .is_available(listing_id, stay.check_in, stay.check_out)?;

    Ok(Json(AvailabilityResponse {
        listing_id,
        check_in: stay.check_in,
        check_out: stay.check_out,
        available,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookingRequest {
    user_id: UserId,
    listing_id: ListingId,
    #[serde(deserialize_with = "deserialize_date")]
    check_in: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    check_out: NaiveDate,
}

async fn create_booking(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = blocking(move || {
        context.require_user(&request.user_id)?;
        context.require_listing(request.listing_id)?;

        Ok(context.bookings.create_reservation(
            request.user_id,
            request.listing_id,
            request.check_in,
            request.check_out,
        )?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelQuery {
    user_id: UserId,
}

#[derive(Debug, Serialize)]
pub(crate) struct CancelResponse {
    booking_id: BookingId,
    cancelled: bool,
}

async fn cancel_booking(
    State(context): State<Arc<ApiContext>>,
    Path(booking_id): Path<u64>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<CancelResponse>, AppError> {
    let booking_id = BookingId(booking_id);
    let cancelled = blocking(move || {
        Ok(context
            .bookings
            .cancel_reservation(booking_id, &query.user_id)?)
    })
    .await?;
    Ok(Json(CancelResponse {
        booking_id,
        cancelled,
    }))
}

async fn user_bookings(
    State(context): State<Arc<ApiContext>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let user_id = UserId(user_id);
    context.require_user(&user_id)?;
    Ok(Json(context.bookings.list_for_user(&user_id)))
}

async fn listing_bookings(
    State(context): State<Arc<ApiContext>>,
    Path(listing_id): Path<u64>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let listing_id = ListingId(listing_id);
    context.require_listing(listing_id)?;
    Ok(Json(context.bookings.list_for_listing(listing_id)))
}
