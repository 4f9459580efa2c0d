use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::bookings::{LedgerError, ReservationError};
use crate::workflows::catalog::CatalogError;
use crate::workflows::favorites::FavoritesError;
use crate::workflows::profiles::ProfileError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Catalog(CatalogError),
    Reservation(ReservationError),
    Profile(ProfileError),
    Favorites(FavoritesError),
    NotFound(String),
    InvalidRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Reservation(err) => write!(f, "reservation error: {}", err),
            AppError::Profile(err) => write!(f, "profile error: {}", err),
            AppError::Favorites(err) => write!(f, "favorites error: {}", err),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::InvalidRequest(detail) => write!(f, "invalid request: {}", detail),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Reservation(err) => Some(err),
            AppError::Profile(err) => Some(err),
            AppError::Favorites(err) => Some(err),
            AppError::NotFound(_) | AppError::InvalidRequest(_) => None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Reservation(ReservationError::DateRangeInvalid(_))
            | AppError::Profile(ProfileError::InvalidGroupSize)
            | AppError::Catalog(CatalogError::Synthetic(_))
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Reservation(ReservationError::BookingConflict { .. }) => {
                StatusCode::CONFLICT
            }
            AppError::Profile(ProfileError::NotFound(_)) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Catalog(_)
            | AppError::Reservation(ReservationError::Ledger(_))
            | AppError::Profile(_)
            | AppError::Favorites(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<ReservationError> for AppError {
    fn from(value: ReservationError) -> Self {
        Self::Reservation(value)
    }
}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        Self::Reservation(ReservationError::Ledger(value))
    }
}

impl From<ProfileError> for AppError {
    fn from(value: ProfileError) -> Self {
        Self::Profile(value)
    }
}

impl From<FavoritesError> for AppError {
    fn from(value: FavoritesError) -> Self {
        Self::Favorites(value)
    }
}
