use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_catalog::CatalogError;
use marquee_core::payment::PaymentError;
use marquee_reserve::ReservationError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Authorization(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    PaymentRequired(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::Internal(err) => {
                tracing::error!("internal server error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::ShowNotFound(_)
            | ReservationError::SeatNotFound(_)
            | ReservationError::BookingNotFound(_) => AppError::NotFound(err.to_string()),
            ReservationError::NoSeatsAvailable { .. }
            | ReservationError::HoldExpiredOrNotOwned(_)
            | ReservationError::SeatAlreadySold(_) => AppError::Conflict(err.to_string()),
            ReservationError::NotYourBooking => AppError::Authorization(err.to_string()),
            ReservationError::Validation(msg) => AppError::Validation(msg),
            ReservationError::BookingCreationFailed(_)
            | ReservationError::Store(_)
            | ReservationError::Ledger(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MovieNotFound(_)
            | CatalogError::TheaterNotFound(_)
            | CatalogError::ShowNotFound(_) => AppError::NotFound(err.to_string()),
            CatalogError::Unavailable(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Declined(_) => AppError::PaymentRequired(err.to_string()),
            PaymentError::Provider(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}
