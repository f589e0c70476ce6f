use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use marquee_core::identity::Claims;
use marquee_reserve::models::Booking;
use marquee_shared::pii::Masked;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ConfirmBookingRequest {
    pub show_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    /// Opaque instrument token from the payment form; masked so it can
    /// never end up in request logs.
    pub payment_token: Masked<String>,
}

/// POST /v1/bookings/confirm
/// Charges the locally computed total for the caller's held seats, then
/// turns the holds into a booking. All-or-nothing on the seat side.
pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ConfirmBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let holder = claims.sub.as_str();

    // Price the held seats first; the gateway is charged exactly what the
    // seat store says, never a client-supplied amount.
    let total_cents = state
        .reservations
        .quote(holder, req.show_id, &req.seat_ids)
        .await?;

    let receipt = state
        .payments
        .charge(
            holder,
            total_cents,
            &state.business_rules.currency,
            req.payment_token.expose(),
        )
        .await?;

    let booking = state
        .reservations
        .confirm_booking(holder, req.show_id, &req.seat_ids, &receipt.reference)
        .await?;

    info!(booking_id = %booking.id, "booking confirmed");
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.reservations.bookings_for(&claims.sub).await?))
}

/// GET /v1/bookings/{booking_id}
/// Owner-only: anyone else's token gets a 403, never the record.
pub async fn booking_by_id(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.reservations.booking(booking_id, &claims.sub).await?;
    Ok(Json(booking))
}
