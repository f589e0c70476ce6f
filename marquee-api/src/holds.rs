use std::convert::Infallible;

use axum::{
    extract::{Extension, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::{Stream, StreamExt};
use marquee_core::identity::Claims;
use marquee_reserve::models::{FailedSeat, HeldSeat, ReleaseOutcome};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct HoldSeatsRequest {
    pub show_id: Uuid,
    pub seat_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HoldSeatsResponse {
    pub held: Vec<HeldSeat>,
    pub failed: Vec<FailedSeat>,
    pub hold_seconds: u64,
}

/// POST /v1/holds
/// Leases the requested seats for the authenticated holder. Partial success
/// is a 200 with the failures listed; 409 only when nothing could be held.
pub async fn hold_seats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<HoldSeatsRequest>,
) -> Result<Json<HoldSeatsResponse>, AppError> {
    let outcome = state
        .reservations
        .hold_seats(req.show_id, &req.seat_ids, &claims.sub)
        .await?;

    Ok(Json(HoldSeatsResponse {
        held: outcome.held,
        failed: outcome.failed,
        hold_seconds: outcome.hold_seconds,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReleaseSeatsRequest {
    pub show_id: Uuid,
    pub seat_ids: Vec<Uuid>,
}

/// POST /v1/holds/release
/// Best-effort release of the caller's holds; never blocks leaving the
/// checkout flow.
pub async fn release_seats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReleaseSeatsRequest>,
) -> Result<Json<ReleaseOutcome>, AppError> {
    let outcome = state
        .reservations
        .release_seats(req.show_id, &req.seat_ids, &claims.sub)
        .await?;
    Ok(Json(outcome))
}

/// GET /v1/shows/{show_id}/stream
/// Server-sent seat updates for one show, so open seat maps refresh without
/// polling. Slow consumers may miss events; the client refetches the map on
/// reconnect.
pub async fn show_stream(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.seat_events.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.show_id == show_id => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(Event::default().event("seat_update").data(data)))
            }
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
