use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to a seat. Mirrors the seat status machine; `HoldExpired`
/// is distinguished from `Released` so clients can tell a timeout from an
/// explicit cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatEventKind {
    Held,
    Released,
    HoldExpired,
    Sold,
}

/// Broadcast payload for live seat-map updates. Carries no holder identity:
/// subscribers only need to know the seat changed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatEvent {
    pub show_id: Uuid,
    pub seat_id: Uuid,
    pub seat_number: String,
    pub kind: SeatEventKind,
    pub at: DateTime<Utc>,
}
