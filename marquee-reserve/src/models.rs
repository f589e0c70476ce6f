use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A live seat lease, derived from seat state. Consumed by confirm or
/// release; reclaimable by anyone once `expires_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    pub show_id: Uuid,
    pub seat_id: Uuid,
    pub holder: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
}

/// Point-in-time seat snapshot taken at confirmation. Not a live view:
/// later price or seat changes never touch an existing booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSeat {
    pub seat_id: Uuid,
    pub seat_number: String,
    pub price_cents: i32,
}

/// Durable record of a confirmed purchase. Created exactly once per
/// successful confirm and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub holder: String,
    pub show_id: Uuid,
    pub seats: Vec<BookingSeat>,
    pub total_cents: i32,
    pub currency: String,
    pub payment_ref: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything the ledger needs to mint a `Booking`; id and timestamp are
/// assigned by the ledger on write.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub holder: String,
    pub show_id: Uuid,
    pub seats: Vec<BookingSeat>,
    pub total_cents: i32,
    pub currency: String,
    pub payment_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldSeat {
    pub seat_id: Uuid,
    pub seat_number: String,
    pub price_cents: i32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldFailureReason {
    SeatNotFound,
    AlreadySold,
    AlreadyHeld,
    /// Lost the transition race to a concurrent request.
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedSeat {
    pub seat_id: Uuid,
    pub seat_number: Option<String>,
    pub reason: HoldFailureReason,
}

/// Partial-success result of a bulk hold: seats that could not be held are
/// reported alongside the wins so the client can prompt re-selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldOutcome {
    pub held: Vec<HeldSeat>,
    pub failed: Vec<FailedSeat>,
    pub hold_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub released: usize,
}
