use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Booking, NewBooking};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("booking write failed: {0}")]
    WriteFailed(String),
    #[error("booking ledger unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of confirmed bookings. There is deliberately no update
/// or delete: a booking is immutable once written.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Writes a booking and returns it with its assigned id and timestamp.
    async fn create(&self, booking: NewBooking) -> Result<Booking, LedgerError>;

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, LedgerError>;

    /// A holder's bookings, newest first.
    async fn find_by_user(&self, holder: &str) -> Result<Vec<Booking>, LedgerError>;

    /// Confirmed bookings for a show, for occupancy reporting. Not part of
    /// the locking protocol.
    async fn find_by_show(&self, show_id: Uuid) -> Result<Vec<Booking>, LedgerError>;
}
