use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use marquee_reserve::ledger::{BookingLedger, LedgerError};
use marquee_reserve::models::{Booking, BookingStatus, NewBooking};
use uuid::Uuid;

/// Append-only in-memory booking log. Records are pushed in creation order
/// and never touched again, which is the whole persistence contract: no
/// update, no delete.
pub struct MemoryBookingLedger {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryBookingLedger {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryBookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> LedgerError {
    LedgerError::Unavailable("booking log lock poisoned".into())
}

#[async_trait]
impl BookingLedger for MemoryBookingLedger {
    async fn create(&self, booking: NewBooking) -> Result<Booking, LedgerError> {
        let record = Booking {
            id: Uuid::new_v4(),
            holder: booking.holder,
            show_id: booking.show_id,
            seats: booking.seats,
            total_cents: booking.total_cents,
            currency: booking.currency,
            payment_ref: booking.payment_ref,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        bookings.push(record.clone());
        tracing::info!(booking_id = %record.id, "booking recorded");
        Ok(record)
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, LedgerError> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(bookings.iter().find(|b| b.id == booking_id).cloned())
    }

    async fn find_by_user(&self, holder: &str) -> Result<Vec<Booking>, LedgerError> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(bookings
            .iter()
            .rev()
            .filter(|b| b.holder == holder)
            .cloned()
            .collect())
    }

    async fn find_by_show(&self, show_id: Uuid) -> Result<Vec<Booking>, LedgerError> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(bookings
            .iter()
            .filter(|b| b.show_id == show_id && b.status == BookingStatus::Confirmed)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_reserve::models::BookingSeat;

    fn new_booking(holder: &str, show_id: Uuid) -> NewBooking {
        NewBooking {
            holder: holder.to_owned(),
            show_id,
            seats: vec![BookingSeat {
                seat_id: Uuid::new_v4(),
                seat_number: "A1".into(),
                price_cents: 1299,
            }],
            total_cents: 1299,
            currency: "USD".into(),
            payment_ref: "PAY_TEST".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_confirmed_status() {
        let ledger = MemoryBookingLedger::new();
        let show_id = Uuid::new_v4();
        let booking = ledger.create(new_booking("u1", show_id)).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        let found = ledger.find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(found.total_cents, 1299);
        assert_eq!(found.payment_ref, "PAY_TEST");
    }

    #[tokio::test]
    async fn user_bookings_come_back_newest_first() {
        let ledger = MemoryBookingLedger::new();
        let show_id = Uuid::new_v4();
        let first = ledger.create(new_booking("u1", show_id)).await.unwrap();
        let second = ledger.create(new_booking("u1", show_id)).await.unwrap();
        ledger.create(new_booking("u2", show_id)).await.unwrap();

        let mine = ledger.find_by_user("u1").await.unwrap();
        assert_eq!(
            mine.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }

    #[tokio::test]
    async fn show_query_scopes_to_one_show() {
        let ledger = MemoryBookingLedger::new();
        let show_a = Uuid::new_v4();
        let show_b = Uuid::new_v4();
        ledger.create(new_booking("u1", show_a)).await.unwrap();
        ledger.create(new_booking("u2", show_b)).await.unwrap();

        let for_a = ledger.find_by_show(show_a).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].show_id, show_a);
    }
}
