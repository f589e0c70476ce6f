use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use marquee_catalog::{Seat, SeatStatus};
use marquee_shared::events::{SeatEvent, SeatEventKind};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ledger::{BookingLedger, LedgerError};
use crate::models::{
    Booking, BookingSeat, FailedSeat, HeldSeat, HoldFailureReason, HoldOutcome, NewBooking,
    ReleaseOutcome,
};
use crate::seats::{ExpectedSeat, NextSeat, SeatStore, SeatStoreError, SeatTransition};

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("show not found: {0}")]
    ShowNotFound(Uuid),
    #[error("seat not found: {0}")]
    SeatNotFound(Uuid),
    #[error("no seats could be held; all requested seats are unavailable")]
    NoSeatsAvailable { failed: Vec<FailedSeat> },
    #[error("seat {0} is no longer held by you; the hold may have expired")]
    HoldExpiredOrNotOwned(String),
    #[error("seat {0} is already sold")]
    SeatAlreadySold(String),
    #[error("booking could not be recorded: {0}")]
    BookingCreationFailed(String),
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),
    #[error("this booking belongs to another customer")]
    NotYourBooking,
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] SeatStoreError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Implements the hold → confirm → release protocol over the seat store and
/// booking ledger. Constructed once at startup and shared across request
/// handlers by `Arc`; it keeps no per-request state of its own.
pub struct ReservationManager {
    seats: Arc<dyn SeatStore>,
    ledger: Arc<dyn BookingLedger>,
    hold_duration: Duration,
    currency: String,
    events: broadcast::Sender<SeatEvent>,
}

impl ReservationManager {
    pub fn new(
        seats: Arc<dyn SeatStore>,
        ledger: Arc<dyn BookingLedger>,
        hold_seconds: u64,
        currency: impl Into<String>,
        events: broadcast::Sender<SeatEvent>,
    ) -> Self {
        Self {
            seats,
            ledger,
            hold_duration: Duration::seconds(hold_seconds as i64),
            currency: currency.into(),
            events,
        }
    }

    pub fn hold_seconds(&self) -> u64 {
        self.hold_duration.num_seconds() as u64
    }

    /// Tries to lease every requested seat for `holder`. Seats are attempted
    /// independently: partial success is a valid outcome, reported with the
    /// per-seat failure reasons so the client can prompt re-selection. The
    /// whole call fails only when not a single seat could be held.
    ///
    /// An expired foreign hold counts as reclaimable; the expiry bound is
    /// part of the swap's expectation, so a lease refreshed after our read
    /// loses us the race instead of being silently overwritten.
    pub async fn hold_seats(
        &self,
        show_id: Uuid,
        seat_ids: &[Uuid],
        holder: &str,
    ) -> Result<HoldOutcome, ReservationError> {
        let ids = dedup(seat_ids);
        if ids.is_empty() {
            return Err(ReservationError::Validation(
                "at least one seat id is required".into(),
            ));
        }

        let now = Utc::now();
        let expires_at = now + self.hold_duration;
        let mut held = Vec::new();
        let mut failed = Vec::new();

        for seat_id in ids {
            let seat = match self.seats.get_seat(show_id, seat_id).await {
                Ok(seat) => seat,
                Err(SeatStoreError::ShowNotFound(id)) => {
                    return Err(ReservationError::ShowNotFound(id));
                }
                Err(SeatStoreError::SeatNotFound(_)) => {
                    failed.push(FailedSeat {
                        seat_id,
                        seat_number: None,
                        reason: HoldFailureReason::SeatNotFound,
                    });
                    continue;
                }
                Err(other) => return Err(other.into()),
            };

            let seat_number = seat.seat_number.clone();
            let expected = match seat.status {
                SeatStatus::Sold => {
                    failed.push(FailedSeat {
                        seat_id,
                        seat_number: Some(seat_number),
                        reason: HoldFailureReason::AlreadySold,
                    });
                    continue;
                }
                // Re-holding one's own seat refreshes the lease.
                SeatStatus::Held if seat.holder.as_deref() == Some(holder) => {
                    ExpectedSeat::held_by(holder)
                }
                SeatStatus::Held if seat.hold_expired(now) => {
                    ExpectedSeat::expired_hold_of(seat.holder.clone().unwrap_or_default(), now)
                }
                SeatStatus::Held => {
                    failed.push(FailedSeat {
                        seat_id,
                        seat_number: Some(seat_number),
                        reason: HoldFailureReason::AlreadyHeld,
                    });
                    continue;
                }
                SeatStatus::Available => ExpectedSeat::available(),
            };

            match self
                .seats
                .transition(show_id, seat_id, expected, NextSeat::held(holder, expires_at))
                .await
            {
                Ok(updated) => {
                    self.publish(SeatEventKind::Held, show_id, &updated);
                    held.push(HeldSeat {
                        seat_id,
                        seat_number: updated.seat_number,
                        price_cents: updated.price_cents,
                        expires_at,
                    });
                }
                Err(SeatStoreError::Conflict { .. }) => {
                    failed.push(FailedSeat {
                        seat_id,
                        seat_number: Some(seat_number),
                        reason: HoldFailureReason::Conflict,
                    });
                }
                Err(other) => return Err(other.into()),
            }
        }

        if held.is_empty() {
            tracing::info!(%show_id, holder, "hold rejected: no seats available");
            return Err(ReservationError::NoSeatsAvailable { failed });
        }

        tracing::info!(
            %show_id,
            holder,
            held = held.len(),
            failed = failed.len(),
            "seats held"
        );
        Ok(HoldOutcome {
            held,
            failed,
            hold_seconds: self.hold_seconds(),
        })
    }

    /// Prices a confirm without changing state: validates that `holder` has
    /// a live hold on every seat and returns the total the payment
    /// collaborator should charge.
    pub async fn quote(
        &self,
        holder: &str,
        show_id: Uuid,
        seat_ids: &[Uuid],
    ) -> Result<i32, ReservationError> {
        let ids = dedup(seat_ids);
        if ids.is_empty() {
            return Err(ReservationError::Validation(
                "at least one seat id is required".into(),
            ));
        }
        let seats = self
            .validate_for_confirm(holder, show_id, &ids, Utc::now())
            .await?;
        Ok(seats.iter().map(|s| s.price_cents).sum())
    }

    /// Turns a set of held seats into a booking. All-or-nothing: one invalid
    /// seat fails the whole call, since a partial confirmation would leave a
    /// booking with fewer seats than were paid for.
    pub async fn confirm_booking(
        &self,
        holder: &str,
        show_id: Uuid,
        seat_ids: &[Uuid],
        payment_ref: &str,
    ) -> Result<Booking, ReservationError> {
        if payment_ref.trim().is_empty() {
            return Err(ReservationError::Validation(
                "payment reference is required".into(),
            ));
        }
        let ids = dedup(seat_ids);
        if ids.is_empty() {
            return Err(ReservationError::Validation(
                "at least one seat id is required".into(),
            ));
        }

        let now = Utc::now();
        let seats = self.validate_for_confirm(holder, show_id, &ids, now).await?;

        let booking_seats: Vec<BookingSeat> = seats
            .iter()
            .map(|s| BookingSeat {
                seat_id: s.id,
                seat_number: s.seat_number.clone(),
                price_cents: s.price_cents,
            })
            .collect();
        let total_cents: i32 = booking_seats.iter().map(|s| s.price_cents).sum();

        // Flip every seat to sold in one atomic unit. The expectation pins
        // the holder, so a hold reclaimed between validation and the swap
        // fails the confirm rather than selling someone else's seat.
        let sell: Vec<SeatTransition> = seats
            .iter()
            .map(|s| SeatTransition {
                seat_id: s.id,
                expected: ExpectedSeat::held_by(holder),
                next: NextSeat::sold(),
            })
            .collect();
        let sold = self
            .seats
            .transition_many(show_id, sell)
            .await
            .map_err(|err| match err {
                SeatStoreError::Conflict { seat_id, .. } => {
                    let number = seats
                        .iter()
                        .find(|s| s.id == seat_id)
                        .map(|s| s.seat_number.clone())
                        .unwrap_or_else(|| seat_id.to_string());
                    ReservationError::HoldExpiredOrNotOwned(number)
                }
                other => other.into(),
            })?;

        let record = NewBooking {
            holder: holder.to_owned(),
            show_id,
            seats: booking_seats,
            total_cents,
            currency: self.currency.clone(),
            payment_ref: payment_ref.to_owned(),
        };

        match self.ledger.create(record).await {
            Ok(booking) => {
                for seat in &sold {
                    self.publish(SeatEventKind::Sold, show_id, seat);
                }
                tracing::info!(booking_id = %booking.id, holder, total_cents, "booking confirmed");
                Ok(booking)
            }
            Err(err) => {
                // A failed ledger write must not strand sold seats with no
                // booking: put them back the way validation saw them so the
                // holder can retry checkout.
                self.rollback_sale(show_id, holder, &seats, now).await;
                Err(ReservationError::BookingCreationFailed(err.to_string()))
            }
        }
    }

    /// Gives seats back. Best-effort by contract: seats not held by the
    /// caller (including already-expired or re-held seats) are skipped, not
    /// errors, and only actually reclaimed seats count toward `released`.
    pub async fn release_seats(
        &self,
        show_id: Uuid,
        seat_ids: &[Uuid],
        holder: &str,
    ) -> Result<ReleaseOutcome, ReservationError> {
        let ids = dedup(seat_ids);
        let mut released = 0;

        for seat_id in ids {
            match self
                .seats
                .transition(
                    show_id,
                    seat_id,
                    ExpectedSeat::held_by(holder),
                    NextSeat::available(),
                )
                .await
            {
                Ok(seat) => {
                    self.publish(SeatEventKind::Released, show_id, &seat);
                    released += 1;
                }
                Err(SeatStoreError::Conflict { .. }) | Err(SeatStoreError::SeatNotFound(_)) => {
                    tracing::debug!(%seat_id, holder, "release skipped: not held by caller");
                }
                Err(SeatStoreError::ShowNotFound(id)) => {
                    return Err(ReservationError::ShowNotFound(id));
                }
                Err(other) => return Err(other.into()),
            }
        }

        tracing::info!(%show_id, holder, released, "seat holds released");
        Ok(ReleaseOutcome { released })
    }

    /// Live seat map for a show, in seat-map order.
    pub async fn seat_map(&self, show_id: Uuid) -> Result<Vec<Seat>, ReservationError> {
        Ok(self.seats.list_seats(show_id).await?)
    }

    /// Fetches one booking; only the owning holder may read it.
    pub async fn booking(
        &self,
        booking_id: Uuid,
        holder: &str,
    ) -> Result<Booking, ReservationError> {
        let booking = self
            .ledger
            .find_by_id(booking_id)
            .await?
            .ok_or(ReservationError::BookingNotFound(booking_id))?;
        if booking.holder != holder {
            return Err(ReservationError::NotYourBooking);
        }
        Ok(booking)
    }

    /// A holder's bookings, newest first.
    pub async fn bookings_for(&self, holder: &str) -> Result<Vec<Booking>, ReservationError> {
        Ok(self.ledger.find_by_user(holder).await?)
    }

    async fn validate_for_confirm(
        &self,
        holder: &str,
        show_id: Uuid,
        seat_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<Seat>, ReservationError> {
        let mut seats = Vec::with_capacity(seat_ids.len());
        for &seat_id in seat_ids {
            let seat = match self.seats.get_seat(show_id, seat_id).await {
                Ok(seat) => seat,
                Err(SeatStoreError::ShowNotFound(id)) => {
                    return Err(ReservationError::ShowNotFound(id));
                }
                Err(SeatStoreError::SeatNotFound(id)) => {
                    return Err(ReservationError::SeatNotFound(id));
                }
                Err(other) => return Err(other.into()),
            };
            match seat.status {
                SeatStatus::Sold => {
                    return Err(ReservationError::SeatAlreadySold(seat.seat_number));
                }
                SeatStatus::Available => {
                    return Err(ReservationError::HoldExpiredOrNotOwned(seat.seat_number));
                }
                SeatStatus::Held => {
                    if seat.holder.as_deref() != Some(holder) || seat.hold_expired(now) {
                        return Err(ReservationError::HoldExpiredOrNotOwned(seat.seat_number));
                    }
                }
            }
            seats.push(seat);
        }
        Ok(seats)
    }

    async fn rollback_sale(
        &self,
        show_id: Uuid,
        holder: &str,
        seats: &[Seat],
        now: DateTime<Utc>,
    ) {
        let restore: Vec<SeatTransition> = seats
            .iter()
            .map(|s| SeatTransition {
                seat_id: s.id,
                expected: ExpectedSeat::sold(),
                next: NextSeat::held(holder, s.hold_expires_at.unwrap_or(now)),
            })
            .collect();
        if let Err(err) = self.seats.transition_many(show_id, restore).await {
            tracing::error!(%show_id, holder, "rollback after failed booking write also failed: {}", err);
        }
    }

    fn publish(&self, kind: SeatEventKind, show_id: Uuid, seat: &Seat) {
        // No receivers just means nobody is watching the seat map right now.
        let _ = self.events.send(SeatEvent {
            show_id,
            seat_id: seat.id,
            seat_number: seat.seat_number.clone(),
            kind,
            at: Utc::now(),
        });
    }
}

fn dedup(seat_ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    seat_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup(&[a, b, a, b, a]), vec![a, b]);
        assert!(dedup(&[]).is_empty());
    }
}
