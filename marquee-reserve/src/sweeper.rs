use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use marquee_shared::events::{SeatEvent, SeatEventKind};
use tokio::sync::broadcast;

use crate::seats::{ExpectedSeat, NextSeat, SeatStore, SeatStoreError};

/// Reclaims holds whose lease lapsed without a confirm or an explicit
/// release, so the seat map self-heals when a client just walks away.
///
/// Reclaiming uses the same compare-and-swap as everything else, with the
/// expiry bound inside the expectation: a hold refreshed or confirmed after
/// the scan simply no longer matches, so the sweeper can never undo live
/// state. The client-side countdown timer is a convenience mirror of this;
/// the sweeper is the source of truth.
pub struct ExpirySweeper {
    seats: Arc<dyn SeatStore>,
    interval: Duration,
    events: broadcast::Sender<SeatEvent>,
}

impl ExpirySweeper {
    pub fn new(
        seats: Arc<dyn SeatStore>,
        interval: Duration,
        events: broadcast::Sender<SeatEvent>,
    ) -> Self {
        Self {
            seats,
            interval,
            events,
        }
    }

    /// Runs until the process shuts down. Spawn with `tokio::spawn`.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "expiry sweeper started");
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.sweep(Utc::now()).await {
                Ok(0) => {}
                Ok(reclaimed) => {
                    tracing::info!(reclaimed, "expired seat holds reclaimed");
                }
                Err(err) => tracing::error!("expiry sweep failed: {}", err),
            }
        }
    }

    /// One sweep pass as of `now`; returns how many holds were reclaimed.
    /// Public so tests can drive the clock instead of waiting on the timer.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, SeatStoreError> {
        let lapsed = self.seats.expired_holds(now).await?;
        let mut reclaimed = 0;

        for hold in lapsed {
            match self
                .seats
                .transition(
                    hold.show_id,
                    hold.seat_id,
                    ExpectedSeat::expired_hold_of(hold.holder.clone(), now),
                    NextSeat::available(),
                )
                .await
            {
                Ok(seat) => {
                    let _ = self.events.send(SeatEvent {
                        show_id: hold.show_id,
                        seat_id: seat.id,
                        seat_number: seat.seat_number.clone(),
                        kind: SeatEventKind::HoldExpired,
                        at: now,
                    });
                    reclaimed += 1;
                }
                // Refreshed, confirmed, or released between scan and swap.
                Err(SeatStoreError::Conflict { .. })
                | Err(SeatStoreError::SeatNotFound(_))
                | Err(SeatStoreError::ShowNotFound(_)) => {}
                Err(other) => return Err(other),
            }
        }

        Ok(reclaimed)
    }
}
