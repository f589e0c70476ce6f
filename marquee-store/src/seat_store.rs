use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_catalog::Seat;
use marquee_reserve::models::Hold;
use marquee_reserve::seats::{ExpectedSeat, NextSeat, SeatStore, SeatStoreError, SeatTransition};
use uuid::Uuid;

struct ShowSeats {
    // seat-map order, fixed at registration
    order: Vec<Uuid>,
    seats: HashMap<Uuid, Seat>,
}

impl ShowSeats {
    fn new(seats: Vec<Seat>) -> Self {
        let order = seats.iter().map(|s| s.id).collect();
        let seats = seats.into_iter().map(|s| (s.id, s)).collect();
        Self { order, seats }
    }
}

/// In-memory seat table. Every mutation runs inside the table's write lock,
/// which serializes conflicting transitions on the same seat; the
/// expectation check and the write are one critical section, never a
/// read-then-write across lock acquisitions.
pub struct MemorySeatStore {
    shows: RwLock<HashMap<Uuid, ShowSeats>>,
}

impl MemorySeatStore {
    pub fn new() -> Self {
        Self {
            shows: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemorySeatStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> SeatStoreError {
    SeatStoreError::Unavailable("seat table lock poisoned".into())
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    async fn insert_show(&self, show_id: Uuid, seats: Vec<Seat>) -> Result<(), SeatStoreError> {
        let mut shows = self.shows.write().map_err(poisoned)?;
        if shows.contains_key(&show_id) {
            // seat count is fixed at show creation; first registration wins
            tracing::warn!(%show_id, "ignoring duplicate seat map registration");
            return Ok(());
        }
        shows.insert(show_id, ShowSeats::new(seats));
        Ok(())
    }

    async fn get_seat(&self, show_id: Uuid, seat_id: Uuid) -> Result<Seat, SeatStoreError> {
        let shows = self.shows.read().map_err(poisoned)?;
        let show = shows
            .get(&show_id)
            .ok_or(SeatStoreError::ShowNotFound(show_id))?;
        show.seats
            .get(&seat_id)
            .cloned()
            .ok_or(SeatStoreError::SeatNotFound(seat_id))
    }

    async fn list_seats(&self, show_id: Uuid) -> Result<Vec<Seat>, SeatStoreError> {
        let shows = self.shows.read().map_err(poisoned)?;
        let show = shows
            .get(&show_id)
            .ok_or(SeatStoreError::ShowNotFound(show_id))?;
        Ok(show
            .order
            .iter()
            .filter_map(|id| show.seats.get(id).cloned())
            .collect())
    }

    async fn transition(
        &self,
        show_id: Uuid,
        seat_id: Uuid,
        expected: ExpectedSeat,
        next: NextSeat,
    ) -> Result<Seat, SeatStoreError> {
        let mut shows = self.shows.write().map_err(poisoned)?;
        let show = shows
            .get_mut(&show_id)
            .ok_or(SeatStoreError::ShowNotFound(show_id))?;
        let seat = show
            .seats
            .get_mut(&seat_id)
            .ok_or(SeatStoreError::SeatNotFound(seat_id))?;

        if !expected.matches(seat) {
            return Err(SeatStoreError::Conflict {
                seat_id,
                observed: seat.status,
            });
        }

        next.apply(seat);
        Ok(seat.clone())
    }

    async fn transition_many(
        &self,
        show_id: Uuid,
        steps: Vec<SeatTransition>,
    ) -> Result<Vec<Seat>, SeatStoreError> {
        let mut shows = self.shows.write().map_err(poisoned)?;
        let show = shows
            .get_mut(&show_id)
            .ok_or(SeatStoreError::ShowNotFound(show_id))?;

        // check every expectation before applying anything
        for step in &steps {
            let seat = show
                .seats
                .get(&step.seat_id)
                .ok_or(SeatStoreError::SeatNotFound(step.seat_id))?;
            if !step.expected.matches(seat) {
                return Err(SeatStoreError::Conflict {
                    seat_id: step.seat_id,
                    observed: seat.status,
                });
            }
        }

        let mut out = Vec::with_capacity(steps.len());
        for step in &steps {
            let seat = show
                .seats
                .get_mut(&step.seat_id)
                .ok_or(SeatStoreError::SeatNotFound(step.seat_id))?;
            step.next.apply(seat);
            out.push(seat.clone());
        }
        Ok(out)
    }

    async fn expired_holds(&self, now: DateTime<Utc>) -> Result<Vec<Hold>, SeatStoreError> {
        let shows = self.shows.read().map_err(poisoned)?;
        let mut lapsed = Vec::new();
        for (show_id, show) in shows.iter() {
            for seat in show.seats.values() {
                if seat.hold_expired(now) {
                    if let (Some(holder), Some(expires_at)) =
                        (seat.holder.clone(), seat.hold_expires_at)
                    {
                        lapsed.push(Hold {
                            show_id: *show_id,
                            seat_id: seat.id,
                            holder,
                            expires_at,
                        });
                    }
                }
            }
        }
        Ok(lapsed)
    }
}
