use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_catalog::{Seat, SeatStatus};
use uuid::Uuid;

use crate::models::Hold;

#[derive(Debug, thiserror::Error)]
pub enum SeatStoreError {
    #[error("show not found: {0}")]
    ShowNotFound(Uuid),
    #[error("seat not found: {0}")]
    SeatNotFound(Uuid),
    #[error("seat {seat_id} is {observed:?}; transition rejected")]
    Conflict { seat_id: Uuid, observed: SeatStatus },
    #[error("seat store unavailable: {0}")]
    Unavailable(String),
}

/// Precondition of a compare-and-swap transition: the seat's current state
/// must match everything specified here at the moment the swap is applied,
/// or the store rejects with `Conflict`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedSeat {
    status: SeatStatus,
    holder: Option<String>,
    expired_by: Option<DateTime<Utc>>,
}

impl ExpectedSeat {
    pub fn available() -> Self {
        Self {
            status: SeatStatus::Available,
            holder: None,
            expired_by: None,
        }
    }

    /// Held by exactly this holder, regardless of expiry.
    pub fn held_by(holder: impl Into<String>) -> Self {
        Self {
            status: SeatStatus::Held,
            holder: Some(holder.into()),
            expired_by: None,
        }
    }

    /// Held by this holder with a lease already lapsed as of `now`. This is
    /// the reclaim expectation: a hold refreshed or confirmed after the
    /// caller's read no longer matches it.
    pub fn expired_hold_of(holder: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            status: SeatStatus::Held,
            holder: Some(holder.into()),
            expired_by: Some(now),
        }
    }

    pub fn sold() -> Self {
        Self {
            status: SeatStatus::Sold,
            holder: None,
            expired_by: None,
        }
    }

    /// Evaluates the precondition against a seat's current state.
    pub fn matches(&self, seat: &Seat) -> bool {
        if seat.status != self.status {
            return false;
        }
        if let Some(holder) = &self.holder {
            if seat.holder.as_deref() != Some(holder.as_str()) {
                return false;
            }
        }
        if let Some(bound) = self.expired_by {
            match seat.hold_expires_at {
                Some(expires_at) => {
                    if expires_at > bound {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}

/// Replacement reservation state written when the expectation holds. The
/// constructors are the only way to build one, which keeps the seat
/// invariant (holder and expiry present exactly when held) intact by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextSeat {
    status: SeatStatus,
    holder: Option<String>,
    hold_expires_at: Option<DateTime<Utc>>,
}

impl NextSeat {
    pub fn available() -> Self {
        Self {
            status: SeatStatus::Available,
            holder: None,
            hold_expires_at: None,
        }
    }

    pub fn held(holder: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            status: SeatStatus::Held,
            holder: Some(holder.into()),
            hold_expires_at: Some(expires_at),
        }
    }

    pub fn sold() -> Self {
        Self {
            status: SeatStatus::Sold,
            holder: None,
            hold_expires_at: None,
        }
    }

    /// Writes this state onto a seat. Called by stores inside their critical
    /// section, after `ExpectedSeat::matches` has passed.
    pub fn apply(&self, seat: &mut Seat) {
        seat.status = self.status;
        seat.holder = self.holder.clone();
        seat.hold_expires_at = self.hold_expires_at;
    }
}

/// One step of a bulk transition.
#[derive(Debug, Clone)]
pub struct SeatTransition {
    pub seat_id: Uuid,
    pub expected: ExpectedSeat,
    pub next: NextSeat,
}

/// Authoritative per-show seat state. All mutation flows through the
/// compare-and-swap `transition` operations; for a fixed (show, seat) pair
/// the successful transitions form a total order, so two concurrent callers
/// can never both observe `Available` and both win a hold.
#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Registers a show's seat map. Seat count is fixed from then on.
    async fn insert_show(&self, show_id: Uuid, seats: Vec<Seat>) -> Result<(), SeatStoreError>;

    async fn get_seat(&self, show_id: Uuid, seat_id: Uuid) -> Result<Seat, SeatStoreError>;

    /// Seats in seat-map order, for rendering.
    async fn list_seats(&self, show_id: Uuid) -> Result<Vec<Seat>, SeatStoreError>;

    /// Atomic compare-and-swap on one seat. Returns the seat's new state on
    /// success.
    async fn transition(
        &self,
        show_id: Uuid,
        seat_id: Uuid,
        expected: ExpectedSeat,
        next: NextSeat,
    ) -> Result<Seat, SeatStoreError>;

    /// All-or-nothing bulk transition executed in a single critical
    /// section: either every step's expectation holds and every step is
    /// applied, or nothing is.
    async fn transition_many(
        &self,
        show_id: Uuid,
        steps: Vec<SeatTransition>,
    ) -> Result<Vec<Seat>, SeatStoreError>;

    /// Holds whose expiry is at or before `now`, across all shows. Scan
    /// support for the sweeper; reclaiming still goes through `transition`.
    async fn expired_holds(&self, now: DateTime<Utc>) -> Result<Vec<Hold>, SeatStoreError>;
}
