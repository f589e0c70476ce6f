pub mod ledger;
pub mod manager;
pub mod models;
pub mod seats;
pub mod sweeper;

pub use ledger::{BookingLedger, LedgerError};
pub use manager::{ReservationError, ReservationManager};
pub use models::{
    Booking, BookingSeat, BookingStatus, FailedSeat, HeldSeat, Hold, HoldFailureReason,
    HoldOutcome, NewBooking, ReleaseOutcome,
};
pub use seats::{ExpectedSeat, NextSeat, SeatStore, SeatStoreError, SeatTransition};
pub use sweeper::ExpirySweeper;
