//! End-to-end reservation protocol tests over the in-memory stores: the
//! hold → confirm → release lifecycle, its race-condition guarantees, and
//! the expiry path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use marquee_catalog::{PricingConfig, Seat, SeatMapSpec, SeatStatus};
use marquee_reserve::ledger::{BookingLedger, LedgerError};
use marquee_reserve::models::{Booking, HoldFailureReason, NewBooking};
use marquee_reserve::seats::SeatStore;
use marquee_reserve::sweeper::ExpirySweeper;
use marquee_reserve::{ReservationError, ReservationManager};
use marquee_store::{MemoryBookingLedger, MemorySeatStore};
use tokio::sync::broadcast;
use uuid::Uuid;

struct Fixture {
    seats: Arc<MemorySeatStore>,
    manager: Arc<ReservationManager>,
    show_id: Uuid,
    seat_map: Vec<Seat>,
}

async fn fixture(hold_seconds: u64) -> Fixture {
    let seats = Arc::new(MemorySeatStore::new());
    let ledger = Arc::new(MemoryBookingLedger::new());
    let (events, _) = broadcast::channel(64);

    let show_id = Uuid::new_v4();
    let seat_map = SeatMapSpec::default().build(1299, &PricingConfig::default());
    seats
        .insert_show(show_id, seat_map.clone())
        .await
        .expect("register seat map");

    let manager = Arc::new(ReservationManager::new(
        seats.clone(),
        ledger,
        hold_seconds,
        "USD",
        events,
    ));

    Fixture {
        seats,
        manager,
        show_id,
        seat_map,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_holds_on_one_seat_have_exactly_one_winner() {
    let fx = fixture(300).await;
    let seat_id = fx.seat_map[0].id;

    let mut tasks = Vec::new();
    for i in 0..16 {
        let manager = fx.manager.clone();
        let show_id = fx.show_id;
        tasks.push(tokio::spawn(async move {
            manager
                .hold_seats(show_id, &[seat_id], &format!("guest-{i}"))
                .await
        }));
    }

    let mut winners = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(outcome) => {
                assert_eq!(outcome.held.len(), 1);
                winners += 1;
            }
            Err(ReservationError::NoSeatsAvailable { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);

    let seat = fx.seats.get_seat(fx.show_id, seat_id).await.unwrap();
    assert_eq!(seat.status, SeatStatus::Held);
}

#[tokio::test]
async fn round_trip_hold_confirm_totals_and_sells_seats() {
    let fx = fixture(300).await;
    // one premium (A1), one regular (E1)
    let ids = [fx.seat_map[0].id, fx.seat_map[40].id];
    let expected_total = fx.seat_map[0].price_cents + fx.seat_map[40].price_cents;

    let outcome = fx.manager.hold_seats(fx.show_id, &ids, "guest-u1").await.unwrap();
    assert_eq!(outcome.held.len(), 2);
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.hold_seconds, 300);

    let booking = fx
        .manager
        .confirm_booking("guest-u1", fx.show_id, &ids, "PAY123")
        .await
        .unwrap();
    assert_eq!(booking.total_cents, expected_total);
    assert_eq!(booking.seats.len(), 2);
    assert_eq!(booking.payment_ref, "PAY123");

    for id in ids {
        let seat = fx.seats.get_seat(fx.show_id, id).await.unwrap();
        assert_eq!(seat.status, SeatStatus::Sold);
        assert!(seat.holder.is_none() && seat.hold_expires_at.is_none());
    }
}

#[tokio::test]
async fn held_seat_rejects_other_holders_until_released() {
    let fx = fixture(300).await;
    let a1 = fx.seat_map[0].id;
    let a2 = fx.seat_map[1].id;

    let outcome = fx.manager.hold_seats(fx.show_id, &[a1, a2], "u1").await.unwrap();
    assert_eq!(outcome.held.len(), 2);

    // U2 cannot take A1 while U1's hold is live
    let err = fx.manager.hold_seats(fx.show_id, &[a1], "u2").await.unwrap_err();
    match err {
        ReservationError::NoSeatsAvailable { failed } => {
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].reason, HoldFailureReason::AlreadyHeld);
        }
        other => panic!("unexpected error: {other}"),
    }

    // after U1 releases, U2's retry succeeds
    let released = fx.manager.release_seats(fx.show_id, &[a1], "u1").await.unwrap();
    assert_eq!(released.released, 1);

    let outcome = fx.manager.hold_seats(fx.show_id, &[a1], "u2").await.unwrap();
    assert_eq!(outcome.held.len(), 1);
}

#[tokio::test]
async fn bulk_hold_reports_partial_success() {
    let fx = fixture(300).await;
    let taken = fx.seat_map[0].id;
    let free = fx.seat_map[1].id;
    fx.manager.hold_seats(fx.show_id, &[taken], "u1").await.unwrap();

    let outcome = fx
        .manager
        .hold_seats(fx.show_id, &[taken, free, Uuid::new_v4()], "u2")
        .await
        .unwrap();
    assert_eq!(outcome.held.len(), 1);
    assert_eq!(outcome.held[0].seat_id, free);
    assert_eq!(outcome.failed.len(), 2);
    assert!(outcome
        .failed
        .iter()
        .any(|f| f.reason == HoldFailureReason::AlreadyHeld));
    assert!(outcome
        .failed
        .iter()
        .any(|f| f.reason == HoldFailureReason::SeatNotFound));
}

#[tokio::test]
async fn expired_hold_is_reclaimable_by_another_holder() {
    // zero-length lease: expired the moment it is taken
    let fx = fixture(0).await;
    let seat_id = fx.seat_map[0].id;

    fx.manager.hold_seats(fx.show_id, &[seat_id], "u1").await.unwrap();

    let outcome = fx.manager.hold_seats(fx.show_id, &[seat_id], "u2").await.unwrap();
    assert_eq!(outcome.held.len(), 1);

    let seat = fx.seats.get_seat(fx.show_id, seat_id).await.unwrap();
    assert_eq!(seat.holder.as_deref(), Some("u2"));
}

#[tokio::test]
async fn sweeper_reclaims_holds_only_once_lapsed() {
    let fx = fixture(300).await;
    let lapsing = fx.seat_map[0].id;
    let live = fx.seat_map[1].id;
    let (events, _) = broadcast::channel(16);

    fx.manager
        .hold_seats(fx.show_id, &[lapsing, live], "u1")
        .await
        .unwrap();

    let sweeper = ExpirySweeper::new(
        fx.seats.clone(),
        std::time::Duration::from_secs(15),
        events,
    );

    // nothing has lapsed yet
    assert_eq!(sweeper.sweep(Utc::now()).await.unwrap(), 0);

    // past the lease: both holds lapse and are reclaimed
    let later = Utc::now() + Duration::seconds(301);
    assert_eq!(sweeper.sweep(later).await.unwrap(), 2);

    let seat = fx.seats.get_seat(fx.show_id, lapsing).await.unwrap();
    assert_eq!(seat.status, SeatStatus::Available);

    // reclaimed seat is holdable again
    let outcome = fx.manager.hold_seats(fx.show_id, &[lapsing], "u2").await.unwrap();
    assert_eq!(outcome.held.len(), 1);
}

#[tokio::test]
async fn confirm_requires_the_holding_user() {
    let fx = fixture(300).await;
    let seat_id = fx.seat_map[0].id;
    fx.manager.hold_seats(fx.show_id, &[seat_id], "u1").await.unwrap();

    let err = fx
        .manager
        .confirm_booking("u2", fx.show_id, &[seat_id], "PAY123")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::HoldExpiredOrNotOwned(_)));

    // the hold itself is untouched
    let seat = fx.seats.get_seat(fx.show_id, seat_id).await.unwrap();
    assert_eq!(seat.holder.as_deref(), Some("u1"));
}

#[tokio::test]
async fn confirm_rejects_an_expired_hold() {
    let fx = fixture(0).await;
    let seat_id = fx.seat_map[0].id;
    fx.manager.hold_seats(fx.show_id, &[seat_id], "u1").await.unwrap();

    let err = fx
        .manager
        .confirm_booking("u1", fx.show_id, &[seat_id], "PAY123")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::HoldExpiredOrNotOwned(_)));
}

#[tokio::test]
async fn sold_is_terminal_for_the_booking_cycle() {
    let fx = fixture(300).await;
    let c1 = fx.seat_map[0].id;
    let c2 = fx.seat_map[1].id;

    fx.manager.hold_seats(fx.show_id, &[c1, c2], "u1").await.unwrap();
    let booking = fx
        .manager
        .confirm_booking("u1", fx.show_id, &[c1, c2], "PAY123")
        .await
        .unwrap();
    assert_eq!(booking.seats.len(), 2);

    // a second confirm on the same seats fails: they are sold, not held
    let err = fx
        .manager
        .confirm_booking("u1", fx.show_id, &[c1, c2], "PAY124")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::SeatAlreadySold(_)));

    // neither holding nor releasing touches a sold seat
    let err = fx.manager.hold_seats(fx.show_id, &[c1], "u2").await.unwrap_err();
    match err {
        ReservationError::NoSeatsAvailable { failed } => {
            assert_eq!(failed[0].reason, HoldFailureReason::AlreadySold);
        }
        other => panic!("unexpected error: {other}"),
    }
    let released = fx.manager.release_seats(fx.show_id, &[c1], "u1").await.unwrap();
    assert_eq!(released.released, 0);
    let seat = fx.seats.get_seat(fx.show_id, c1).await.unwrap();
    assert_eq!(seat.status, SeatStatus::Sold);
}

#[tokio::test]
async fn release_by_non_owner_leaves_the_hold_alone() {
    let fx = fixture(300).await;
    let seat_id = fx.seat_map[0].id;
    fx.manager.hold_seats(fx.show_id, &[seat_id], "u1").await.unwrap();

    let released = fx.manager.release_seats(fx.show_id, &[seat_id], "u2").await.unwrap();
    assert_eq!(released.released, 0);

    let seat = fx.seats.get_seat(fx.show_id, seat_id).await.unwrap();
    assert_eq!(seat.status, SeatStatus::Held);
    assert_eq!(seat.holder.as_deref(), Some("u1"));
}

#[tokio::test]
async fn own_rehold_refreshes_the_lease() {
    let fx = fixture(300).await;
    let seat_id = fx.seat_map[0].id;

    let first = fx.manager.hold_seats(fx.show_id, &[seat_id], "u1").await.unwrap();
    let second = fx.manager.hold_seats(fx.show_id, &[seat_id], "u1").await.unwrap();
    assert_eq!(second.held.len(), 1);
    assert!(second.held[0].expires_at >= first.held[0].expires_at);

    let seat = fx.seats.get_seat(fx.show_id, seat_id).await.unwrap();
    assert_eq!(seat.holder.as_deref(), Some("u1"));
}

#[tokio::test]
async fn booking_reads_are_owner_only_and_newest_first() {
    let fx = fixture(300).await;
    let s1 = fx.seat_map[0].id;
    let s2 = fx.seat_map[1].id;

    fx.manager.hold_seats(fx.show_id, &[s1], "u1").await.unwrap();
    let first = fx
        .manager
        .confirm_booking("u1", fx.show_id, &[s1], "PAY1")
        .await
        .unwrap();
    fx.manager.hold_seats(fx.show_id, &[s2], "u1").await.unwrap();
    let second = fx
        .manager
        .confirm_booking("u1", fx.show_id, &[s2], "PAY2")
        .await
        .unwrap();

    let mine = fx.manager.bookings_for("u1").await.unwrap();
    assert_eq!(
        mine.iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    assert!(matches!(
        fx.manager.booking(first.id, "u2").await.unwrap_err(),
        ReservationError::NotYourBooking
    ));
    assert!(matches!(
        fx.manager.booking(Uuid::new_v4(), "u1").await.unwrap_err(),
        ReservationError::BookingNotFound(_)
    ));
}

/// Ledger stand-in whose writes always fail, to drive the rollback path.
struct BrokenLedger;

#[async_trait]
impl BookingLedger for BrokenLedger {
    async fn create(&self, _booking: NewBooking) -> Result<Booking, LedgerError> {
        Err(LedgerError::WriteFailed("disk full".into()))
    }
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Booking>, LedgerError> {
        Ok(None)
    }
    async fn find_by_user(&self, _holder: &str) -> Result<Vec<Booking>, LedgerError> {
        Ok(Vec::new())
    }
    async fn find_by_show(&self, _show_id: Uuid) -> Result<Vec<Booking>, LedgerError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn failed_ledger_write_rolls_seats_back_to_held() {
    let seats = Arc::new(MemorySeatStore::new());
    let (events, _) = broadcast::channel(16);
    let show_id = Uuid::new_v4();
    let seat_map = SeatMapSpec::default().build(1299, &PricingConfig::default());
    let seat_id = seat_map[0].id;
    seats.insert_show(show_id, seat_map).await.unwrap();

    let manager = ReservationManager::new(
        seats.clone(),
        Arc::new(BrokenLedger),
        300,
        "USD",
        events,
    );

    manager.hold_seats(show_id, &[seat_id], "u1").await.unwrap();
    let err = manager
        .confirm_booking("u1", show_id, &[seat_id], "PAY123")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::BookingCreationFailed(_)));

    // no booking exists, so the seat must not be stranded as sold
    let seat = seats.get_seat(show_id, seat_id).await.unwrap();
    assert_eq!(seat.status, SeatStatus::Held);
    assert_eq!(seat.holder.as_deref(), Some("u1"));

    // the restored hold still confirms once the ledger recovers
    let outcome = manager.release_seats(show_id, &[seat_id], "u1").await.unwrap();
    assert_eq!(outcome.released, 1);
}
