use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::PricingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatClass {
    Regular,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Held,
    Sold,
}

/// A single seat of a show's map. Reservation state (`status`, `holder`,
/// `hold_expires_at`) mutates only through the seat store's transition
/// primitive; everything else is fixed at show creation.
///
/// Invariant: `holder` and `hold_expires_at` are both `Some` exactly when
/// `status == Held`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub seat_number: String,
    pub row: String,
    pub column: u32,
    pub class: SeatClass,
    pub price_cents: i32,
    pub status: SeatStatus,
    pub holder: Option<String>,
    pub hold_expires_at: Option<DateTime<Utc>>,
}

impl Seat {
    /// True when the seat is held and its lease has lapsed as of `now`.
    pub fn hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SeatStatus::Held
            && self.hold_expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// A scheduled screening. The seat map is generated once when the show is
/// created and registered with the seat store; the show record itself never
/// changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub theater_id: Uuid,
    pub screen: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub base_price_cents: i32,
    pub total_seats: u32,
    pub is_active: bool,
}

/// Auditorium layout used to build a show's seat map: `rows` lettered from
/// 'A', `seats_per_row` numbered from 1, with the first `premium_rows`
/// priced as premium.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMapSpec {
    pub rows: u32,
    pub seats_per_row: u32,
    pub premium_rows: u32,
}

impl SeatMapSpec {
    pub fn capacity(&self) -> u32 {
        self.rows * self.seats_per_row
    }

    /// Builds the ordered (row-major) seat list for a show priced at
    /// `base_price_cents`. Every seat starts available.
    pub fn build(&self, base_price_cents: i32, pricing: &PricingConfig) -> Vec<Seat> {
        let mut seats = Vec::with_capacity(self.capacity() as usize);
        for row_idx in 0..self.rows {
            let row_letter = row_label(row_idx);
            let class = if row_idx < self.premium_rows {
                SeatClass::Premium
            } else {
                SeatClass::Regular
            };
            for column in 1..=self.seats_per_row {
                seats.push(Seat {
                    id: Uuid::new_v4(),
                    seat_number: format!("{}{}", row_letter, column),
                    row: row_letter.clone(),
                    column,
                    class,
                    price_cents: pricing.seat_price(base_price_cents, class),
                    status: SeatStatus::Available,
                    holder: None,
                    hold_expires_at: None,
                });
            }
        }
        seats
    }
}

impl Default for SeatMapSpec {
    fn default() -> Self {
        // 5 rows of 10, front two rows premium
        Self {
            rows: 5,
            seats_per_row: 10,
            premium_rows: 2,
        }
    }
}

// Rows beyond 'Z' wrap to AA, AB, ... like spreadsheet columns.
fn row_label(index: u32) -> String {
    let mut label = String::new();
    let mut n = index as i64;
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        n = n / 26 - 1;
        if n < 0 {
            break;
        }
    }
    label
}
