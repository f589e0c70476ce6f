use serde::{Deserialize, Serialize};

use crate::show::SeatClass;

/// Seat pricing over a show's base price. Multipliers are clamped so a
/// misconfigured overlay cannot produce absurd or negative prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub premium_multiplier: f64,
    pub max_multiplier: f64,
    pub min_multiplier: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            premium_multiplier: 1.5,
            max_multiplier: 3.0,
            min_multiplier: 1.0,
        }
    }
}

impl PricingConfig {
    pub fn seat_price(&self, base_price_cents: i32, class: SeatClass) -> i32 {
        let multiplier = match class {
            SeatClass::Regular => 1.0,
            SeatClass::Premium => self
                .premium_multiplier
                .clamp(self.min_multiplier, self.max_multiplier),
        };
        (base_price_cents as f64 * multiplier).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_seats_keep_base_price() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.seat_price(1299, SeatClass::Regular), 1299);
    }

    #[test]
    fn premium_seats_are_multiplied_and_rounded() {
        let pricing = PricingConfig::default();
        // 1299 * 1.5 = 1948.5, rounds up
        assert_eq!(pricing.seat_price(1299, SeatClass::Premium), 1949);
    }

    #[test]
    fn multiplier_is_clamped() {
        let pricing = PricingConfig {
            premium_multiplier: 10.0,
            ..PricingConfig::default()
        };
        assert_eq!(pricing.seat_price(1000, SeatClass::Premium), 3000);

        let pricing = PricingConfig {
            premium_multiplier: 0.1,
            ..PricingConfig::default()
        };
        assert_eq!(pricing.seat_price(1000, SeatClass::Premium), 1000);
    }
}
