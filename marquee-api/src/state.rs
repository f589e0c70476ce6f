use std::sync::Arc;

use marquee_catalog::Catalog;
use marquee_core::payment::PaymentGateway;
use marquee_reserve::ReservationManager;
use marquee_shared::events::SeatEvent;
use marquee_store::app_config::BusinessRules;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub expiration_seconds: u64,
}

/// Shared handles constructed once at startup and cloned into every request
/// handler. Nothing here is request-scoped.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub reservations: Arc<ReservationManager>,
    pub payments: Arc<dyn PaymentGateway>,
    pub seat_events: broadcast::Sender<SeatEvent>,
    pub auth: AuthSettings,
    pub business_rules: BusinessRules,
}
