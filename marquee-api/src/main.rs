use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use marquee_api::{app, state::{AppState, AuthSettings}};
use marquee_catalog::PricingConfig;
use marquee_core::payment::MockPaymentGateway;
use marquee_reserve::{ExpirySweeper, ReservationManager};
use marquee_reserve::seats::SeatStore;
use marquee_store::{seed, MemoryBookingLedger, MemoryCatalog, MemorySeatStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = marquee_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let seats: Arc<dyn SeatStore> = Arc::new(MemorySeatStore::new());
    let ledger = Arc::new(MemoryBookingLedger::new());
    let catalog = Arc::new(MemoryCatalog::new());

    let pricing = PricingConfig {
        premium_multiplier: config.business_rules.premium_multiplier,
        ..PricingConfig::default()
    };
    seed::seed_demo(&catalog, &seats, &pricing)
        .await
        .expect("Failed to seed demo catalog");

    let (seat_events, _) = tokio::sync::broadcast::channel(256);

    let reservations = Arc::new(ReservationManager::new(
        seats.clone(),
        ledger,
        config.business_rules.seat_hold_seconds,
        config.business_rules.currency.clone(),
        seat_events.clone(),
    ));

    let sweeper = ExpirySweeper::new(
        seats,
        Duration::from_secs(config.business_rules.sweep_interval_seconds),
        seat_events.clone(),
    );
    tokio::spawn(sweeper.run());

    let app_state = AppState {
        catalog,
        reservations,
        payments: Arc::new(MockPaymentGateway),
        seat_events,
        auth: AuthSettings {
            secret: config.auth.jwt_secret.clone(),
            expiration_seconds: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
