use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod error;
pub mod holds;
pub mod middleware;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // everything touching holds or bookings requires a resolved holder
    let protected = Router::new()
        .route("/v1/holds", post(holds::hold_seats))
        .route("/v1/holds/release", post(holds::release_seats))
        .route("/v1/bookings/confirm", post(bookings::confirm_booking))
        .route("/v1/bookings", get(bookings::my_bookings))
        .route("/v1/bookings/{booking_id}", get(bookings::booking_by_id))
        .route("/v1/shows/{show_id}/stream", get(holds::show_stream))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::customer_auth_middleware,
        ));

    Router::new()
        .nest("/v1/auth", auth::routes())
        .merge(catalog::routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
