use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use marquee_catalog::{Movie, Seat, SeatClass, SeatStatus, Show};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/movies", get(list_movies))
        .route("/v1/movies/{movie_id}/shows", get(movie_shows))
        .route("/v1/shows/{show_id}", get(show_detail))
}

#[derive(Debug, Deserialize)]
struct ShowsQuery {
    date: Option<NaiveDate>,
}

/// Movie header plus its screenings, the shape the show-listing page
/// renders.
#[derive(Debug, Serialize)]
struct MovieShowsResponse {
    movie: Movie,
    shows: Vec<ShowSummary>,
}

#[derive(Debug, Serialize)]
struct ShowSummary {
    id: Uuid,
    theater_id: Uuid,
    theater_name: String,
    screen: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    base_price_cents: i32,
    total_seats: u32,
}

/// Seat as rendered on the public seat map. Holder identity stays
/// server-side; clients only need to know whether a seat can be picked.
#[derive(Debug, Serialize)]
struct SeatView {
    seat_id: Uuid,
    seat_number: String,
    row: String,
    column: u32,
    class: SeatClass,
    price_cents: i32,
    status: SeatStatus,
}

impl From<Seat> for SeatView {
    fn from(seat: Seat) -> Self {
        Self {
            seat_id: seat.id,
            seat_number: seat.seat_number,
            row: seat.row,
            column: seat.column,
            class: seat.class,
            price_cents: seat.price_cents,
            status: seat.status,
        }
    }
}

#[derive(Debug, Serialize)]
struct ShowDetailResponse {
    #[serde(flatten)]
    show: Show,
    seats: Vec<SeatView>,
}

async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(state.catalog.list_movies().await?))
}

async fn movie_shows(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
    Query(query): Query<ShowsQuery>,
) -> Result<Json<MovieShowsResponse>, AppError> {
    let movie = state.catalog.get_movie(movie_id).await?;
    let shows = state.catalog.shows_for_movie(movie_id, query.date).await?;

    let mut summaries = Vec::with_capacity(shows.len());
    for show in shows {
        let theater = state.catalog.get_theater(show.theater_id).await?;
        summaries.push(ShowSummary {
            id: show.id,
            theater_id: theater.id,
            theater_name: theater.name,
            screen: show.screen,
            starts_at: show.starts_at,
            ends_at: show.ends_at,
            base_price_cents: show.base_price_cents,
            total_seats: show.total_seats,
        });
    }
    Ok(Json(MovieShowsResponse { movie, shows: summaries }))
}

/// Show header plus the live seat map from the seat store; the store, not
/// the catalog, is authoritative for seat status.
async fn show_detail(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<ShowDetailResponse>, AppError> {
    let show = state.catalog.get_show(show_id).await?;
    let seats = state
        .reservations
        .seat_map(show_id)
        .await?
        .into_iter()
        .map(SeatView::from)
        .collect();

    Ok(Json(ShowDetailResponse { show, seats }))
}
