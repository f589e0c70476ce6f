use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::movie::{Movie, Theater};
use crate::show::Show;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("movie not found: {0}")]
    MovieNotFound(Uuid),
    #[error("theater not found: {0}")]
    TheaterNotFound(Uuid),
    #[error("show not found: {0}")]
    ShowNotFound(Uuid),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read surface the booking flow consumes. The reservation core treats the
/// catalog as an external collaborator: it only ever asks for shows and
/// never writes back.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>, CatalogError>;

    async fn get_movie(&self, movie_id: Uuid) -> Result<Movie, CatalogError>;

    /// Shows for a movie, soonest first, optionally limited to one calendar
    /// day (UTC).
    async fn shows_for_movie(
        &self,
        movie_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Show>, CatalogError>;

    async fn get_show(&self, show_id: Uuid) -> Result<Show, CatalogError>;

    async fn get_theater(&self, theater_id: Uuid) -> Result<Theater, CatalogError>;
}
