use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use marquee_catalog::{Catalog, CatalogError, Movie, Show, Theater};
use uuid::Uuid;

/// In-memory catalog. Writes happen through the `add_*` methods at seed
/// time (or from tests); the reservation flow only ever reads.
pub struct MemoryCatalog {
    movies: RwLock<Vec<Movie>>,
    theaters: RwLock<Vec<Theater>>,
    shows: RwLock<Vec<Show>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            movies: RwLock::new(Vec::new()),
            theaters: RwLock::new(Vec::new()),
            shows: RwLock::new(Vec::new()),
        }
    }

    pub fn add_movie(&self, movie: Movie) -> Result<(), CatalogError> {
        self.movies.write().map_err(poisoned)?.push(movie);
        Ok(())
    }

    pub fn add_theater(&self, theater: Theater) -> Result<(), CatalogError> {
        self.theaters.write().map_err(poisoned)?.push(theater);
        Ok(())
    }

    pub fn add_show(&self, show: Show) -> Result<(), CatalogError> {
        self.shows.write().map_err(poisoned)?.push(show);
        Ok(())
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> CatalogError {
    CatalogError::Unavailable("catalog lock poisoned".into())
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn list_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        let movies = self.movies.read().map_err(poisoned)?;
        Ok(movies.iter().filter(|m| m.is_active).cloned().collect())
    }

    async fn get_movie(&self, movie_id: Uuid) -> Result<Movie, CatalogError> {
        let movies = self.movies.read().map_err(poisoned)?;
        movies
            .iter()
            .find(|m| m.id == movie_id)
            .cloned()
            .ok_or(CatalogError::MovieNotFound(movie_id))
    }

    async fn shows_for_movie(
        &self,
        movie_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Show>, CatalogError> {
        {
            let movies = self.movies.read().map_err(poisoned)?;
            if !movies.iter().any(|m| m.id == movie_id) {
                return Err(CatalogError::MovieNotFound(movie_id));
            }
        }
        let shows = self.shows.read().map_err(poisoned)?;
        let mut matching: Vec<Show> = shows
            .iter()
            .filter(|s| s.movie_id == movie_id && s.is_active)
            .filter(|s| date.map(|d| s.starts_at.date_naive() == d).unwrap_or(true))
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.starts_at);
        Ok(matching)
    }

    async fn get_show(&self, show_id: Uuid) -> Result<Show, CatalogError> {
        let shows = self.shows.read().map_err(poisoned)?;
        shows
            .iter()
            .find(|s| s.id == show_id)
            .cloned()
            .ok_or(CatalogError::ShowNotFound(show_id))
    }

    async fn get_theater(&self, theater_id: Uuid) -> Result<Theater, CatalogError> {
        let theaters = self.theaters.read().map_err(poisoned)?;
        theaters
            .iter()
            .find(|t| t.id == theater_id)
            .cloned()
            .ok_or(CatalogError::TheaterNotFound(theater_id))
    }
}
