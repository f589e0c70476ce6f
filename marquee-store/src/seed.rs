use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use marquee_catalog::{CatalogError, Movie, PricingConfig, SeatMapSpec, Show, Theater};
use marquee_reserve::seats::SeatStore;

use crate::MemoryCatalog;

/// Populates the catalog with a demo lineup and registers each show's seat
/// map with the seat store. Replaces the original deployment's external
/// seed script; called once from `main` before the server starts listening.
pub async fn seed_demo(
    catalog: &MemoryCatalog,
    seats: &Arc<dyn SeatStore>,
    pricing: &PricingConfig,
) -> Result<(), SeedError> {
    let movies = vec![
        Movie::new(
            "The Dark Knight",
            152,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
        )
        .with_description("Batman faces the Joker in this epic superhero film.")
        .with_genre(vec!["Action".into(), "Crime".into(), "Drama".into()]),
        Movie::new(
            "Inception",
            148,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap_or_default(),
        )
        .with_description("A mind-bending thriller about dream infiltration.")
        .with_genre(vec!["Sci-Fi".into(), "Action".into(), "Thriller".into()]),
        Movie::new(
            "Interstellar",
            169,
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap_or_default(),
        )
        .with_description("A team of explorers travel through a wormhole in space.")
        .with_genre(vec!["Sci-Fi".into(), "Drama".into(), "Adventure".into()]),
    ];

    let theaters = vec![
        Theater::new("CineMax Downtown", "New York", 5),
        Theater::new("Grand Cinema", "New York", 4),
    ];

    let spec = SeatMapSpec::default();
    let base_price_cents = 1299;
    let today = Utc::now().date_naive();
    let mut show_count = 0;

    for movie in &movies {
        catalog.add_movie(movie.clone())?;
    }
    for theater in &theaters {
        catalog.add_theater(theater.clone())?;
    }

    for movie in &movies {
        for theater in &theaters {
            // three screenings a day for the next three days
            for day in 0..3i64 {
                for (hour, minute) in [(10u32, 30u32), (14, 0), (18, 30)] {
                    let Some(starts_at) = (today + Duration::days(day))
                        .and_hms_opt(hour, minute, 0)
                        .map(|dt| dt.and_utc())
                    else {
                        continue;
                    };
                    let show = Show {
                        id: uuid::Uuid::new_v4(),
                        movie_id: movie.id,
                        theater_id: theater.id,
                        screen: "Screen 1".into(),
                        starts_at,
                        ends_at: starts_at + Duration::minutes(movie.duration_minutes as i64),
                        base_price_cents,
                        total_seats: spec.capacity(),
                        is_active: true,
                    };
                    let seat_map = spec.build(base_price_cents, pricing);
                    seats
                        .insert_show(show.id, seat_map)
                        .await
                        .map_err(|e| SeedError(e.to_string()))?;
                    catalog.add_show(show)?;
                    show_count += 1;
                }
            }
        }
    }

    tracing::info!(
        movies = movies.len(),
        theaters = theaters.len(),
        shows = show_count,
        "demo catalog seeded"
    );
    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("seeding failed: {0}")]
pub struct SeedError(String);

impl From<CatalogError> for SeedError {
    fn from(err: CatalogError) -> Self {
        SeedError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySeatStore;
    use marquee_catalog::Catalog;

    #[tokio::test]
    async fn seeded_shows_have_registered_seat_maps() {
        let catalog = MemoryCatalog::new();
        let seats: Arc<dyn SeatStore> = Arc::new(MemorySeatStore::new());
        seed_demo(&catalog, &seats, &PricingConfig::default())
            .await
            .unwrap();

        let movies = catalog.list_movies().await.unwrap();
        assert_eq!(movies.len(), 3);

        let shows = catalog.shows_for_movie(movies[0].id, None).await.unwrap();
        assert!(!shows.is_empty());

        let seat_map = seats.list_seats(shows[0].id).await.unwrap();
        assert_eq!(seat_map.len(), shows[0].total_seats as usize);
    }
}
