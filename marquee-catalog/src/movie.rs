use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry for a film. Read-only as far as the reservation core is
/// concerned; mutation happens through whatever admin tooling feeds the
/// catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub duration_minutes: u32,
    pub release_date: NaiveDate,
    pub rating: f32,
    pub language: String,
    pub poster_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Movie {
    pub fn new(title: impl Into<String>, duration_minutes: u32, release_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            genre: Vec::new(),
            duration_minutes,
            release_date,
            rating: 0.0,
            language: "English".to_owned(),
            poster_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_genre(mut self, genre: Vec<String>) -> Self {
        self.genre = genre;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theater {
    pub id: Uuid,
    pub name: String,
    pub address: Address,
    pub total_screens: u32,
    pub amenities: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl Theater {
    pub fn new(name: impl Into<String>, city: impl Into<String>, total_screens: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: Address {
                street: None,
                city: city.into(),
                state: None,
                zip_code: None,
            },
            total_screens,
            amenities: Vec::new(),
            is_active: true,
        }
    }
}
