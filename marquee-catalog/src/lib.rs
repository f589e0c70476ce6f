pub mod catalog;
pub mod movie;
pub mod pricing;
pub mod show;

pub use catalog::{Catalog, CatalogError};
pub use movie::{Movie, Theater};
pub use pricing::PricingConfig;
pub use show::{Seat, SeatClass, SeatMapSpec, SeatStatus, Show};
