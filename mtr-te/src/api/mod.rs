//! HTTP API handlers for mtr-te

pub mod explore;
pub mod genres;
pub mod health;

pub use explore::explore_routes;
pub use genres::genre_routes;
pub use health::health_routes;
